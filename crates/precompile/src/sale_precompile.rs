//! MomoCandie sale precompile.
//!
//! Serves the [`IMomoCandie`](crate::abi::IMomoCandie) ABI at [`SALE_PRECOMPILE_ADDR`].
//!
//! ## State
//!
//! The precompile instance only holds the deployment state. Everything a call
//! changes lives in the precompile account's storage and is written through
//! the EVM journal, so it is rolled back with the rest of a reverted frame or
//! a discarded call.
//!
//! ## Value flow
//!
//! The EVM moves `msg.value` into the precompile account before `call` runs,
//! so the account balance always backs the sale treasury. Withdrawals debit
//! the precompile account and credit the payout recipient through the
//! journal.
//!
//! ## Atomicity
//!
//! A mutating call first runs the sale operation on an in-memory copy of the
//! loaded state. Storage is only written once that operation and any payout
//! have succeeded; an error before that point leaves storage untouched, and
//! the EVM reverts whatever the frame had already journaled.
//!
//! ## Gas
//!
//! Like the other native precompiles, this one reports `gas_used = 0` and
//! leaves gas accounting to the transaction.

use crate::{
    abi::IMomoCandie::IMomoCandieCalls,
    storage::{self, map_internals_error},
};
use alloy_evm::{
    precompiles::{DynPrecompile, Precompile, PrecompileInput, PrecompilesMap},
    revm::precompile::{PrecompileError, PrecompileId, PrecompileResult},
    EvmInternals,
};
use alloy_primitives::{address, hex, Address, Bytes, Log, U256};
use alloy_sol_types::{SolInterface, SolValue};
use momo_sale::{
    constants::{MAX_PER_WALLET, MAX_PRESALE_MINT, MAX_SUPPLY, NAME, RESERVE_SUPPLY, SYMBOL},
    InMemoryTokenLedger, MintReceipt, Payout, SaleConfig, SaleError, SaleEvent, SaleState,
};
use revm::{bytecode::Bytecode, precompile::PrecompileOutput};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Sale precompile address: 0x00..f200
pub const SALE_PRECOMPILE_ADDR: Address = address!("0x000000000000000000000000000000000000f200");

/// Precompile exposing the sale through the `IMomoCandie` ABI.
///
/// Clones share the deployment state; the live state is read from and written
/// to the journal on every call.
#[derive(Clone, Debug)]
pub struct MomoSalePrecompile {
    genesis: Arc<SaleState>,
}

/// What a committed mutating call leaves behind besides storage writes.
#[derive(Debug)]
enum Effect {
    None,
    Minted(MintReceipt),
    Event(SaleEvent),
}

impl MomoSalePrecompile {
    /// Lazily-initialized precompile ID
    pub fn id() -> &'static PrecompileId {
        static ID: OnceLock<PrecompileId> = OnceLock::new();
        ID.get_or_init(|| PrecompileId::custom("momo_sale"))
    }

    /// Marks the precompile account with `0xFE` so it is never pruned as empty.
    fn bytecode() -> &'static Bytecode {
        static BYTECODE: OnceLock<Bytecode> = OnceLock::new();
        BYTECODE.get_or_init(|| Bytecode::new_raw(Bytes::from_static(&[0xFE])))
    }

    /// Deploys a new sale owned by `deployer`.
    pub fn new(config: SaleConfig, deployer: Address) -> Result<Self, SaleError> {
        Ok(Self::from_state(SaleState::new(config, deployer)?))
    }

    /// Serves `genesis` until the first mutating call persists its own state.
    pub fn from_state(genesis: SaleState) -> Self {
        Self {
            genesis: Arc::new(genesis),
        }
    }

    /// Registers this instance at [`SALE_PRECOMPILE_ADDR`].
    pub fn install(&self, precompiles: &mut PrecompilesMap) {
        let sale = self.clone();
        let id = Self::id().clone();

        precompiles.apply_precompile(&SALE_PRECOMPILE_ADDR, move |_| {
            let sale_for_call = sale;
            let id_for_call = id;
            Some(DynPrecompile::new_stateful(id_for_call, move |input| {
                sale_for_call.call(input)
            }))
        });
    }

    /// State the sale was deployed with.
    pub fn genesis(&self) -> &SaleState {
        &self.genesis
    }

    /// Reads the live state as seen by `internals`.
    ///
    /// Per-wallet counters are only populated for `wallets`.
    pub fn load(
        &self,
        internals: &mut EvmInternals<'_>,
        wallets: &[Address],
    ) -> Result<SaleState, PrecompileError> {
        storage::load_state(internals, &self.genesis, wallets)
    }

    // === Error Handling ===

    fn revert(err: SaleError) -> PrecompileError {
        debug!(target: "momo_precompile", reason = %err, "sale call reverted");
        PrecompileError::other(err.to_string())
    }

    // === Account Management ===

    fn ensure_account_created(
        internals: &mut EvmInternals<'_>,
        addr: Address,
    ) -> Result<(), PrecompileError> {
        let account = internals.load_account(addr).map_err(map_internals_error)?;

        if account.is_loaded_as_not_existing() {
            if addr == SALE_PRECOMPILE_ADDR {
                internals
                    .set_code(addr, Self::bytecode().clone())
                    .map_err(map_internals_error)?;
            }
            internals.touch_account(addr).map_err(map_internals_error)?;
        }

        Ok(())
    }

    fn add_balance(
        internals: &mut EvmInternals<'_>,
        addr: Address,
        amount: U256,
    ) -> Result<(), PrecompileError> {
        let account = internals.load_account(addr).map_err(map_internals_error)?;
        let new_balance = account
            .info
            .balance
            .checked_add(amount)
            .ok_or_else(|| PrecompileError::other("balance overflow"))?;
        internals
            .set_balance(addr, new_balance)
            .map_err(map_internals_error)
    }

    fn sub_balance(
        internals: &mut EvmInternals<'_>,
        addr: Address,
        amount: U256,
    ) -> Result<(), PrecompileError> {
        let account = internals.load_account(addr).map_err(map_internals_error)?;
        let new_balance = account
            .info
            .balance
            .checked_sub(amount)
            .ok_or_else(|| PrecompileError::other("insufficient balance"))?;
        internals
            .set_balance(addr, new_balance)
            .map_err(map_internals_error)
    }

    /// Moves a drained treasury out of the precompile account.
    fn pay_out(internals: &mut EvmInternals<'_>, payout: Payout) -> Result<(), PrecompileError> {
        Self::ensure_account_created(internals, payout.to)?;

        Self::sub_balance(internals, SALE_PRECOMPILE_ADDR, payout.amount)?;
        Self::add_balance(internals, payout.to, payout.amount)?;

        info!(target: "momo_precompile", to = ?payout.to, amount = %payout.amount, "treasury paid out");
        Ok(())
    }

    /// Appends `event` to the journal's logs.
    fn emit(internals: &mut EvmInternals<'_>, event: &SaleEvent) {
        let data = event.to_log_data();
        info!(
            target: "momo_precompile",
            ?event,
            topics = ?data.topics(),
            "sale event"
        );
        internals.log(Log {
            address: SALE_PRECOMPILE_ADDR,
            data,
        });
    }

    // === Dispatch ===

    /// Answers read-only calls. Returns `None` for calls that mutate state.
    fn view(
        internals: &mut EvmInternals<'_>,
        state: &SaleState,
        call: &IMomoCandieCalls,
    ) -> Result<Option<Vec<u8>>, PrecompileError> {
        let encoded = match call {
            IMomoCandieCalls::MAX_SUPPLY(_) => U256::from(MAX_SUPPLY).abi_encode(),
            IMomoCandieCalls::RESERVE_SUPPLY(_) => U256::from(RESERVE_SUPPLY).abi_encode(),
            IMomoCandieCalls::MAX_PER_WALLET(_) => U256::from(MAX_PER_WALLET).abi_encode(),
            IMomoCandieCalls::MAX_PRESALE_MINT(_) => U256::from(MAX_PRESALE_MINT).abi_encode(),
            IMomoCandieCalls::name(_) => NAME.to_string().abi_encode(),
            IMomoCandieCalls::symbol(_) => SYMBOL.to_string().abi_encode(),
            // uint8 occupies a full word on the wire
            IMomoCandieCalls::salePhase(_) => U256::from(u8::from(state.phase())).abi_encode(),
            IMomoCandieCalls::totalSupply(_) => U256::from(state.total_supply()).abi_encode(),
            IMomoCandieCalls::remainingSupply(_) => {
                U256::from(state.remaining_supply()).abi_encode()
            }
            IMomoCandieCalls::revealed(_) => state.revealed().abi_encode(),
            IMomoCandieCalls::unrevealedURI(_) => state.unrevealed_uri().to_string().abi_encode(),
            IMomoCandieCalls::merkleRoot(_) => state.merkle_root().abi_encode(),
            IMomoCandieCalls::presalePrice(_) => state.prices().presale.abi_encode(),
            IMomoCandieCalls::publicPrice(_) => state.prices().public.abi_encode(),
            IMomoCandieCalls::presaleMintedCount(call) => {
                U256::from(state.presale_minted(call.account)).abi_encode()
            }
            IMomoCandieCalls::publicMintedCount(call) => {
                U256::from(state.public_minted(call.account)).abi_encode()
            }
            IMomoCandieCalls::reserveMinted(_) => U256::from(state.reserve_minted()).abi_encode(),
            IMomoCandieCalls::owner(_) => state.owner().abi_encode(),
            IMomoCandieCalls::daoMultisig(_) => state.dao_multisig().abi_encode(),
            IMomoCandieCalls::tokenURI(call) => state
                .token_uri(call.tokenId.saturating_to::<u64>())
                .map_err(Self::revert)?
                .abi_encode(),
            IMomoCandieCalls::balanceOf(call) => {
                U256::from(storage::balance_of(internals, call.holder)?).abi_encode()
            }
            IMomoCandieCalls::ownerOf(call) => {
                let id = call.tokenId.saturating_to::<u64>();
                storage::owner_of(internals, id)?
                    .ok_or(SaleError::NonexistentToken(id))
                    .map_err(Self::revert)?
                    .abi_encode()
            }
            _ => return Ok(None),
        };
        Ok(Some(encoded))
    }

    /// Applies a mutating call to `state`.
    fn execute(
        state: &mut SaleState,
        internals: &mut EvmInternals<'_>,
        caller: Address,
        value: U256,
        call: IMomoCandieCalls,
    ) -> Result<Effect, PrecompileError> {
        // ownership is persisted from the receipt, not from this ledger
        let mut minted = InMemoryTokenLedger::default();
        let effect = match call {
            IMomoCandieCalls::presaleMint(call) => {
                let quantity = quantity(call.quantity).map_err(Self::revert)?;
                Effect::Minted(
                    state
                        .presale_mint(&mut minted, caller, value, quantity, &call.proof)
                        .map_err(Self::revert)?,
                )
            }
            IMomoCandieCalls::publicMint(call) => {
                let quantity = quantity(call.quantity).map_err(Self::revert)?;
                Effect::Minted(
                    state
                        .public_mint(&mut minted, caller, value, quantity)
                        .map_err(Self::revert)?,
                )
            }
            IMomoCandieCalls::reserveMint(call) => {
                let quantity = quantity(call.quantity).map_err(Self::revert)?;
                Effect::Minted(
                    state
                        .reserve_mint(&mut minted, caller, call.to, quantity)
                        .map_err(Self::revert)?,
                )
            }
            IMomoCandieCalls::openPresale(_) => {
                Effect::Event(state.open_presale(caller).map_err(Self::revert)?)
            }
            IMomoCandieCalls::toggleSale(_) => {
                Effect::Event(state.toggle_sale(caller).map_err(Self::revert)?)
            }
            IMomoCandieCalls::closeSale(_) => {
                Effect::Event(state.close_sale(caller).map_err(Self::revert)?)
            }
            IMomoCandieCalls::setMerkleRoot(call) => Effect::Event(
                state
                    .set_merkle_root(caller, call.newRoot)
                    .map_err(Self::revert)?,
            ),
            IMomoCandieCalls::setPrices(call) => {
                state
                    .set_prices(caller, call.presalePrice, call.publicPrice)
                    .map_err(Self::revert)?;
                Effect::None
            }
            IMomoCandieCalls::reveal(call) => {
                Effect::Event(state.reveal(caller, call.baseURI).map_err(Self::revert)?)
            }
            IMomoCandieCalls::handoffToDAO(_) => {
                Effect::Event(state.handoff_to_dao(caller).map_err(Self::revert)?)
            }
            IMomoCandieCalls::withdraw(_) => {
                let payout = state.withdraw(caller).map_err(Self::revert)?;
                Self::pay_out(internals, payout)?;
                Effect::None
            }
            IMomoCandieCalls::withdrawToDAO(_) => {
                let payout = state.withdraw_to_dao(caller).map_err(Self::revert)?;
                Self::pay_out(internals, payout)?;
                Effect::None
            }
            other => {
                return Err(PrecompileError::other(format!(
                    "unexpected read-only call {}",
                    hex::encode(other.selector())
                )))
            }
        };
        Ok(effect)
    }
}

impl Precompile for MomoSalePrecompile {
    fn precompile_id(&self) -> &PrecompileId {
        Self::id()
    }

    fn call(&self, mut input: PrecompileInput<'_>) -> PrecompileResult {
        let caller: Address = input.caller;
        let value = input.value;
        let is_static = input.is_static_call();

        info!(
            target: "momo_precompile",
            ?caller,
            %value,
            calldata_len = input.data.len(),
            "precompile call invoked"
        );

        let decoded = match IMomoCandieCalls::abi_decode(input.data) {
            Ok(v) => v,
            Err(e) => return Err(PrecompileError::other(e.to_string())),
        };

        if !value.is_zero() && !is_payable(&decoded) {
            warn!(
                target: "momo_precompile",
                ?caller,
                %value,
                selector = %hex::encode(decoded.selector()),
                "value sent to non-payable function"
            );
            return Err(PrecompileError::other("non-payable function"));
        }

        let internals = input.internals_mut();
        let state = storage::load_state(internals, &self.genesis, &wallets(&decoded, caller))?;

        if let Some(encoded) = Self::view(internals, &state, &decoded)? {
            return Ok(PrecompileOutput::new(0, encoded.into()));
        }
        if is_static {
            return Err(PrecompileError::other("state change during static call"));
        }

        Self::ensure_account_created(internals, SALE_PRECOMPILE_ADDR)?;
        let mut staged = state.clone();
        let effect = Self::execute(&mut staged, internals, caller, value, decoded)?;
        storage::store_state(internals, &state, &staged)?;
        match effect {
            Effect::Minted(receipt) => storage::record_mint(internals, &receipt)?,
            Effect::Event(event) => Self::emit(internals, &event),
            Effect::None => {}
        }
        internals
            .touch_account(SALE_PRECOMPILE_ADDR)
            .map_err(map_internals_error)?;

        Ok(PrecompileOutput::new(0, Bytes::new()))
    }

    fn is_pure(&self) -> bool {
        false
    }
}

const fn is_payable(call: &IMomoCandieCalls) -> bool {
    matches!(
        call,
        IMomoCandieCalls::presaleMint(_) | IMomoCandieCalls::publicMint(_)
    )
}

/// Addresses whose per-wallet counters `call` reads or writes.
fn wallets(call: &IMomoCandieCalls, caller: Address) -> Vec<Address> {
    match call {
        IMomoCandieCalls::presaleMint(_) | IMomoCandieCalls::publicMint(_) => vec![caller],
        IMomoCandieCalls::presaleMintedCount(call) => vec![call.account],
        IMomoCandieCalls::publicMintedCount(call) => vec![call.account],
        _ => Vec::new(),
    }
}

/// ABI quantities wider than `u64` can never fit under any cap.
fn quantity(raw: U256) -> Result<u64, SaleError> {
    u64::try_from(raw).map_err(|_| SaleError::InvalidQuantity { quantity: u64::MAX })
}
