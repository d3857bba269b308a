//! Sale state kept in the precompile account's storage.
//!
//! Every read and write goes through the EVM journal, so a reverted frame, a
//! discarded `eth_call` or a gas estimate rolls the sale back together with
//! the value the call carried.
//!
//! ## Layout
//!
//! | Slot | Contents |
//! |------|----------|
//! | 0 | initialized flag |
//! | 1 | phase discriminant |
//! | 2 | merkle root |
//! | 3, 4 | presale and public price |
//! | 5, 6 | total supply and reserve minted |
//! | 7 | revealed flag |
//! | 8 | DAO-owned flag |
//! | 9 | treasury |
//! | 10 | base URI length; bytes at `keccak256(10) + i` |
//! | 11, 12 | `address => presale / public count` |
//! | 13 | `tokenId => owner` |
//! | 14 | `address => balance` |
//!
//! Mapping entries live at `keccak256(key ++ slot)`, as in Solidity. Until
//! the first mutating call the flag at slot 0 is clear and the deployment
//! state is served as is.

use crate::sale_precompile::SALE_PRECOMPILE_ADDR;
use alloy_evm::{revm::precompile::PrecompileError, EvmInternals, EvmInternalsError};
use alloy_primitives::{keccak256, Address, B256, U256};
use momo_sale::{
    AllocationCounters, AllocationLedger, Authority, MintReceipt, PriceSchedule, RevealState,
    SaleParts, SalePhase, SaleState, TokenId,
};
use tracing::trace;

const INITIALIZED_SLOT: u64 = 0;
const PHASE_SLOT: u64 = 1;
const MERKLE_ROOT_SLOT: u64 = 2;
const PRESALE_PRICE_SLOT: u64 = 3;
const PUBLIC_PRICE_SLOT: u64 = 4;
const TOTAL_SUPPLY_SLOT: u64 = 5;
const RESERVE_MINTED_SLOT: u64 = 6;
const REVEALED_SLOT: u64 = 7;
const DAO_OWNED_SLOT: u64 = 8;
const TREASURY_SLOT: u64 = 9;
const BASE_URI_SLOT: u64 = 10;
const PRESALE_MINTED_MAP: u64 = 11;
const PUBLIC_MINTED_MAP: u64 = 12;
const OWNERS_MAP: u64 = 13;
const BALANCES_MAP: u64 = 14;

pub(crate) fn map_internals_error(err: EvmInternalsError) -> PrecompileError {
    PrecompileError::other(err.to_string())
}

/// Loads the live sale state.
///
/// Only the counters of `wallets` are read; everyone else reads as zero in
/// the returned ledger, so callers pass every address the call may touch.
pub(crate) fn load_state(
    internals: &mut EvmInternals<'_>,
    genesis: &SaleState,
    wallets: &[Address],
) -> Result<SaleState, PrecompileError> {
    if read(internals, slot(INITIALIZED_SLOT))?.is_zero() {
        return Ok(genesis.clone());
    }

    let raw_phase = read(internals, slot(PHASE_SLOT))?.saturating_to::<u8>();
    let phase = SalePhase::try_from(raw_phase)
        .map_err(|raw| PrecompileError::other(format!("corrupt sale phase {raw}")))?;

    let mut counters = Vec::with_capacity(wallets.len());
    for wallet in wallets {
        counters.push((*wallet, load_counters(internals, *wallet)?));
    }
    let allocations = AllocationLedger::from_parts(
        counters,
        read_u64(internals, slot(TOTAL_SUPPLY_SLOT))?,
        read_u64(internals, slot(RESERVE_MINTED_SLOT))?,
    );

    let revealed = !read(internals, slot(REVEALED_SLOT))?.is_zero();
    let base_uri = if revealed {
        read_string(internals, BASE_URI_SLOT)?
    } else {
        String::new()
    };

    let authority = if read(internals, slot(DAO_OWNED_SLOT))?.is_zero() {
        *genesis.authority()
    } else {
        Authority::DaoOwned {
            dao_multisig: genesis.dao_multisig(),
        }
    };

    Ok(SaleState::from_parts(SaleParts {
        phase,
        merkle_root: read(internals, slot(MERKLE_ROOT_SLOT))?.into(),
        prices: PriceSchedule {
            presale: read(internals, slot(PRESALE_PRICE_SLOT))?,
            public: read(internals, slot(PUBLIC_PRICE_SLOT))?,
        },
        allocations,
        reveal: RevealState::from_parts(revealed, base_uri, genesis.unrevealed_uri()),
        authority,
        treasury: read(internals, slot(TREASURY_SLOT))?,
    }))
}

/// Writes `state` back, including the counters of every wallet it holds.
///
/// `previous` is the state the call started from; the base URI is only
/// written when it changed.
pub(crate) fn store_state(
    internals: &mut EvmInternals<'_>,
    previous: &SaleState,
    state: &SaleState,
) -> Result<(), PrecompileError> {
    write(internals, slot(INITIALIZED_SLOT), U256::from(1u8))?;
    write(internals, slot(PHASE_SLOT), U256::from(u8::from(state.phase())))?;
    write(internals, slot(MERKLE_ROOT_SLOT), state.merkle_root().into())?;
    write(internals, slot(PRESALE_PRICE_SLOT), state.prices().presale)?;
    write(internals, slot(PUBLIC_PRICE_SLOT), state.prices().public)?;
    write(internals, slot(TOTAL_SUPPLY_SLOT), U256::from(state.total_supply()))?;
    write(internals, slot(RESERVE_MINTED_SLOT), U256::from(state.reserve_minted()))?;
    write(internals, slot(REVEALED_SLOT), U256::from(state.revealed()))?;
    write(
        internals,
        slot(DAO_OWNED_SLOT),
        U256::from(state.authority().is_dao_owned()),
    )?;
    write(internals, slot(TREASURY_SLOT), state.treasury())?;
    if state.base_uri() != previous.base_uri() {
        write_string(internals, BASE_URI_SLOT, state.base_uri())?;
    }

    for (wallet, counters) in state.allocations().wallets() {
        let key = wallet.into_word();
        write(
            internals,
            mapping_slot(PRESALE_MINTED_MAP, key),
            U256::from(counters.presale_minted),
        )?;
        write(
            internals,
            mapping_slot(PUBLIC_MINTED_MAP, key),
            U256::from(counters.public_minted),
        )?;
    }
    Ok(())
}

/// Records ownership of the block described by `receipt`.
pub(crate) fn record_mint(
    internals: &mut EvmInternals<'_>,
    receipt: &MintReceipt,
) -> Result<(), PrecompileError> {
    for id in receipt.ids() {
        write(internals, owner_slot(id), receipt.to.into_word().into())?;
    }
    let balance = balance_of(internals, receipt.to)?;
    write(
        internals,
        mapping_slot(BALANCES_MAP, receipt.to.into_word()),
        U256::from(balance.saturating_add(receipt.quantity)),
    )
}

/// Tokens held by `holder`.
pub(crate) fn balance_of(
    internals: &mut EvmInternals<'_>,
    holder: Address,
) -> Result<u64, PrecompileError> {
    read_u64(internals, mapping_slot(BALANCES_MAP, holder.into_word()))
}

/// Holder of `id`, or `None` if it was never issued.
pub(crate) fn owner_of(
    internals: &mut EvmInternals<'_>,
    id: TokenId,
) -> Result<Option<Address>, PrecompileError> {
    let raw = read(internals, owner_slot(id))?;
    Ok((!raw.is_zero()).then(|| Address::from_word(raw.into())))
}

fn load_counters(
    internals: &mut EvmInternals<'_>,
    wallet: Address,
) -> Result<AllocationCounters, PrecompileError> {
    let key = wallet.into_word();
    Ok(AllocationCounters {
        presale_minted: read_u64(internals, mapping_slot(PRESALE_MINTED_MAP, key))?,
        public_minted: read_u64(internals, mapping_slot(PUBLIC_MINTED_MAP, key))?,
    })
}

// === Slots ===

fn slot(index: u64) -> U256 {
    U256::from(index)
}

fn mapping_slot(base: u64, key: B256) -> U256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(key.as_slice());
    preimage[32..].copy_from_slice(&U256::from(base).to_be_bytes::<32>());
    keccak256(preimage).into()
}

fn owner_slot(id: TokenId) -> U256 {
    mapping_slot(OWNERS_MAP, U256::from(id).into())
}

fn data_slot(base: u64, index: usize) -> U256 {
    let start: U256 = keccak256(U256::from(base).to_be_bytes::<32>()).into();
    start.wrapping_add(U256::from(index))
}

// === Raw Access ===

fn read(internals: &mut EvmInternals<'_>, key: U256) -> Result<U256, PrecompileError> {
    let value = internals
        .sload(SALE_PRECOMPILE_ADDR, key)
        .map_err(map_internals_error)?;
    Ok(value.data)
}

fn read_u64(internals: &mut EvmInternals<'_>, key: U256) -> Result<u64, PrecompileError> {
    Ok(read(internals, key)?.saturating_to())
}

fn write(internals: &mut EvmInternals<'_>, key: U256, value: U256) -> Result<(), PrecompileError> {
    trace!(target: "momo_precompile", slot = %key, %value, "sale storage write");
    internals
        .sstore(SALE_PRECOMPILE_ADDR, key, value)
        .map_err(map_internals_error)?;
    Ok(())
}

fn read_string(internals: &mut EvmInternals<'_>, base: u64) -> Result<String, PrecompileError> {
    let len = read(internals, slot(base))?.saturating_to::<usize>();
    let mut bytes = Vec::with_capacity(len);
    for index in 0..len.div_ceil(32) {
        let word = read(internals, data_slot(base, index))?.to_be_bytes::<32>();
        let take = (len - bytes.len()).min(32);
        bytes.extend_from_slice(&word[..take]);
    }
    String::from_utf8(bytes).map_err(|err| PrecompileError::other(err.to_string()))
}

fn write_string(
    internals: &mut EvmInternals<'_>,
    base: u64,
    value: &str,
) -> Result<(), PrecompileError> {
    write(internals, slot(base), U256::from(value.len()))?;
    for (index, chunk) in value.as_bytes().chunks(32).enumerate() {
        let mut word = [0u8; 32];
        word[..chunk.len()].copy_from_slice(chunk);
        write(internals, data_slot(base, index), U256::from_be_bytes(word))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use momo_sale::{test_utils::WhitelistTree, InMemoryTokenLedger, SaleConfig};
    use revm::{
        context::{
            journal::{Journal, JournalInner},
            BlockEnv, CfgEnv, TxEnv,
        },
        database::{CacheDB, EmptyDB},
        primitives::hardfork::SpecId,
    };

    const DEPLOYER: Address = address!("0x00000000000000000000000000000000000000a1");
    const DAO: Address = address!("0x00000000000000000000000000000000000000da");
    const BUYER: Address = address!("0x00000000000000000000000000000000000000b1");

    fn with_internals(f: impl FnOnce(&mut EvmInternals<'_>)) {
        let mut journal: Journal<CacheDB<EmptyDB>> =
            Journal::new_with_inner(CacheDB::default(), JournalInner::new());
        journal.inner.set_spec_id(SpecId::PRAGUE);
        let (block, cfg, tx) = (BlockEnv::default(), CfgEnv::<SpecId>::default(), TxEnv::default());
        let mut internals = EvmInternals::new(&mut journal, &block, &cfg, &tx);
        f(&mut internals);
    }

    fn genesis() -> SaleState {
        let tree = WhitelistTree::new(&[BUYER]);
        SaleState::new(SaleConfig::new("ipfs://hidden.json", tree.root(), DAO), DEPLOYER)
            .expect("valid config")
    }

    #[test]
    fn fresh_storage_serves_genesis() {
        with_internals(|internals| {
            let genesis = genesis();
            let loaded = load_state(internals, &genesis, &[BUYER]).unwrap();
            assert_eq!(loaded, genesis);
            assert_eq!(balance_of(internals, BUYER).unwrap(), 0);
            assert_eq!(owner_of(internals, 1).unwrap(), None);
        });
    }

    #[test]
    fn stored_state_loads_back() {
        with_internals(|internals| {
            let genesis = genesis();
            let mut state = genesis.clone();
            let mut ledger = InMemoryTokenLedger::default();
            let price = state.prices().public;
            state.toggle_sale(DEPLOYER).unwrap();
            let receipt = state
                .public_mint(&mut ledger, BUYER, price * U256::from(2u8), 2)
                .unwrap();
            state.reveal(DEPLOYER, "ipfs://revealed-collection-metadata-root/").unwrap();
            state.handoff_to_dao(DEPLOYER).unwrap();

            store_state(internals, &genesis, &state).unwrap();
            record_mint(internals, &receipt).unwrap();

            let loaded = load_state(internals, &genesis, &[BUYER]).unwrap();
            assert_eq!(loaded, state);
            assert_eq!(balance_of(internals, BUYER).unwrap(), 2);
            assert_eq!(owner_of(internals, 2).unwrap(), Some(BUYER));
            assert_eq!(owner_of(internals, 3).unwrap(), None);
        });
    }

    #[test]
    fn strings_keep_their_length() {
        with_internals(|internals| {
            for value in [String::new(), "a".to_string(), "x".repeat(32), "y".repeat(65)] {
                write_string(internals, BASE_URI_SLOT, &value).unwrap();
                assert_eq!(read_string(internals, BASE_URI_SLOT).unwrap(), value);
            }
        });
    }

    #[test]
    fn mapping_slots_do_not_collide() {
        let key = BUYER.into_word();
        assert_ne!(
            mapping_slot(PRESALE_MINTED_MAP, key),
            mapping_slot(PUBLIC_MINTED_MAP, key)
        );
        assert_ne!(owner_slot(1), owner_slot(2));
    }
}
