//! The single state record every sale operation runs against.

use crate::{
    allocation::{AllocationCounters, AllocationLedger},
    authority::Authority,
    config::SaleConfig,
    error::SaleError,
    phase::SalePhase,
    reveal::RevealState,
};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Current mint prices in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Price per token during presale.
    pub presale: U256,
    /// Price per token during the public sale.
    pub public: U256,
}

/// A [`SaleState`] taken apart, for backends that persist each field on its own.
///
/// [`SaleState::from_parts`] trusts its input; the parts must come from a
/// state that was built through the regular operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleParts {
    /// Active phase.
    pub phase: SalePhase,
    /// Whitelist root.
    pub merkle_root: B256,
    /// Current prices.
    pub prices: PriceSchedule,
    /// Supply counters.
    pub allocations: AllocationLedger,
    /// Metadata addressing.
    pub reveal: RevealState,
    /// Access control.
    pub authority: Authority,
    /// Tracked mint proceeds in wei.
    pub treasury: U256,
}

/// Complete, serializable sale state.
///
/// Operations take `&mut self` and either apply all of their effects or none.
/// There is no interior mutability; serializing access is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleState {
    pub(crate) phase: SalePhase,
    pub(crate) merkle_root: B256,
    pub(crate) prices: PriceSchedule,
    pub(crate) allocations: AllocationLedger,
    pub(crate) reveal: RevealState,
    pub(crate) authority: Authority,
    pub(crate) treasury: U256,
}

impl SaleState {
    /// Deploys a sale owned by `deployer`. Fails if the DAO multisig is zero.
    pub fn new(config: SaleConfig, deployer: Address) -> Result<Self, SaleError> {
        let authority = Authority::new(deployer, config.dao_multisig)?;
        info!(
            target: "momo_sale",
            ?deployer,
            dao_multisig = ?config.dao_multisig,
            merkle_root = %config.merkle_root,
            "sale deployed"
        );
        Ok(Self {
            phase: SalePhase::Closed,
            merkle_root: config.merkle_root,
            prices: PriceSchedule {
                presale: config.presale_price,
                public: config.public_price,
            },
            allocations: AllocationLedger::default(),
            reveal: RevealState::new(config.unrevealed_uri),
            authority,
            treasury: U256::ZERO,
        })
    }

    /// Reassembles a state from persisted parts.
    pub fn from_parts(parts: SaleParts) -> Self {
        let SaleParts {
            phase,
            merkle_root,
            prices,
            allocations,
            reveal,
            authority,
            treasury,
        } = parts;
        Self {
            phase,
            merkle_root,
            prices,
            allocations,
            reveal,
            authority,
            treasury,
        }
    }

    /// Takes the state apart field by field.
    pub fn into_parts(self) -> SaleParts {
        SaleParts {
            phase: self.phase,
            merkle_root: self.merkle_root,
            prices: self.prices,
            allocations: self.allocations,
            reveal: self.reveal,
            authority: self.authority,
            treasury: self.treasury,
        }
    }

    /// Active sale phase.
    pub const fn phase(&self) -> SalePhase {
        self.phase
    }

    /// Current whitelist root.
    pub const fn merkle_root(&self) -> B256 {
        self.merkle_root
    }

    /// Current prices.
    pub const fn prices(&self) -> PriceSchedule {
        self.prices
    }

    /// Tokens issued so far.
    pub const fn total_supply(&self) -> u64 {
        self.allocations.total_supply()
    }

    /// Tokens that can still be issued.
    pub const fn remaining_supply(&self) -> u64 {
        self.allocations.remaining_supply()
    }

    /// Tokens issued through the owner reserve.
    pub const fn reserve_minted(&self) -> u64 {
        self.allocations.reserve_minted()
    }

    /// Presale tokens minted by `address`.
    pub fn presale_minted(&self, address: Address) -> u64 {
        self.allocations.counters(address).presale_minted
    }

    /// Public tokens minted by `address`.
    pub fn public_minted(&self, address: Address) -> u64 {
        self.allocations.counters(address).public_minted
    }

    /// Both counters for `address`.
    pub fn counters(&self, address: Address) -> AllocationCounters {
        self.allocations.counters(address)
    }

    /// Supply bookkeeping.
    pub const fn allocations(&self) -> &AllocationLedger {
        &self.allocations
    }

    /// Whether metadata has been revealed.
    pub const fn revealed(&self) -> bool {
        self.reveal.revealed()
    }

    /// Placeholder metadata URI.
    pub fn unrevealed_uri(&self) -> &str {
        self.reveal.unrevealed_uri()
    }

    /// Base URI set at reveal, empty before.
    pub fn base_uri(&self) -> &str {
        self.reveal.base_uri()
    }

    /// Current owner.
    pub const fn owner(&self) -> Address {
        self.authority.owner()
    }

    /// Designated DAO multisig.
    pub const fn dao_multisig(&self) -> Address {
        self.authority.dao_multisig()
    }

    /// Access-control state.
    pub const fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Mint proceeds not yet withdrawn, in wei.
    pub const fn treasury(&self) -> U256 {
        self.treasury
    }
}
