//! The ownership ledger the sale mints into.
//!
//! Transfers, approvals and enumeration live outside this crate; the sale only
//! needs to materialize fresh identifiers and read ownership back.

use crate::constants::TokenId;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ownership ledger consumed by the minting engine.
///
/// `mint` is called exactly once per issued identifier, in increasing order,
/// after the sale has already committed its own counters.
pub trait TokenLedger {
    /// Assigns ownership of the fresh identifier `id` to `to`.
    fn mint(&mut self, to: Address, id: TokenId);

    /// Number of tokens held by `holder`.
    fn balance_of(&self, holder: Address) -> u64;

    /// Holder of `id`, or `None` if it was never issued.
    fn owner_of(&self, id: TokenId) -> Option<Address>;
}

/// A map-backed [`TokenLedger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryTokenLedger {
    owners: BTreeMap<TokenId, Address>,
    balances: BTreeMap<Address, u64>,
}

impl InMemoryTokenLedger {
    /// Number of identifiers minted into this ledger.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns true if nothing has been minted.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.owners.keys().copied()
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn mint(&mut self, to: Address, id: TokenId) {
        let previous = self.owners.insert(id, to);
        debug_assert!(previous.is_none(), "token {id} minted twice");
        *self.balances.entry(to).or_default() += 1;
    }

    fn balance_of(&self, holder: Address) -> u64 {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    fn owner_of(&self, id: TokenId) -> Option<Address> {
        self.owners.get(&id).copied()
    }
}
