//! Supply accounting for presale, public and reserve issuance.
//!
//! Every `reserve_*` call checks all of its ceilings before touching a counter,
//! so a rejected request leaves the ledger exactly as it was. Presale and
//! public allocations share the per-wallet ceiling; reserve issuance shares
//! only the global `MAX_SUPPLY` ceiling with them.

use crate::{
    constants::{TokenId, MAX_PER_WALLET, MAX_PRESALE_MINT, MAX_SUPPLY, RESERVE_SUPPLY},
    error::CapKind,
};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, ops::RangeInclusive};

/// Per-address mint counters. Missing entries read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCounters {
    /// Tokens minted by this address during presale.
    pub presale_minted: u64,
    /// Tokens minted by this address during the public sale.
    pub public_minted: u64,
}

impl AllocationCounters {
    /// Total counted against the per-wallet ceiling.
    pub const fn total(&self) -> u64 {
        self.presale_minted + self.public_minted
    }
}

/// A block of consecutive identifiers handed out for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// First identifier of the block.
    pub first_id: TokenId,
    /// Number of identifiers in the block.
    pub quantity: u64,
}

impl Allocation {
    /// Identifiers in issuance order.
    pub fn ids(&self) -> RangeInclusive<TokenId> {
        self.first_id..=self.first_id + self.quantity - 1
    }
}

/// Per-address and global supply counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationLedger {
    wallets: BTreeMap<Address, AllocationCounters>,
    total_supply: u64,
    reserve_minted: u64,
}

impl AllocationLedger {
    /// Rebuilds a ledger from persisted counters.
    ///
    /// `wallets` only needs the addresses the caller is about to touch; absent
    /// entries read as zero.
    pub fn from_parts(
        wallets: impl IntoIterator<Item = (Address, AllocationCounters)>,
        total_supply: u64,
        reserve_minted: u64,
    ) -> Self {
        let wallets = wallets
            .into_iter()
            .filter(|(_, counters)| counters.total() > 0)
            .collect();
        Self { wallets, total_supply, reserve_minted }
    }

    /// Iterates over every address with at least one mint.
    pub fn wallets(&self) -> impl Iterator<Item = (Address, AllocationCounters)> + '_ {
        self.wallets.iter().map(|(address, counters)| (*address, *counters))
    }

    /// Counters for `address`, zero if it never minted.
    pub fn counters(&self, address: Address) -> AllocationCounters {
        self.wallets.get(&address).copied().unwrap_or_default()
    }

    /// Tokens issued so far across all mint kinds.
    pub const fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Tokens issued through the owner reserve.
    pub const fn reserve_minted(&self) -> u64 {
        self.reserve_minted
    }

    /// `MAX_SUPPLY - total_supply`.
    pub const fn remaining_supply(&self) -> u64 {
        MAX_SUPPLY - self.total_supply
    }

    /// Returns true if `id` has been issued.
    pub const fn is_issued(&self, id: TokenId) -> bool {
        id >= 1 && id <= self.total_supply
    }

    /// Validates a presale request without recording it.
    pub fn check_presale(&self, address: Address, quantity: u64) -> Result<(), CapKind> {
        let counters = self.counters(address);
        within(counters.presale_minted, quantity, MAX_PRESALE_MINT)
            .ok_or(CapKind::PresaleWallet)?;
        within(counters.total(), quantity, MAX_PER_WALLET).ok_or(CapKind::Wallet)?;
        self.check_supply(quantity)
    }

    /// Validates a public request without recording it.
    pub fn check_public(&self, address: Address, quantity: u64) -> Result<(), CapKind> {
        within(self.counters(address).total(), quantity, MAX_PER_WALLET).ok_or(CapKind::Wallet)?;
        self.check_supply(quantity)
    }

    /// Validates a reserve request without recording it.
    pub fn check_reserve(&self, quantity: u64) -> Result<(), CapKind> {
        within(self.reserve_minted, quantity, RESERVE_SUPPLY).ok_or(CapKind::Reserve)?;
        self.check_supply(quantity)
    }

    /// Records a presale mint of `quantity` for `address`.
    pub fn reserve_presale(
        &mut self,
        address: Address,
        quantity: u64,
    ) -> Result<Allocation, CapKind> {
        self.check_presale(address, quantity)?;
        self.wallets.entry(address).or_default().presale_minted += quantity;
        Ok(self.issue(quantity))
    }

    /// Records a public mint of `quantity` for `address`.
    pub fn reserve_public(&mut self, address: Address, quantity: u64) -> Result<Allocation, CapKind> {
        self.check_public(address, quantity)?;
        self.wallets.entry(address).or_default().public_minted += quantity;
        Ok(self.issue(quantity))
    }

    /// Records an owner reserve mint of `quantity`.
    pub fn reserve_reserved(&mut self, quantity: u64) -> Result<Allocation, CapKind> {
        self.check_reserve(quantity)?;
        self.reserve_minted += quantity;
        Ok(self.issue(quantity))
    }

    fn check_supply(&self, quantity: u64) -> Result<(), CapKind> {
        within(self.total_supply, quantity, MAX_SUPPLY)
            .map(|_| ())
            .ok_or(CapKind::Supply)
    }

    // Callers have already passed the supply check.
    fn issue(&mut self, quantity: u64) -> Allocation {
        let first_id = self.total_supply + 1;
        self.total_supply += quantity;
        Allocation { first_id, quantity }
    }
}

/// `Some(current + quantity)` if it stays within `cap`.
fn within(current: u64, quantity: u64, cap: u64) -> Option<u64> {
    current.checked_add(quantity).filter(|total| *total <= cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ALICE: Address = address!("0x00000000000000000000000000000000000000a1");
    const BOB: Address = address!("0x00000000000000000000000000000000000000b1");

    #[test]
    fn presale_cap_is_per_wallet() {
        let mut ledger = AllocationLedger::default();
        let first = ledger.reserve_presale(ALICE, 2).expect("within presale cap");
        assert_eq!(first.ids(), 1..=2);

        let before = ledger.clone();
        assert_eq!(ledger.reserve_presale(ALICE, 1), Err(CapKind::PresaleWallet));
        assert_eq!(ledger, before, "rejected request must not touch counters");

        let second = ledger.reserve_presale(BOB, 1).expect("separate wallet, separate cap");
        assert_eq!(second.ids(), 3..=3);
        assert_eq!(ledger.total_supply(), 3);
    }

    #[test]
    fn public_cap_counts_presale_mints() {
        let mut ledger = AllocationLedger::default();
        ledger.reserve_presale(ALICE, 2).expect("presale");

        assert_eq!(ledger.reserve_public(ALICE, 2), Err(CapKind::Wallet));
        ledger.reserve_public(ALICE, 1).expect("fills wallet");
        assert_eq!(ledger.counters(ALICE).total(), MAX_PER_WALLET);
        assert_eq!(ledger.reserve_public(ALICE, 1), Err(CapKind::Wallet));
    }

    #[test]
    fn presale_after_public_respects_wallet_cap() {
        let mut ledger = AllocationLedger::default();
        ledger.reserve_public(ALICE, MAX_PER_WALLET).expect("fills wallet");

        let before = ledger.clone();
        assert_eq!(ledger.reserve_presale(ALICE, 1), Err(CapKind::Wallet));
        assert_eq!(ledger, before);

        ledger.reserve_public(BOB, 2).expect("public");
        ledger.reserve_presale(BOB, 1).expect("third token fits");
        assert_eq!(ledger.reserve_presale(BOB, 1), Err(CapKind::PresaleWallet));
        assert_eq!(ledger.counters(BOB).total(), MAX_PER_WALLET);
    }

    #[test]
    fn rebuilt_ledger_keeps_enforcing_caps() {
        let counters = AllocationCounters { presale_minted: 1, public_minted: 2 };
        let mut ledger =
            AllocationLedger::from_parts([(ALICE, counters), (BOB, Default::default())], 40, 10);
        assert_eq!(ledger.total_supply(), 40);
        assert_eq!(ledger.reserve_minted(), 10);
        assert_eq!(ledger.counters(ALICE), counters);
        assert_eq!(ledger.wallets().count(), 1, "zero counters are not stored");

        assert_eq!(ledger.reserve_public(ALICE, 1), Err(CapKind::Wallet));
        assert_eq!(ledger.reserve_public(BOB, 1).expect("fresh wallet").first_id, 41);
    }

    #[test]
    fn reserve_cap_is_independent_of_wallets() {
        let mut ledger = AllocationLedger::default();
        let block = ledger.reserve_reserved(RESERVE_SUPPLY).expect("full reserve");
        assert_eq!(block.ids(), 1..=RESERVE_SUPPLY);
        assert_eq!(ledger.reserve_reserved(1), Err(CapKind::Reserve));

        // reserve issuance does not eat into anyone's wallet allocation
        ledger.reserve_public(ALICE, 3).expect("public unaffected");
        assert_eq!(ledger.total_supply(), RESERVE_SUPPLY + 3);
        assert_eq!(ledger.remaining_supply(), MAX_SUPPLY - RESERVE_SUPPLY - 3);
    }

    #[test]
    fn global_supply_is_enforced_on_every_path() {
        let mut ledger = AllocationLedger {
            total_supply: MAX_SUPPLY - 1,
            ..Default::default()
        };

        assert_eq!(ledger.reserve_reserved(2), Err(CapKind::Supply));
        assert_eq!(ledger.reserve_public(ALICE, 2), Err(CapKind::Supply));
        assert_eq!(ledger.reserve_presale(ALICE, 2), Err(CapKind::Supply));

        let last = ledger.reserve_presale(ALICE, 1).expect("last token");
        assert_eq!(last.first_id, MAX_SUPPLY);
        assert_eq!(ledger.remaining_supply(), 0);
        assert_eq!(ledger.reserve_public(BOB, 1), Err(CapKind::Supply));
    }

    #[test]
    fn huge_quantities_do_not_overflow() {
        let mut ledger = AllocationLedger::default();
        assert_eq!(ledger.reserve_reserved(u64::MAX), Err(CapKind::Reserve));
        assert_eq!(ledger.reserve_presale(ALICE, u64::MAX), Err(CapKind::PresaleWallet));
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn issued_range_tracks_total_supply() {
        let mut ledger = AllocationLedger::default();
        assert!(!ledger.is_issued(0));
        assert!(!ledger.is_issued(1));
        ledger.reserve_reserved(2).expect("reserve");
        assert!(ledger.is_issued(1));
        assert!(ledger.is_issued(2));
        assert!(!ledger.is_issued(3));
    }
}
