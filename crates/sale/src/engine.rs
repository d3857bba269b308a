//! Presale, public and reserve mint paths.
//!
//! Each path runs its checks in a fixed order (phase, whitelist, quantity,
//! caps, payment) and only then commits: counters first, treasury second, and
//! the token ledger last.

use crate::{
    allocation::Allocation,
    constants::{TokenId, MAX_PER_WALLET},
    error::SaleError,
    merkle,
    phase::SalePhase,
    state::SaleState,
    token_ledger::TokenLedger,
};
use alloy_primitives::{Address, B256, U256};
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument};

/// Result of an accepted mint request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintReceipt {
    /// Recipient of the new tokens.
    pub to: Address,
    /// First identifier issued.
    pub first_id: TokenId,
    /// Number of identifiers issued.
    pub quantity: u64,
    /// Value credited to the treasury, overpayment included.
    pub paid: U256,
}

impl MintReceipt {
    /// Identifiers issued, in order.
    pub fn ids(&self) -> RangeInclusive<TokenId> {
        self.first_id..=self.first_id + self.quantity - 1
    }
}

impl SaleState {
    /// Whitelisted mint during [`SalePhase::Presale`].
    ///
    /// `value` is the amount tendered with the request. Anything above
    /// `quantity * presale_price` is kept.
    #[instrument(
        target = "momo_sale",
        skip_all,
        fields(caller = %caller, quantity = quantity, first_id = tracing::field::Empty)
    )]
    pub fn presale_mint<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        caller: Address,
        value: U256,
        quantity: u64,
        proof: &[B256],
    ) -> Result<MintReceipt, SaleError> {
        self.ensure_phase(SalePhase::Presale)?;
        if !merkle::verify(caller, proof, self.merkle_root) {
            debug!(target: "momo_sale", ?caller, proof_len = proof.len(), "whitelist proof rejected");
            return Err(SaleError::NotWhitelisted);
        }
        if quantity == 0 {
            return Err(SaleError::InvalidQuantity { quantity });
        }
        self.allocations.check_presale(caller, quantity)?;
        ensure_payment(quantity, self.prices.presale, value)?;

        let allocation = self.allocations.reserve_presale(caller, quantity)?;
        Ok(self.settle(ledger, caller, allocation, value))
    }

    /// Open mint during [`SalePhase::Public`], at most `MAX_PER_WALLET` per call.
    #[instrument(
        target = "momo_sale",
        skip_all,
        fields(caller = %caller, quantity = quantity, first_id = tracing::field::Empty)
    )]
    pub fn public_mint<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        caller: Address,
        value: U256,
        quantity: u64,
    ) -> Result<MintReceipt, SaleError> {
        self.ensure_phase(SalePhase::Public)?;
        if quantity == 0 || quantity > MAX_PER_WALLET {
            return Err(SaleError::InvalidQuantity { quantity });
        }
        self.allocations.check_public(caller, quantity)?;
        ensure_payment(quantity, self.prices.public, value)?;

        let allocation = self.allocations.reserve_public(caller, quantity)?;
        Ok(self.settle(ledger, caller, allocation, value))
    }

    /// Owner-only issuance from the reserve, free and independent of phase.
    #[instrument(
        target = "momo_sale",
        skip_all,
        fields(caller = %caller, to = %to, quantity = quantity, first_id = tracing::field::Empty)
    )]
    pub fn reserve_mint<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        caller: Address,
        to: Address,
        quantity: u64,
    ) -> Result<MintReceipt, SaleError> {
        self.authority.ensure_owner(caller)?;
        if to.is_zero() {
            return Err(SaleError::ZeroAddress);
        }
        if quantity == 0 {
            return Err(SaleError::InvalidQuantity { quantity });
        }

        let allocation = self.allocations.reserve_reserved(quantity)?;
        Ok(self.settle(ledger, to, allocation, U256::ZERO))
    }

    // Counters are already committed; the ledger sees them before any minting.
    fn settle<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        to: Address,
        allocation: Allocation,
        paid: U256,
    ) -> MintReceipt {
        // total ether in existence is far below U256::MAX
        self.treasury = self.treasury.saturating_add(paid);
        for id in allocation.ids() {
            ledger.mint(to, id);
        }

        tracing::Span::current().record("first_id", allocation.first_id);
        info!(
            target: "momo_sale",
            ?to,
            first_id = allocation.first_id,
            quantity = allocation.quantity,
            %paid,
            total_supply = self.allocations.total_supply(),
            "tokens minted"
        );
        MintReceipt {
            to,
            first_id: allocation.first_id,
            quantity: allocation.quantity,
            paid,
        }
    }
}

/// Fails unless `value` covers `quantity * price`.
fn ensure_payment(quantity: u64, price: U256, value: U256) -> Result<(), SaleError> {
    let required = U256::from(quantity).saturating_mul(price);
    if value < required {
        return Err(SaleError::InsufficientPayment {
            required,
            provided: value,
        });
    }
    Ok(())
}
