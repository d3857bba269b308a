//! Errors surfaced by sale operations.
//!
//! The `Display` output of every variant is the revert reason handed back to
//! callers, so it must stay stable.

use crate::{constants::TokenId, phase::SalePhase};
use alloy_primitives::{Address, U256};
use std::fmt;
use thiserror::Error;

/// The ceiling a rejected request would have crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapKind {
    /// Per-wallet presale allocation (`MAX_PRESALE_MINT`).
    PresaleWallet,
    /// Combined presale + public per-wallet allocation (`MAX_PER_WALLET`).
    Wallet,
    /// Owner reserve allocation (`RESERVE_SUPPLY`).
    Reserve,
    /// Global supply (`MAX_SUPPLY`).
    Supply,
}

impl fmt::Display for CapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PresaleWallet => "Exceeds presale limit",
            Self::Wallet => "Exceeds wallet limit",
            Self::Reserve => "Exceeds reserve supply",
            Self::Supply => "Exceeds max supply",
        })
    }
}

/// Reasons a sale operation is rejected. Every variant aborts the whole
/// operation with no state change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// The caller may not run an owner-only operation.
    #[error("Ownable: caller {caller} is not the owner")]
    AccessDenied {
        /// Address that attempted the call.
        caller: Address,
    },
    /// The requested mint kind is not accepted in the active phase.
    #[error("{} not active", .expected.sale_label())]
    InvalidPhase {
        /// Phase the mint kind requires.
        expected: SalePhase,
        /// Phase that was active.
        current: SalePhase,
    },
    /// The merkle proof does not verify against the current root.
    #[error("Not whitelisted")]
    NotWhitelisted,
    /// Quantity is zero or above the per-call ceiling.
    #[error("Invalid quantity")]
    InvalidQuantity {
        /// Quantity that was requested.
        quantity: u64,
    },
    /// A supply or allocation ceiling would be crossed.
    #[error("{0}")]
    ExceedsCap(CapKind),
    /// The tendered value is below `quantity * price`.
    #[error("Insufficient payment: required {required} wei, provided {provided} wei")]
    InsufficientPayment {
        /// Amount the request costs.
        required: U256,
        /// Amount that was tendered.
        provided: U256,
    },
    /// A required address was zero.
    #[error("Zero address")]
    ZeroAddress,
    /// The DAO multisig given at construction was zero.
    #[error("DAO multisig cannot be zero address")]
    ZeroDaoMultisig,
    /// Reveal was attempted after metadata was already revealed.
    #[error("Already revealed")]
    AlreadyRevealed,
    /// The identifier has never been issued.
    #[error("ERC721: nonexistent token {0}")]
    NonexistentToken(TokenId),
    /// The tracked treasury balance is zero.
    #[error("Nothing to withdraw")]
    NothingToWithdraw,
    /// Administrative control already belongs to the DAO multisig.
    #[error("Already handed off to DAO")]
    AlreadyHandedOff,
}

impl SaleError {
    /// Returns the cap kind for [`SaleError::ExceedsCap`] errors.
    pub const fn cap(&self) -> Option<CapKind> {
        match self {
            Self::ExceedsCap(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<CapKind> for SaleError {
    fn from(kind: CapKind) -> Self {
        Self::ExceedsCap(kind)
    }
}
