//! # MomoCandie Sale
//!
//! Mint authority for the MomoCandie collection (`MomoCandieNFT` / `MOMO`):
//! a phased sale with a merkle-whitelisted presale, a public sale, an
//! owner-only reserve, a one-time metadata reveal and a one-way ownership
//! handoff to a DAO multisig.
//!
//! ## Supply
//!
//! | Ceiling | Value | Applies to |
//! |---------|-------|------------|
//! | `MAX_SUPPLY` | 3333 | every issuance path |
//! | `RESERVE_SUPPLY` | 111 | owner reserve mints |
//! | `MAX_PER_WALLET` | 3 | presale + public per address |
//! | `MAX_PRESALE_MINT` | 2 | presale per address |
//!
//! Identifiers start at 1 and are issued consecutively with no gaps.
//!
//! ## Execution model
//!
//! [`SaleState`] is a plain value. Every operation takes `&mut self` plus the
//! caller (and tendered value, for paid mints) and either applies all of its
//! effects or returns a [`SaleError`] with nothing changed. Token ownership is
//! delegated to a [`TokenLedger`]; value transfers out are returned as a
//! [`Payout`] for the environment to execute.
//!
//! ```ignore
//! use momo_sale::{InMemoryTokenLedger, SaleConfig, SaleState};
//!
//! let mut sale = SaleState::new(SaleConfig::from_env()?, deployer)?;
//! let mut ledger = InMemoryTokenLedger::default();
//! sale.toggle_sale(deployer)?;
//! let receipt = sale.public_mint(&mut ledger, buyer, value, 2)?;
//! ```

pub mod allocation;
pub mod authority;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod merkle;
pub mod phase;
pub mod reveal;
pub mod state;
pub mod token_ledger;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use allocation::{AllocationCounters, AllocationLedger};
pub use authority::{Authority, Payout};
pub use config::{ConfigError, SaleConfig};
pub use constants::TokenId;
pub use engine::MintReceipt;
pub use error::{CapKind, SaleError};
pub use events::SaleEvent;
pub use phase::SalePhase;
pub use reveal::RevealState;
pub use state::{PriceSchedule, SaleParts, SaleState};
pub use token_ledger::{InMemoryTokenLedger, TokenLedger};
