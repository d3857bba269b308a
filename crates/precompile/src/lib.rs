//! # MomoCandie Sale Precompile
//!
//! Runs the `momo-sale` engine natively inside the EVM. Contracts and
//! wallets talk to it through the [`abi::IMomoCandie`] interface at
//! [`sale_precompile::SALE_PRECOMPILE_ADDR`].
//!
//! | Address | Name | Description |
//! |---------|------|-------------|
//! | `0xF200` | [`sale_precompile`] | Phased NFT sale (mints, admin, views, withdrawals) |
//!
//! ## Integration
//!
//! Install the precompile into the EVM factory's precompile map. Sale state
//! lives in the storage of the precompile account and is reverted and
//! persisted along with the rest of the chain state:
//!
//! ```ignore
//! use momo_precompile::MomoSalePrecompile;
//! use momo_sale::SaleConfig;
//!
//! let sale = MomoSalePrecompile::new(SaleConfig::from_env()?, deployer)?;
//! sale.install(evm.precompiles_mut());
//! ```
//!
//! Reverts carry the sale's reason string (for example `"Not whitelisted"`)
//! in `PrecompileError::Other`. Sale events are appended to the journal as
//! logs emitted by the precompile address.

pub mod abi;
pub mod sale_precompile;
mod storage;

pub use sale_precompile::{MomoSalePrecompile, SALE_PRECOMPILE_ADDR};
