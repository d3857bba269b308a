//! Fixed business parameters of the MomoCandie collection.

use alloy_primitives::U256;

/// Collection name reported to metadata consumers.
pub const NAME: &str = "MomoCandieNFT";

/// Collection ticker symbol.
pub const SYMBOL: &str = "MOMO";

/// Hard ceiling on the number of tokens that can ever exist.
pub const MAX_SUPPLY: u64 = 3333;

/// Ceiling on owner-issued reserve tokens (team and promotional allocation).
pub const RESERVE_SUPPLY: u64 = 111;

/// Per-wallet ceiling shared by presale and public allocations.
pub const MAX_PER_WALLET: u64 = 3;

/// Per-wallet ceiling for the presale phase alone.
pub const MAX_PRESALE_MINT: u64 = 2;

/// Suffix appended to revealed token URIs.
pub const TOKEN_URI_SUFFIX: &str = ".json";

/// 0.03 ether.
pub const DEFAULT_PRESALE_PRICE: U256 = U256::from_limbs([30_000_000_000_000_000, 0, 0, 0]);

/// 0.05 ether.
pub const DEFAULT_PUBLIC_PRICE: U256 = U256::from_limbs([50_000_000_000_000_000, 0, 0, 0]);

/// Sequential token identifier. Identifiers start at 1.
pub type TokenId = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prices_match_ether_amounts() {
        let ether = U256::from(10u64).pow(U256::from(18));
        assert_eq!(DEFAULT_PRESALE_PRICE, ether * U256::from(3u64) / U256::from(100u64));
        assert_eq!(DEFAULT_PUBLIC_PRICE, ether * U256::from(5u64) / U256::from(100u64));
    }
}
