//! Construction parameters for a sale.

use crate::constants::{DEFAULT_PRESALE_PRICE, DEFAULT_PUBLIC_PRICE};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{env, str::FromStr};
use thiserror::Error;

/// Environment variable holding the placeholder metadata URI.
pub const UNREVEALED_URI_ENV: &str = "UNREVEALED_URI";
/// Environment variable holding the initial whitelist root.
pub const MERKLE_ROOT_ENV: &str = "MERKLE_ROOT";
/// Environment variable holding the DAO multisig address.
pub const DAO_MULTISIG_ENV: &str = "DAO_MULTISIG";
/// Optional presale price override, in wei.
pub const PRESALE_PRICE_ENV: &str = "PRESALE_PRICE_WEI";
/// Optional public price override, in wei.
pub const PUBLIC_PRICE_ENV: &str = "PUBLIC_PRICE_WEI";

/// One-time construction parameters.
///
/// Expected JSON shape (under a `momoSale` key when read with
/// [`SaleConfig::from_json`]):
/// {
///   "unrevealedUri": "ipfs://Qm.../unrevealed.json",
///   "merkleRoot": "0x...",
///   "daoMultisig": "0x...",
///   "presalePrice": "0x6a94d74f430000",
///   "publicPrice": "0xb1a2bc2ec50000"
/// }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleConfig {
    /// Metadata URI served for every token until reveal.
    pub unrevealed_uri: String,
    /// Initial whitelist root.
    pub merkle_root: B256,
    /// Designated successor owner. Must be non-zero.
    pub dao_multisig: Address,
    /// Initial presale price in wei.
    #[serde(default = "default_presale_price")]
    pub presale_price: U256,
    /// Initial public price in wei.
    #[serde(default = "default_public_price")]
    pub public_price: U256,
}

impl SaleConfig {
    /// Creates a config with the default prices.
    pub fn new(unrevealed_uri: impl Into<String>, merkle_root: B256, dao_multisig: Address) -> Self {
        Self {
            unrevealed_uri: unrevealed_uri.into(),
            merkle_root,
            dao_multisig,
            presale_price: DEFAULT_PRESALE_PRICE,
            public_price: DEFAULT_PUBLIC_PRICE,
        }
    }

    /// Overrides both prices.
    pub fn with_prices(mut self, presale_price: U256, public_price: U256) -> Self {
        self.presale_price = presale_price;
        self.public_price = public_price;
        self
    }

    /// Loads the configuration from the process environment.
    ///
    /// Addresses and the root are hex (with or without `0x`); prices are
    /// decimal wei.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the `momoSale` object from a JSON blob.
    pub fn from_json(extras: &Value) -> Result<Self, ConfigError> {
        let section = extras.get("momoSale").ok_or(ConfigError::Missing)?;
        serde_json::from_value(section.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &str| -> Result<String, ConfigError> {
            let raw = lookup(var).ok_or_else(|| ConfigError::MissingEnv { var: var.into() })?;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyEnv { var: var.into() });
            }
            Ok(trimmed.to_string())
        };
        let price = |var: &str, default: U256| -> Result<U256, ConfigError> {
            match lookup(var).filter(|raw| !raw.trim().is_empty()) {
                Some(raw) => U256::from_str_radix(raw.trim(), 10).map_err(|err| {
                    ConfigError::InvalidPrice {
                        var: var.into(),
                        reason: err.to_string(),
                    }
                }),
                None => Ok(default),
            }
        };

        let unrevealed_uri = required(UNREVEALED_URI_ENV)?;
        let merkle_root = B256::from_str(&required(MERKLE_ROOT_ENV)?)
            .map_err(|err| ConfigError::InvalidRoot(err.to_string()))?;
        let dao_multisig = Address::from_str(&required(DAO_MULTISIG_ENV)?)
            .map_err(|err| ConfigError::InvalidAddress(err.to_string()))?;

        Ok(Self {
            unrevealed_uri,
            merkle_root,
            dao_multisig,
            presale_price: price(PRESALE_PRICE_ENV, DEFAULT_PRESALE_PRICE)?,
            public_price: price(PUBLIC_PRICE_ENV, DEFAULT_PUBLIC_PRICE)?,
        })
    }
}

const fn default_presale_price() -> U256 {
    DEFAULT_PRESALE_PRICE
}

const fn default_public_price() -> U256 {
    DEFAULT_PUBLIC_PRICE
}

/// Errors that can occur while building a [`SaleConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("environment variable {var} is not set")]
    MissingEnv {
        /// Name of the missing variable.
        var: String,
    },
    /// A required environment variable was empty or whitespace.
    #[error("environment variable {var} is empty")]
    EmptyEnv {
        /// Name of the empty variable.
        var: String,
    },
    /// The DAO multisig could not be parsed.
    #[error("invalid DAO multisig address: {0}")]
    InvalidAddress(String),
    /// The merkle root could not be parsed.
    #[error("invalid merkle root: {0}")]
    InvalidRoot(String),
    /// A price override could not be parsed.
    #[error("invalid price in {var}: {reason}")]
    InvalidPrice {
        /// Name of the offending variable.
        var: String,
        /// Parser message.
        reason: String,
    },
    /// The JSON blob had no `momoSale` section.
    #[error("missing momoSale config")]
    Missing,
    /// The `momoSale` section did not deserialize.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use serde_json::json;
    use std::collections::HashMap;

    const ROOT: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const DAO: &str = "0x00000000000000000000000000000000000000da";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn loads_required_values_with_default_prices() {
        let cfg = SaleConfig::from_lookup(lookup(&[
            (UNREVEALED_URI_ENV, "ipfs://hidden.json"),
            (MERKLE_ROOT_ENV, ROOT),
            (DAO_MULTISIG_ENV, DAO),
        ]))
        .unwrap();

        assert_eq!(cfg.unrevealed_uri, "ipfs://hidden.json");
        assert_eq!(
            cfg.merkle_root,
            b256!("0x1111111111111111111111111111111111111111111111111111111111111111")
        );
        assert_eq!(cfg.dao_multisig, address!("0x00000000000000000000000000000000000000da"));
        assert_eq!(cfg.presale_price, DEFAULT_PRESALE_PRICE);
        assert_eq!(cfg.public_price, DEFAULT_PUBLIC_PRICE);
    }

    #[test]
    fn price_overrides_are_decimal_wei() {
        let cfg = SaleConfig::from_lookup(lookup(&[
            (UNREVEALED_URI_ENV, "ipfs://hidden.json"),
            (MERKLE_ROOT_ENV, ROOT),
            (DAO_MULTISIG_ENV, DAO),
            (PRESALE_PRICE_ENV, "20000000000000000"),
            (PUBLIC_PRICE_ENV, " 40000000000000000 "),
        ]))
        .unwrap();

        assert_eq!(cfg.presale_price, U256::from(20_000_000_000_000_000u64));
        assert_eq!(cfg.public_price, U256::from(40_000_000_000_000_000u64));
    }

    #[test]
    fn reports_missing_and_empty_variables() {
        let err = SaleConfig::from_lookup(lookup(&[(UNREVEALED_URI_ENV, "ipfs://hidden.json")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnv {
                var: MERKLE_ROOT_ENV.into()
            }
        );

        let err = SaleConfig::from_lookup(lookup(&[(UNREVEALED_URI_ENV, "  ")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyEnv {
                var: UNREVEALED_URI_ENV.into()
            }
        );
    }

    #[test]
    fn rejects_malformed_values() {
        let err = SaleConfig::from_lookup(lookup(&[
            (UNREVEALED_URI_ENV, "ipfs://hidden.json"),
            (MERKLE_ROOT_ENV, "0x1234"),
            (DAO_MULTISIG_ENV, DAO),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot(_)));

        let err = SaleConfig::from_lookup(lookup(&[
            (UNREVEALED_URI_ENV, "ipfs://hidden.json"),
            (MERKLE_ROOT_ENV, ROOT),
            (DAO_MULTISIG_ENV, "not_an_address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress(_)));

        let err = SaleConfig::from_lookup(lookup(&[
            (UNREVEALED_URI_ENV, "ipfs://hidden.json"),
            (MERKLE_ROOT_ENV, ROOT),
            (DAO_MULTISIG_ENV, DAO),
            (PUBLIC_PRICE_ENV, "five"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrice { .. }));
    }

    #[test]
    fn parses_json_section() {
        let extras = json!({
            "momoSale": {
                "unrevealedUri": "ipfs://hidden.json",
                "merkleRoot": ROOT,
                "daoMultisig": DAO,
            }
        });
        let cfg = SaleConfig::from_json(&extras).unwrap();
        assert_eq!(cfg.presale_price, DEFAULT_PRESALE_PRICE);
        assert_eq!(cfg.unrevealed_uri, "ipfs://hidden.json");

        assert_eq!(SaleConfig::from_json(&json!({})), Err(ConfigError::Missing));
        assert!(matches!(
            SaleConfig::from_json(&json!({ "momoSale": { "merkleRoot": ROOT } })),
            Err(ConfigError::Invalid(_))
        ));
    }
}
