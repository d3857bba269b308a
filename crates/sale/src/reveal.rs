//! One-time metadata reveal and token URI derivation.

use crate::{
    constants::{TokenId, TOKEN_URI_SUFFIX},
    error::SaleError,
    events::SaleEvent,
    state::SaleState,
};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Metadata addressing. `revealed` only ever goes from false to true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealState {
    revealed: bool,
    base_uri: String,
    unrevealed_uri: String,
}

impl RevealState {
    /// Placeholder metadata for every token until reveal.
    pub fn new(unrevealed_uri: impl Into<String>) -> Self {
        Self {
            revealed: false,
            base_uri: String::new(),
            unrevealed_uri: unrevealed_uri.into(),
        }
    }

    /// Restores a persisted reveal record.
    pub fn from_parts(
        revealed: bool,
        base_uri: impl Into<String>,
        unrevealed_uri: impl Into<String>,
    ) -> Self {
        Self {
            revealed,
            base_uri: base_uri.into(),
            unrevealed_uri: unrevealed_uri.into(),
        }
    }

    /// Returns true after [`SaleState::reveal`] has succeeded.
    pub const fn revealed(&self) -> bool {
        self.revealed
    }

    /// Base URI, empty until revealed.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Placeholder URI fixed at construction.
    pub fn unrevealed_uri(&self) -> &str {
        &self.unrevealed_uri
    }

    /// URI for `id`, assuming `id` has been issued.
    pub fn uri_for(&self, id: TokenId) -> String {
        if self.revealed {
            format!("{}{id}{TOKEN_URI_SUFFIX}", self.base_uri)
        } else {
            self.unrevealed_uri.clone()
        }
    }
}

impl SaleState {
    /// Reveals metadata under `base_uri`. Succeeds exactly once.
    pub fn reveal(
        &mut self,
        caller: Address,
        base_uri: impl Into<String>,
    ) -> Result<SaleEvent, SaleError> {
        self.authority.ensure_owner(caller)?;
        if self.reveal.revealed {
            return Err(SaleError::AlreadyRevealed);
        }
        let base_uri = base_uri.into();
        self.reveal.revealed = true;
        self.reveal.base_uri.clone_from(&base_uri);
        info!(target: "momo_sale", %base_uri, "metadata revealed");
        Ok(SaleEvent::Revealed { base_uri })
    }

    /// Metadata URI for an issued token.
    pub fn token_uri(&self, id: TokenId) -> Result<String, SaleError> {
        if !self.allocations.is_issued(id) {
            return Err(SaleError::NonexistentToken(id));
        }
        Ok(self.reveal.uri_for(id))
    }
}
