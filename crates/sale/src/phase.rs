//! Sale lifecycle: `Closed` → `Presale` → `Public`, in any order the owner likes.

use crate::{error::SaleError, events::SaleEvent, state::SaleState};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// The active sale phase. Discriminants match the Solidity enum ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SalePhase {
    /// No presale or public minting.
    #[default]
    Closed = 0,
    /// Only whitelisted addresses may mint, at the presale price.
    Presale = 1,
    /// Anyone may mint, at the public price.
    Public = 2,
}

impl SalePhase {
    /// Label used in "not active" revert reasons.
    pub const fn sale_label(self) -> &'static str {
        match self {
            Self::Closed => "Sale",
            Self::Presale => "Presale",
            Self::Public => "Public sale",
        }
    }
}

impl From<SalePhase> for u8 {
    fn from(phase: SalePhase) -> Self {
        phase as Self
    }
}

impl TryFrom<u8> for SalePhase {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Closed),
            1 => Ok(Self::Presale),
            2 => Ok(Self::Public),
            other => Err(other),
        }
    }
}

impl fmt::Display for SalePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "Closed",
            Self::Presale => "Presale",
            Self::Public => "Public",
        })
    }
}

impl SaleState {
    /// Switches to [`SalePhase::Presale`] from any phase.
    pub fn open_presale(&mut self, caller: Address) -> Result<SaleEvent, SaleError> {
        self.set_phase(caller, SalePhase::Presale)
    }

    /// Switches to [`SalePhase::Public`] from any phase.
    pub fn toggle_sale(&mut self, caller: Address) -> Result<SaleEvent, SaleError> {
        self.set_phase(caller, SalePhase::Public)
    }

    /// Switches to [`SalePhase::Closed`] from any phase.
    pub fn close_sale(&mut self, caller: Address) -> Result<SaleEvent, SaleError> {
        self.set_phase(caller, SalePhase::Closed)
    }

    /// Fails unless `expected` is the active phase.
    pub(crate) fn ensure_phase(&self, expected: SalePhase) -> Result<(), SaleError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SaleError::InvalidPhase {
                expected,
                current: self.phase,
            })
        }
    }

    // Counters are phase independent and are never reset here.
    fn set_phase(&mut self, caller: Address, phase: SalePhase) -> Result<SaleEvent, SaleError> {
        self.authority.ensure_owner(caller)?;
        let previous = std::mem::replace(&mut self.phase, phase);
        info!(target: "momo_sale", %previous, %phase, "sale phase changed");
        Ok(SaleEvent::PhaseChanged { phase })
    }
}
