//! Notifications emitted by committed operations.
//!
//! The core only produces these; delivering them to observers is the
//! embedding environment's job. [`SaleEvent::to_log_data`] gives the Solidity
//! log encoding.

use crate::phase::SalePhase;
use alloy_primitives::{Address, LogData, B256};
use alloy_sol_types::{sol, SolEvent};

sol! {
    /// Emitted whenever the owner switches the sale phase.
    event PhaseChanged(uint8 phase);

    /// Emitted once, when token metadata is revealed.
    event Revealed(string baseURI);

    /// Emitted when the whitelist snapshot is replaced.
    event MerkleRootUpdated(bytes32 newRoot);

    /// Emitted when administrative control moves to the DAO multisig.
    event DAOHandoff(address indexed previousOwner, address indexed newOwner);
}

/// A state-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleEvent {
    /// The sale phase changed.
    PhaseChanged {
        /// Phase now in effect.
        phase: SalePhase,
    },
    /// Metadata was revealed.
    Revealed {
        /// Base URI for per-token metadata.
        base_uri: String,
    },
    /// The whitelist root was replaced.
    MerkleRootUpdated {
        /// New root.
        root: B256,
    },
    /// Ownership was handed to the DAO multisig.
    DaoHandoff {
        /// Owner before the handoff.
        previous_owner: Address,
        /// Owner after the handoff (the DAO multisig).
        new_owner: Address,
    },
}

impl SaleEvent {
    /// ABI-encodes the event as log topics and data.
    pub fn to_log_data(&self) -> LogData {
        match self {
            Self::PhaseChanged { phase } => PhaseChanged {
                phase: u8::from(*phase),
            }
            .encode_log_data(),
            Self::Revealed { base_uri } => Revealed {
                baseURI: base_uri.clone(),
            }
            .encode_log_data(),
            Self::MerkleRootUpdated { root } => MerkleRootUpdated { newRoot: *root }.encode_log_data(),
            Self::DaoHandoff {
                previous_owner,
                new_owner,
            } => DAOHandoff {
                previousOwner: *previous_owner,
                newOwner: *new_owner,
            }
            .encode_log_data(),
        }
    }
}
