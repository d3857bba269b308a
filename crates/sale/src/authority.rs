//! Single-owner access control with a one-way handoff to the DAO multisig,
//! plus the owner's administrative operations.

use crate::{error::SaleError, events::SaleEvent, state::SaleState};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Who may run owner-only operations.
///
/// The only transition is `DeployerOwned` → `DaoOwned`; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Authority {
    /// The deploying account holds control.
    #[serde(rename_all = "camelCase")]
    DeployerOwned {
        /// The deploying account.
        deployer: Address,
        /// Designated successor, fixed at construction.
        dao_multisig: Address,
    },
    /// Control has moved to the DAO multisig for good.
    #[serde(rename_all = "camelCase")]
    DaoOwned {
        /// The DAO multisig, now sole owner.
        dao_multisig: Address,
    },
}

impl Authority {
    /// Creates the initial authority. `dao_multisig` must be non-zero.
    ///
    /// A deployer that already is the multisig starts out DAO-owned.
    pub fn new(deployer: Address, dao_multisig: Address) -> Result<Self, SaleError> {
        if dao_multisig.is_zero() {
            return Err(SaleError::ZeroDaoMultisig);
        }
        if deployer == dao_multisig {
            return Ok(Self::DaoOwned { dao_multisig });
        }
        Ok(Self::DeployerOwned {
            deployer,
            dao_multisig,
        })
    }

    /// The current owner.
    pub const fn owner(&self) -> Address {
        match self {
            Self::DeployerOwned { deployer, .. } => *deployer,
            Self::DaoOwned { dao_multisig } => *dao_multisig,
        }
    }

    /// The designated DAO multisig.
    pub const fn dao_multisig(&self) -> Address {
        match self {
            Self::DeployerOwned { dao_multisig, .. } | Self::DaoOwned { dao_multisig } => {
                *dao_multisig
            }
        }
    }

    /// Returns true once control has been handed to the DAO.
    pub const fn is_dao_owned(&self) -> bool {
        matches!(self, Self::DaoOwned { .. })
    }

    /// Fails with [`SaleError::AccessDenied`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), SaleError> {
        if caller == self.owner() {
            Ok(())
        } else {
            warn!(target: "momo_sale", ?caller, owner = ?self.owner(), "owner-only call denied");
            Err(SaleError::AccessDenied { caller })
        }
    }

    /// Moves control to the DAO multisig, returning `(previous, new)` owners.
    fn hand_off(&mut self) -> Result<(Address, Address), SaleError> {
        match *self {
            Self::DeployerOwned {
                deployer,
                dao_multisig,
            } => {
                *self = Self::DaoOwned { dao_multisig };
                Ok((deployer, dao_multisig))
            }
            Self::DaoOwned { .. } => Err(SaleError::AlreadyHandedOff),
        }
    }
}

/// An outward value transfer the environment must carry out.
///
/// Bookkeeping has already been updated when a `Payout` is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    /// Recipient of the funds.
    pub to: Address,
    /// Amount in wei.
    pub amount: U256,
}

impl SaleState {
    /// Replaces the whitelist root. Proofs against the old root stop working;
    /// completed mints are unaffected.
    pub fn set_merkle_root(&mut self, caller: Address, root: B256) -> Result<SaleEvent, SaleError> {
        self.authority.ensure_owner(caller)?;
        self.merkle_root = root;
        info!(target: "momo_sale", %root, "merkle root updated");
        Ok(SaleEvent::MerkleRootUpdated { root })
    }

    /// Replaces both prices. Applies to later mints only.
    pub fn set_prices(
        &mut self,
        caller: Address,
        presale_price: U256,
        public_price: U256,
    ) -> Result<(), SaleError> {
        self.authority.ensure_owner(caller)?;
        self.prices.presale = presale_price;
        self.prices.public = public_price;
        info!(target: "momo_sale", %presale_price, %public_price, "prices updated");
        Ok(())
    }

    /// Irreversibly hands ownership to the DAO multisig.
    pub fn handoff_to_dao(&mut self, caller: Address) -> Result<SaleEvent, SaleError> {
        self.authority.ensure_owner(caller)?;
        let (previous_owner, new_owner) = self.authority.hand_off()?;
        info!(target: "momo_sale", ?previous_owner, ?new_owner, "ownership handed to DAO");
        Ok(SaleEvent::DaoHandoff {
            previous_owner,
            new_owner,
        })
    }

    /// Withdraws the whole treasury to the caller.
    pub fn withdraw(&mut self, caller: Address) -> Result<Payout, SaleError> {
        self.authority.ensure_owner(caller)?;
        self.drain_treasury(caller)
    }

    /// Withdraws the whole treasury to the DAO multisig.
    pub fn withdraw_to_dao(&mut self, caller: Address) -> Result<Payout, SaleError> {
        self.authority.ensure_owner(caller)?;
        self.drain_treasury(self.authority.dao_multisig())
    }

    // The balance is zeroed before the payout leaves this function.
    fn drain_treasury(&mut self, to: Address) -> Result<Payout, SaleError> {
        if self.treasury.is_zero() {
            return Err(SaleError::NothingToWithdraw);
        }
        let amount = std::mem::take(&mut self.treasury);
        info!(target: "momo_sale", ?to, %amount, "treasury withdrawn");
        Ok(Payout { to, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SaleConfig, phase::SalePhase};
    use alloy_primitives::address;

    const DEPLOYER: Address = address!("0x00000000000000000000000000000000000000a1");
    const DAO: Address = address!("0x00000000000000000000000000000000000000da");
    const STRANGER: Address = address!("0x00000000000000000000000000000000000000ff");

    fn state() -> SaleState {
        SaleState::new(SaleConfig::new("ipfs://hidden.json", B256::ZERO, DAO), DEPLOYER)
            .expect("valid config")
    }

    #[test]
    fn zero_dao_multisig_is_rejected() {
        assert_eq!(
            Authority::new(DEPLOYER, Address::ZERO),
            Err(SaleError::ZeroDaoMultisig)
        );
    }

    #[test]
    fn deployer_owns_until_handoff() {
        let mut state = state();
        assert_eq!(state.owner(), DEPLOYER);
        assert_eq!(state.dao_multisig(), DAO);

        let event = state.handoff_to_dao(DEPLOYER).expect("deployer hands off");
        assert_eq!(
            event,
            SaleEvent::DaoHandoff {
                previous_owner: DEPLOYER,
                new_owner: DAO,
            }
        );
        assert_eq!(state.owner(), DAO);
        assert!(state.authority().is_dao_owned());
    }

    #[test]
    fn former_owner_loses_rights_after_handoff() {
        let mut state = state();
        state.handoff_to_dao(DEPLOYER).expect("handoff");

        assert_eq!(
            state.toggle_sale(DEPLOYER),
            Err(SaleError::AccessDenied { caller: DEPLOYER })
        );
        assert_eq!(
            state.toggle_sale(DAO),
            Ok(SaleEvent::PhaseChanged {
                phase: SalePhase::Public
            })
        );
    }

    #[test]
    fn handoff_happens_once() {
        let mut state = state();
        assert_eq!(
            state.handoff_to_dao(STRANGER),
            Err(SaleError::AccessDenied { caller: STRANGER })
        );
        state.handoff_to_dao(DEPLOYER).expect("first handoff");
        assert_eq!(
            state.handoff_to_dao(DEPLOYER),
            Err(SaleError::AccessDenied { caller: DEPLOYER })
        );
        assert_eq!(state.handoff_to_dao(DAO), Err(SaleError::AlreadyHandedOff));
        assert_eq!(state.owner(), DAO);
    }

    #[test]
    fn deployer_that_is_the_dao_starts_dao_owned() {
        let state = SaleState::new(SaleConfig::new("ipfs://hidden.json", B256::ZERO, DAO), DAO)
            .expect("valid config");
        assert!(state.authority().is_dao_owned());
        assert_eq!(state.owner(), DAO);
    }

    #[test]
    fn root_and_prices_are_owner_only() {
        let mut state = state();
        let root = B256::repeat_byte(0x11);

        assert!(state.set_merkle_root(STRANGER, root).is_err());
        assert_eq!(
            state.set_merkle_root(DEPLOYER, root),
            Ok(SaleEvent::MerkleRootUpdated { root })
        );
        assert_eq!(state.merkle_root(), root);

        let (presale, public) = (U256::from(2u64), U256::from(4u64));
        assert!(state.set_prices(STRANGER, presale, public).is_err());
        state.set_prices(DEPLOYER, presale, public).expect("owner sets prices");
        assert_eq!(state.prices().presale, presale);
        assert_eq!(state.prices().public, public);
    }

    #[test]
    fn withdraw_drains_treasury_before_paying_out() {
        let mut state = state();
        assert_eq!(state.withdraw(DEPLOYER), Err(SaleError::NothingToWithdraw));

        state.treasury = U256::from(500u64);
        assert_eq!(
            state.withdraw(STRANGER),
            Err(SaleError::AccessDenied { caller: STRANGER })
        );
        let payout = state.withdraw(DEPLOYER).expect("owner withdraws");
        assert_eq!(
            payout,
            Payout {
                to: DEPLOYER,
                amount: U256::from(500u64)
            }
        );
        assert!(state.treasury().is_zero());
        assert_eq!(state.withdraw(DEPLOYER), Err(SaleError::NothingToWithdraw));
    }

    #[test]
    fn withdraw_to_dao_pays_the_multisig() {
        let mut state = state();
        state.treasury = U256::from(7u64);
        let payout = state.withdraw_to_dao(DEPLOYER).expect("owner withdraws");
        assert_eq!(payout.to, DAO);
        assert_eq!(payout.amount, U256::from(7u64));
    }
}
