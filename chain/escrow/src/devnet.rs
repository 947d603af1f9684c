//! In-process development network
//!
//! Plays the part of the chain around the ledger: funded local accounts with
//! native wallets, a caller identity for every call, attached value moved
//! from the caller's wallet into the contract, and the release of value from
//! the contract back into wallets. A reverted ledger call refunds the
//! attached value, so a failed call costs the caller nothing.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};
use types::ids::AccountId;
use types::numeric::Wei;

use crate::config::DevnetConfig;
use crate::errors::{DevnetError, LedgerError, ReleaseError};
use crate::events::ContractEvent;
use crate::ledger::Ledger;
use crate::release::ValueRelease;

/// Native wallets plus the contract's own native balance.
///
/// Serves as the ledger's release mechanism on this network.
#[derive(Debug, Default)]
pub struct Wallets {
    balances: HashMap<AccountId, Wei>,
    contract: Wei,
    rejecting: HashSet<AccountId>,
}

impl Wallets {
    pub fn balance(&self, account: &AccountId) -> Wei {
        self.balances.get(account).copied().unwrap_or(Wei::ZERO)
    }

    pub fn contract_balance(&self) -> Wei {
        self.contract
    }

    /// Move attached value from `from`'s wallet into the contract.
    fn collect(&mut self, from: AccountId, value: Wei) -> Result<(), DevnetError> {
        let available = self
            .balances
            .get(&from)
            .copied()
            .ok_or(DevnetError::UnknownAccount { account: from })?;
        let remaining = available
            .checked_sub(value)
            .ok_or(DevnetError::InsufficientFunds {
                account: from,
                required: value,
                available,
            })?;
        let contract = self
            .contract
            .checked_add(value)
            .ok_or(DevnetError::NativeOverflow)?;

        self.balances.insert(from, remaining);
        self.contract = contract;
        Ok(())
    }

    /// Return attached value of a reverted call.
    fn refund(&mut self, to: AccountId, value: Wei) -> Result<(), DevnetError> {
        let contract = self
            .contract
            .checked_sub(value)
            .ok_or(DevnetError::NativeOverflow)?;
        let balance = self
            .balance(&to)
            .checked_add(value)
            .ok_or(DevnetError::NativeOverflow)?;

        self.contract = contract;
        self.balances.insert(to, balance);
        Ok(())
    }
}

impl ValueRelease for Wallets {
    fn release(
        &mut self,
        _ledger: &mut Ledger,
        to: AccountId,
        amount: Wei,
    ) -> Result<(), ReleaseError> {
        if self.rejecting.contains(&to) {
            return Err(ReleaseError::Rejected { recipient: to });
        }
        let contract = self
            .contract
            .checked_sub(amount)
            .ok_or_else(|| ReleaseError::Unavailable {
                reason: format!("contract holds only {}", self.contract),
            })?;
        let balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or_else(|| ReleaseError::Unavailable {
                reason: format!("wallet of {} would overflow", to),
            })?;

        self.contract = contract;
        self.balances.insert(to, balance);
        Ok(())
    }

    fn reclaim(&mut self, to: AccountId, amount: Wei) {
        let balance = self.balance(&to).checked_sub(amount).unwrap_or(Wei::ZERO);
        self.balances.insert(to, balance);
        self.contract = self.contract.checked_add(amount).unwrap_or(Wei::MAX);
    }
}

/// Local chain with one ledger deployment.
#[derive(Debug)]
pub struct Devnet {
    config: DevnetConfig,
    accounts: Vec<AccountId>,
    contract: AccountId,
    ledger: Ledger,
    wallets: Wallets,
}

impl Devnet {
    /// Fund the configured local accounts and deploy a fresh ledger.
    pub fn new(config: DevnetConfig) -> Result<Self, DevnetError> {
        config.validate()?;
        let initial = Wei::ether(u128::from(config.initial_wallet_ether))
            .ok_or(DevnetError::NativeOverflow)?;

        let accounts: Vec<AccountId> = (0..config.account_count)
            .map(|_| AccountId::new())
            .collect();
        let mut wallets = Wallets::default();
        for account in &accounts {
            wallets.balances.insert(*account, initial);
        }

        let contract = AccountId::new();
        info!(
            network = %config.network.name,
            chain_id = config.network.chain_id,
            accounts = accounts.len(),
            %contract,
            "Ledger deployed"
        );

        Ok(Self {
            config,
            accounts,
            contract,
            ledger: Ledger::new(),
            wallets,
        })
    }

    pub fn config(&self) -> &DevnetConfig {
        &self.config
    }

    /// Address of the ledger deployment.
    pub fn contract_id(&self) -> AccountId {
        self.contract
    }

    /// The named deployer account.
    pub fn deployer(&self) -> AccountId {
        self.accounts[self.config.deployer_index]
    }

    pub fn account(&self, index: usize) -> Option<AccountId> {
        self.accounts.get(index).copied()
    }

    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn wallet_balance(&self, account: &AccountId) -> Wei {
        self.wallets.balance(account)
    }

    /// Native value held by the contract: tracked balances plus retained surplus.
    pub fn contract_balance(&self) -> Wei {
        self.wallets.contract_balance()
    }

    /// Make `account` refuse incoming value.
    pub fn reject_incoming(&mut self, account: AccountId) {
        self.wallets.rejecting.insert(account);
    }

    pub fn accept_incoming(&mut self, account: &AccountId) {
        self.wallets.rejecting.remove(account);
    }

    // ───────────────────────── Calls ─────────────────────────

    pub fn deposit(&mut self, from: AccountId, value: Wei) -> Result<ContractEvent, DevnetError> {
        self.wallets.collect(from, value)?;
        let result = self.ledger.deposit(from, value);
        self.settle(from, value, result)
    }

    pub fn withdraw(&mut self, from: AccountId) -> Result<ContractEvent, DevnetError> {
        self.known(from)?;
        let result = self.ledger.withdraw(from, &mut self.wallets);
        self.settle(from, Wei::ZERO, result)
    }

    pub fn transfer(
        &mut self,
        from: AccountId,
        recipients: &[AccountId],
        amounts: &[Wei],
        value: Wei,
    ) -> Result<ContractEvent, DevnetError> {
        self.wallets.collect(from, value)?;
        let result = self
            .ledger
            .transfer(from, recipients, amounts, value, &mut self.wallets);
        self.settle(from, value, result)
    }

    fn known(&self, account: AccountId) -> Result<(), DevnetError> {
        if self.wallets.balances.contains_key(&account) {
            Ok(())
        } else {
            Err(DevnetError::UnknownAccount { account })
        }
    }

    /// Refund attached value when the ledger call reverted.
    fn settle(
        &mut self,
        from: AccountId,
        value: Wei,
        result: Result<ContractEvent, LedgerError>,
    ) -> Result<ContractEvent, DevnetError> {
        match result {
            Ok(event) => {
                debug!(%from, %value, event = event.label(), "Call succeeded");
                Ok(event)
            }
            Err(err) => {
                if !value.is_zero() {
                    self.wallets.refund(from, value)?;
                }
                debug!(%from, %value, error = %err, "Call reverted, attached value refunded");
                Err(err.into())
            }
        }
    }
}
