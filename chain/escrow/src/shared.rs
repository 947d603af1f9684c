//! Thread-safe ledger handle
//!
//! When the external release is a call into a payments backend, two threads
//! could otherwise race on the same balance. `SharedLedger` serializes whole
//! calls: the lock is held from the first check until the release returns.
//! Reentrant calls made by the release mechanism use the `&mut Ledger` it is
//! handed and never touch the lock again.
//!
//! The lock is not reentrant. A release mechanism that calls back into a clone
//! of the same `SharedLedger` waits on a lock its own thread holds and never
//! returns.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;
use types::ids::AccountId;
use types::numeric::Wei;

use crate::errors::LedgerError;
use crate::events::ContractEvent;
use crate::ledger::Ledger;
use crate::release::ValueRelease;

#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn deposit(&self, caller: AccountId, amount: Wei) -> Result<ContractEvent, LedgerError> {
        self.lock().deposit(caller, amount)
    }

    /// Withdraw under the lock, held until `release` returns.
    ///
    /// `release` must re-enter only through the `&mut Ledger` it is handed,
    /// never through this handle or a clone of it.
    pub fn withdraw(
        &self,
        caller: AccountId,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        self.lock().withdraw(caller, release)
    }

    /// Transfer under the lock, held until every release has returned.
    ///
    /// Same rule as [`SharedLedger::withdraw`]: `release` re-enters only
    /// through the `&mut Ledger` it is handed.
    pub fn transfer(
        &self,
        caller: AccountId,
        recipients: &[AccountId],
        amounts: &[Wei],
        total_attached: Wei,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        self.lock()
            .transfer(caller, recipients, amounts, total_attached, release)
    }

    pub fn balance_of(&self, account: &AccountId) -> Wei {
        self.lock().balance_of(account)
    }

    pub fn total_held(&self) -> Wei {
        self.lock().total_held()
    }

    pub fn check_invariant(&self) -> bool {
        self.lock().check_invariant()
    }

    pub fn drain_events(&self) -> Vec<ContractEvent> {
        self.lock().drain_events()
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        f(&mut self.lock())
    }

    /// A panic inside a release mechanism poisons the lock mid-call; the
    /// interrupted call is unwound before the ledger is handed out again.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Ledger lock poisoned by a panicking call");
                let mut guard = poisoned.into_inner();
                guard.recover_interrupted();
                self.inner.clear_poison();
                guard
            }
        }
    }
}
