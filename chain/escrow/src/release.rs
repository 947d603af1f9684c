//! External release mechanism
//!
//! Releasing value is the one point where the ledger hands control to code
//! it does not own. The mechanism is given the ledger itself so that
//! recipient-controlled code can call back into it, exactly as a contract's
//! receive hook could.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use types::ids::AccountId;
use types::numeric::Wei;

use crate::errors::ReleaseError;
use crate::ledger::Ledger;

/// Hands custodied value to accounts.
pub trait ValueRelease {
    /// Deliver `amount` to `to`.
    ///
    /// Implementations may re-enter `ledger`; nested calls should pass the
    /// same mechanism along so their releases join the enclosing call's
    /// rollback.
    fn release(
        &mut self,
        ledger: &mut Ledger,
        to: AccountId,
        amount: Wei,
    ) -> Result<(), ReleaseError>;

    /// Take back a previous release because the enclosing call rolled back.
    fn reclaim(&mut self, to: AccountId, amount: Wei);
}

/// In-memory release mechanism that records what each account received.
///
/// Accounts marked as rejecting refuse every incoming release.
#[derive(Debug, Clone, Default)]
pub struct ReleaseLog {
    received: HashMap<AccountId, Wei>,
    rejecting: HashSet<AccountId>,
    total: Wei,
}

impl ReleaseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    pub fn accept(&mut self, account: &AccountId) {
        self.rejecting.remove(account);
    }

    /// Net value released to `account`.
    pub fn received(&self, account: &AccountId) -> Wei {
        self.received.get(account).copied().unwrap_or(Wei::ZERO)
    }

    /// Net value released to all accounts.
    pub fn total(&self) -> Wei {
        self.total
    }
}

impl ValueRelease for ReleaseLog {
    fn release(
        &mut self,
        _ledger: &mut Ledger,
        to: AccountId,
        amount: Wei,
    ) -> Result<(), ReleaseError> {
        if self.rejecting.contains(&to) {
            return Err(ReleaseError::Rejected { recipient: to });
        }

        let overflow = || ReleaseError::Unavailable {
            reason: "release total overflow".to_string(),
        };
        let total = self.total.checked_add(amount).ok_or_else(overflow)?;
        let received = self.received(&to).checked_add(amount).ok_or_else(overflow)?;

        self.total = total;
        self.received.insert(to, received);
        debug!(%to, %amount, "Value released");
        Ok(())
    }

    fn reclaim(&mut self, to: AccountId, amount: Wei) {
        let received = self.received(&to).checked_sub(amount).unwrap_or(Wei::ZERO);
        if received.is_zero() {
            self.received.remove(&to);
        } else {
            self.received.insert(to, received);
        }
        self.total = self.total.checked_sub(amount).unwrap_or(Wei::ZERO);
        debug!(%to, %amount, "Release reclaimed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_records_amounts() {
        let mut ledger = Ledger::new();
        let mut log = ReleaseLog::new();
        let acc = AccountId::new();

        log.release(&mut ledger, acc, Wei::new(3)).unwrap();
        log.release(&mut ledger, acc, Wei::new(4)).unwrap();

        assert_eq!(log.received(&acc), Wei::new(7));
        assert_eq!(log.total(), Wei::new(7));
    }

    #[test]
    fn test_rejecting_account_refuses() {
        let mut ledger = Ledger::new();
        let mut log = ReleaseLog::new();
        let acc = AccountId::new();
        log.reject(acc);

        let result = log.release(&mut ledger, acc, Wei::new(1));
        assert_eq!(result, Err(ReleaseError::Rejected { recipient: acc }));
        assert_eq!(log.total(), Wei::ZERO);

        log.accept(&acc);
        assert!(log.release(&mut ledger, acc, Wei::new(1)).is_ok());
    }

    #[test]
    fn test_reclaim_reverses_release() {
        let mut ledger = Ledger::new();
        let mut log = ReleaseLog::new();
        let acc = AccountId::new();

        log.release(&mut ledger, acc, Wei::new(5)).unwrap();
        log.reclaim(acc, Wei::new(5));

        assert_eq!(log.received(&acc), Wei::ZERO);
        assert_eq!(log.total(), Wei::ZERO);
    }
}
