//! Ledger — custody of deposited value, withdrawals, and fan-out transfers
//!
//! Implements the escrow balance engine:
//! - Per-account balance table, zero balances treated as absent
//! - Contract-held total equal to the sum of all balances after every call
//! - Checked arithmetic; overflow fails the call instead of wrapping
//! - Checks-effects-interactions ordering around every external release
//! - Journal-backed rollback so a failed call leaves no trace

use std::collections::HashMap;

use tracing::{debug, error, warn};
use types::ids::AccountId;
use types::numeric::Wei;

use crate::errors::LedgerError;
use crate::events::{ContractEvent, Deposit, Transfer, Withdraw};
use crate::journal::{Checkpoint, Journal, JournalEntry};
use crate::release::ValueRelease;

/// Core escrow ledger.
///
/// Every mutating call runs inside a journal frame:
/// 1. Preconditions are checked
/// 2. Internal state is moved to its final value
/// 3. Only then is value released to the outside
///
/// Any error unwinds the frame, reclaiming releases already made.
#[derive(Debug, Default)]
pub struct Ledger {
    /// Balances: account -> amount. Absent means zero.
    balances: HashMap<AccountId, Wei>,
    /// Sum of all balances
    contract_held: Wei,
    /// Attached transfer value kept beyond the forwarded amounts
    retained_surplus: Wei,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
    /// Length of `events` when the outermost open call began
    committed_events: usize,
    /// Undo log for the calls currently in progress
    journal: Journal,
}

impl Ledger {
    /// Create an empty ledger with all balances zero.
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Credit `amount` of attached value to `caller`.
    ///
    /// Emits `Deposit`.
    pub fn deposit(
        &mut self,
        caller: AccountId,
        amount: Wei,
    ) -> Result<ContractEvent, LedgerError> {
        let checkpoint = self.open_frame();
        let result = self.try_deposit(caller, amount);
        self.close_frame(checkpoint, &result, None);

        match &result {
            Ok(_) => debug!(%caller, %amount, "Deposit accepted"),
            Err(err) => warn!(%caller, %amount, error = %err, "Deposit rejected"),
        }
        result
    }

    fn try_deposit(
        &mut self,
        caller: AccountId,
        amount: Wei,
    ) -> Result<ContractEvent, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ValueMustBePositive);
        }

        let balance = self
            .balance_of(&caller)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let held = self
            .contract_held
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.set_balance(caller, balance);
        self.set_contract_held(held);

        Ok(self.emit(ContractEvent::Deposit(Deposit {
            account: caller,
            amount,
        })))
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Release the caller's entire balance back to the caller.
    ///
    /// The balance is zeroed and the contract-held total reduced *before*
    /// `release` runs. A reentrant call made from inside the release
    /// therefore sees a zero balance and fails with `ZeroBalance`. If the
    /// release fails, the zeroing is rolled back and the call reports
    /// `TransferFailed`.
    ///
    /// Emits `Withdraw`.
    pub fn withdraw(
        &mut self,
        caller: AccountId,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        let checkpoint = self.open_frame();
        let result = self.try_withdraw(caller, release);
        self.close_frame(checkpoint, &result, Some(release));

        match &result {
            Ok(event) => debug!(%caller, event = event.label(), "Withdraw completed"),
            Err(err) => warn!(%caller, error = %err, "Withdraw rejected"),
        }
        result
    }

    fn try_withdraw(
        &mut self,
        caller: AccountId,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        // Checks
        let amount = self.balance_of(&caller);
        if amount.is_zero() {
            return Err(LedgerError::ZeroBalance);
        }
        let held = self
            .contract_held
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        // Effects
        self.set_balance(caller, Wei::ZERO);
        self.set_contract_held(held);

        // Interaction
        self.release_to(release, caller, amount)?;

        Ok(self.emit(ContractEvent::Withdraw(Withdraw {
            account: caller,
            amount,
        })))
    }

    // ───────────────────────── Transfer ─────────────────────────

    /// Fan `total_attached` out to `recipients`, `amounts[i]` to `recipients[i]`.
    ///
    /// The balance table is not touched: the attached value passes straight
    /// through. Any attached value beyond the sum of `amounts` is kept by
    /// the contract as retained surplus, not refunded. A failed release
    /// reclaims every earlier release of the same call.
    ///
    /// Emits a single `Transfer`.
    pub fn transfer(
        &mut self,
        caller: AccountId,
        recipients: &[AccountId],
        amounts: &[Wei],
        total_attached: Wei,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        let checkpoint = self.open_frame();
        let result =
            self.try_transfer(caller, recipients, amounts, total_attached, release);
        self.close_frame(checkpoint, &result, Some(release));

        match &result {
            Ok(_) => debug!(
                %caller,
                recipients = recipients.len(),
                attached = %total_attached,
                "Transfer completed"
            ),
            Err(err) => warn!(
                %caller,
                recipients = recipients.len(),
                attached = %total_attached,
                error = %err,
                "Transfer rejected"
            ),
        }
        result
    }

    fn try_transfer(
        &mut self,
        caller: AccountId,
        recipients: &[AccountId],
        amounts: &[Wei],
        total_attached: Wei,
        release: &mut dyn ValueRelease,
    ) -> Result<ContractEvent, LedgerError> {
        if recipients.len() != amounts.len() {
            return Err(LedgerError::StructuralMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        if total_attached.is_zero() {
            return Err(LedgerError::ValueMustBePositive);
        }

        let required = Wei::checked_sum(amounts).ok_or(LedgerError::ArithmeticOverflow)?;
        if total_attached < required {
            return Err(LedgerError::ValueLessThanTotalAmounts {
                attached: total_attached,
                required,
            });
        }

        let surplus = total_attached
            .checked_sub(required)
            .and_then(|remainder| self.retained_surplus.checked_add(remainder))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.set_retained_surplus(surplus);

        for (to, amount) in recipients.iter().zip(amounts) {
            self.release_to(release, *to, *amount)?;
        }

        Ok(self.emit(ContractEvent::Transfer(Transfer {
            sender: caller,
            recipients: recipients.to_vec(),
            amounts: amounts.to_vec(),
        })))
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Tracked balance of `account`, zero if it never held value.
    pub fn balance_of(&self, account: &AccountId) -> Wei {
        self.balances.get(account).copied().unwrap_or(Wei::ZERO)
    }

    /// Total value custodied on behalf of all accounts.
    pub fn total_held(&self) -> Wei {
        self.contract_held
    }

    /// Attached transfer value kept by the contract instead of forwarded.
    pub fn retained_surplus(&self) -> Wei {
        self.retained_surplus
    }

    /// Accounts with a nonzero balance.
    pub fn accounts(&self) -> impl Iterator<Item = (AccountId, Wei)> + '_ {
        self.balances.iter().map(|(account, amount)| (*account, *amount))
    }

    /// `total_held() == Σ balance_of(a)`.
    pub fn check_invariant(&self) -> bool {
        Wei::checked_sum(self.balances.values()) == Some(self.contract_held)
    }

    /// Number of ledger calls currently executing, greater than one while re-entered.
    pub fn call_depth(&self) -> usize {
        self.journal.depth()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all committed events.
    ///
    /// While a call is executing, events of that call are not yet final and
    /// are left out.
    pub fn events(&self) -> &[ContractEvent] {
        if self.journal.depth() > 0 {
            &self.events[..self.committed_events]
        } else {
            &self.events
        }
    }

    /// Drain all events (consume and clear).
    ///
    /// Returns nothing while a call is executing; the events stay in the log
    /// and can be drained once the outermost call has returned.
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        if self.journal.depth() > 0 {
            return Vec::new();
        }
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Recovery ─────────────────────────

    /// Undo every uncommitted effect of calls that never finished.
    ///
    /// Used after a panic unwound out of a release mechanism. Ledger state is
    /// restored; releases made by the interrupted calls cannot be reclaimed
    /// without their mechanism and are reported. Returns how many entries
    /// were undone.
    pub fn recover_interrupted(&mut self) -> usize {
        let undone = self.journal.abandon();
        let count = undone.len();
        for entry in undone {
            if let JournalEntry::Released { to, amount } = entry {
                error!(
                    %to,
                    %amount,
                    "Interrupted call released value that cannot be reclaimed"
                );
            } else {
                self.undo(entry);
            }
        }
        if count > 0 {
            warn!(entries = count, "Recovered ledger from interrupted call");
        }
        count
    }

    // ───────────────────────── Internal ─────────────────────────

    /// Open a journal frame, marking the committed event log at the outermost call.
    fn open_frame(&mut self) -> Checkpoint {
        if self.journal.depth() == 0 {
            self.committed_events = self.events.len();
        }
        self.journal.enter()
    }

    fn set_balance(&mut self, account: AccountId, amount: Wei) {
        let previous = self.balance_of(&account);
        self.journal.record(JournalEntry::Balance { account, previous });
        self.store_balance(account, amount);
    }

    fn store_balance(&mut self, account: AccountId, amount: Wei) {
        if amount.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn set_contract_held(&mut self, amount: Wei) {
        self.journal.record(JournalEntry::ContractHeld {
            previous: self.contract_held,
        });
        self.contract_held = amount;
    }

    fn set_retained_surplus(&mut self, amount: Wei) {
        self.journal.record(JournalEntry::RetainedSurplus {
            previous: self.retained_surplus,
        });
        self.retained_surplus = amount;
    }

    fn emit(&mut self, event: ContractEvent) -> ContractEvent {
        self.journal.record(JournalEntry::EventEmitted {
            index: self.events.len(),
        });
        self.events.push(event.clone());
        event
    }

    /// Hand value out, journaling it once the mechanism accepted it.
    fn release_to(
        &mut self,
        release: &mut dyn ValueRelease,
        to: AccountId,
        amount: Wei,
    ) -> Result<(), LedgerError> {
        release
            .release(self, to, amount)
            .map_err(|source| LedgerError::TransferFailed {
                recipient: to,
                amount,
                source,
            })?;
        self.journal.record(JournalEntry::Released { to, amount });
        Ok(())
    }

    /// Close the frame opened at `checkpoint`, unwinding it when the call failed.
    fn close_frame<T>(
        &mut self,
        checkpoint: Checkpoint,
        result: &Result<T, LedgerError>,
        mut release: Option<&mut dyn ValueRelease>,
    ) {
        if result.is_err() {
            for entry in self.journal.unwind(checkpoint) {
                match entry {
                    JournalEntry::Released { to, amount } => {
                        match release.as_deref_mut() {
                            Some(mechanism) => mechanism.reclaim(to, amount),
                            None => {
                                error!(%to, %amount, "No release mechanism to reclaim from")
                            }
                        }
                    }
                    other => self.undo(other),
                }
            }
        }
        self.journal.leave();
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Balance { account, previous } => {
                self.store_balance(account, previous)
            }
            JournalEntry::ContractHeld { previous } => self.contract_held = previous,
            JournalEntry::RetainedSurplus { previous } => self.retained_surplus = previous,
            JournalEntry::EventEmitted { index } => self.events.truncate(index),
            JournalEntry::Released { .. } => {}
        }
    }
}
