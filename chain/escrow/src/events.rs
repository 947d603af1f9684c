//! Contract events
//!
//! Events are immutable records emitted by successful ledger calls, one per
//! call, in call order. Observers read them; the ledger never does.

use serde::{Deserialize, Serialize};
use types::ids::AccountId;
use types::numeric::Wei;

/// Value credited to an account's tracked balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub account: AccountId,
    pub amount: Wei,
}

/// An account's full balance released back to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub account: AccountId,
    pub amount: Wei,
}

/// Attached value fanned out to several recipients
///
/// `recipients[i]` received `amounts[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub sender: AccountId,
    pub recipients: Vec<AccountId>,
    pub amounts: Vec<Wei>,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
    Transfer(Transfer),
}

impl ContractEvent {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ContractEvent::Deposit(_) => "Deposit",
            ContractEvent::Withdraw(_) => "Withdraw",
            ContractEvent::Transfer(_) => "Transfer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_serialization() {
        let event = ContractEvent::Deposit(Deposit {
            account: AccountId::new(),
            amount: Wei::new(1_000),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with("{\"Deposit\":"));

        let deser: ContractEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_transfer_serialization() {
        let event = ContractEvent::Transfer(Transfer {
            sender: AccountId::new(),
            recipients: vec![AccountId::new(), AccountId::new()],
            amounts: vec![Wei::new(1), Wei::new(2)],
        });
        let json = serde_json::to_string(&event).unwrap();
        let deser: ContractEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deser);
    }

    #[test]
    fn test_event_labels() {
        let account = AccountId::new();
        let withdraw = ContractEvent::Withdraw(Withdraw {
            account,
            amount: Wei::new(3),
        });
        assert_eq!(withdraw.label(), "Withdraw");
    }
}
