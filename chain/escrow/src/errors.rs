//! Contract-specific error types
//!
//! Every ledger failure aborts the triggering call and leaves no observable
//! state change behind.

use thiserror::Error;
use types::ids::AccountId;
use types::numeric::Wei;

/// Ledger call errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Attached value must be positive")]
    ValueMustBePositive,

    #[error("Caller has no balance to withdraw")]
    ZeroBalance,

    #[error("Attached value {attached} is less than total amounts {required}")]
    ValueLessThanTotalAmounts { attached: Wei, required: Wei },

    #[error("Transfer of {amount} to {recipient} failed: {source}")]
    TransferFailed {
        recipient: AccountId,
        amount: Wei,
        #[source]
        source: ReleaseError,
    },

    #[error("Arithmetic overflow in balance calculation")]
    ArithmeticOverflow,

    #[error("Recipients and amounts differ in length: {recipients} recipients, {amounts} amounts")]
    StructuralMismatch { recipients: usize, amounts: usize },
}

/// Failures reported by the external release mechanism
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReleaseError {
    #[error("Recipient {recipient} rejected incoming value")]
    Rejected { recipient: AccountId },

    #[error("Release mechanism unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

/// Development network host errors
#[derive(Error, Debug)]
pub enum DevnetError {
    #[error("Unknown account: {account}")]
    UnknownAccount { account: AccountId },

    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        required: Wei,
        available: Wei,
    },

    #[error("Native balance overflow")]
    NativeOverflow,

    #[error("Ledger call reverted: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
