//! Escrow Ledger Contract
//!
//! Custodies value on behalf of arbitrary callers: deposits are credited to
//! the caller's tracked balance, an account withdraws its whole balance, and
//! attached value can be fanned out to several recipients in one call.
//!
//! # Modules
//! - `ledger`: Balance table, contract-held total, the three mutating calls
//! - `events`: Events emitted by successful calls
//! - `errors`: Ledger, release, config, and devnet error types
//! - `journal`: Undo log giving every call an explicit transaction boundary
//! - `release`: The external release mechanism seam
//! - `shared`: Thread-safe ledger handle serializing whole calls
//! - `config`: Network and local account configuration
//! - `devnet`: In-process development network hosting one ledger

pub mod config;
pub mod devnet;
pub mod errors;
pub mod events;
pub mod journal;
pub mod ledger;
pub mod release;
pub mod shared;

pub use errors::LedgerError;
pub use events::ContractEvent;
pub use ledger::Ledger;
pub use release::ValueRelease;
pub use shared::SharedLedger;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
