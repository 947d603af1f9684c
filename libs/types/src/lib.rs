//! Types library for the escrow ledger
//!
//! Shared identifier and amount types used by the ledger contract and
//! its development host.
//!
//! # Modules
//! - `ids`: Account identities
//! - `numeric`: Integer value amounts in the smallest indivisible unit

pub mod ids;
pub mod numeric;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
}
