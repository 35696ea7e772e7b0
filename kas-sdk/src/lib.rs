#![deny(missing_docs)]

//! Kaspa transaction SDK - Complete SDK.
//!
//! Re-exports all SDK components for convenient single-crate usage, and a
//! unified `Error` that callers can extend with their own network layer's
//! errors.

pub use kas_primitives as primitives;
pub use kas_script as script;
pub use kas_transaction as transaction;

mod error;
pub use error::{Error, Result};
