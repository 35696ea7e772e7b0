//! Kaspa transaction SDK - Transaction building, signing, and serialization.
//!
//! Provides the transaction data model, the canonical wire encoding, the
//! signature hash engine, UTXO-based transaction building with dust and
//! fee handling, and Schnorr/ECDSA input signing.

pub mod builder;
pub mod config;
pub mod input;
pub mod mass;
pub mod output;
pub mod sighash;
pub mod signer;
pub mod template;
pub mod transaction;
pub mod utxo;

mod error;
pub use error::TransactionError;
pub use builder::{build_from_utxos, build_transaction, select_utxos, TransactionBuilder};
pub use config::{BuilderConfig, NetworkType};
pub use input::{TransactionInput, TransactionOutpoint};
pub use output::TransactionOutput;
pub use sighash::{SigHashType, SighashReusedValues};
pub use signer::{sign_input, sign_transaction, verify_input, verify_transaction, SigningKey};
pub use transaction::{SignableTransaction, SubnetworkId, Transaction};
pub use utxo::UtxoEntry;

#[cfg(test)]
mod tests;
