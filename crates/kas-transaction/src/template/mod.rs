//! Script templates for signing transaction inputs.
//!
//! Provides the `UnlockingScriptTemplate` trait and the pay-to-public-key
//! template used by standard Schnorr and ECDSA outputs.

pub mod p2pk;

use kas_script::Script;

use crate::sighash::SighashReusedValues;
use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Trait for script templates that produce signature scripts.
///
/// `sign` receives the transaction, the index of the input, the entry that
/// input spends and the transaction's sub-hash cache, and returns the
/// signature script for the input.
pub trait UnlockingScriptTemplate {
    /// Produce a signature script for the given input.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed.
    /// * `input_index` - The index of the input to sign.
    /// * `utxo` - The entry spent by the input.
    /// * `reused` - Sub-hash cache shared by all inputs of `tx`.
    ///
    /// # Returns
    /// `Ok(Script)` containing the signature script, or an error on failure.
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        utxo: &UtxoEntry,
        reused: &mut SighashReusedValues,
    ) -> Result<Script, TransactionError>;
}
