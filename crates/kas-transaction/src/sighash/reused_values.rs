//! Per-transaction cache of signature hash sub-hashes.

use kas_primitives::chainhash::Hash;

use super::{
    outputs_hash, payload_hash, previous_outputs_hash, sequences_hash, sig_op_counts_hash,
    SigHashType,
};
use crate::transaction::Transaction;

/// Sub-hashes shared by every input of one transaction.
///
/// Each value is filled the first time a signature hash needs it and read
/// back for later inputs. The cache is only valid for the transaction it
/// was filled from; call `reset` after changing inputs, outputs or payload.
///
/// The cache is `Clone + Send`: to sign inputs on several threads, `populate`
/// it once and hand each thread its own clone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SighashReusedValues {
    pub(crate) previous_outputs_hash: Option<Hash>,
    pub(crate) sequences_hash: Option<Hash>,
    pub(crate) sig_op_counts_hash: Option<Hash>,
    pub(crate) outputs_hash: Option<Hash>,
    pub(crate) payload_hash: Option<Hash>,
}

impl SighashReusedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every cached sub-hash.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fill every sub-hash `hash_type` can reuse for `tx`.
    ///
    /// The per-input output hash of `SIG_HASH_SINGLE` is never cached.
    pub fn populate(&mut self, tx: &Transaction, hash_type: SigHashType) {
        previous_outputs_hash(tx, hash_type, self);
        sequences_hash(tx, hash_type, self);
        sig_op_counts_hash(tx, hash_type, self);
        if hash_type.is_all() {
            outputs_hash(tx, hash_type, self, 0);
        }
        payload_hash(tx, self);
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
