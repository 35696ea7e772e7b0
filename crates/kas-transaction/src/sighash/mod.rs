//! Signature hash computation for transaction signing.
//!
//! The digest a Schnorr signature signs is a keyed BLAKE2b-256 over a fixed
//! preimage:
//!
//! 1. version (2 bytes LE)
//! 2. previous outputs hash - all outpoints, zero under ANYONECANPAY
//! 3. sequences hash - all sequences, zero under ANYONECANPAY, NONE or SINGLE
//! 4. sig-op counts hash - all counts, zero under ANYONECANPAY
//! 5. outpoint of the signed input (txid + 4-byte index)
//! 6. spent script public key (2-byte version + length-prefixed script)
//! 7. spent amount (8 bytes LE)
//! 8. sequence (8 bytes LE) and sig-op count (1 byte) of the signed input
//! 9. outputs hash - all outputs, the same-index output under SINGLE, zero under NONE
//! 10. lock time (8 bytes LE), subnetwork ID (20 bytes), gas (8 bytes LE)
//! 11. payload hash - zero only for an empty payload on the native subnetwork;
//!     a native transaction with a payload commits to it (the post-Crescendo
//!     rule, where earlier consensus zeroed it for every native transaction)
//! 12. hash type (1 byte)
//!
//! The ECDSA digest is `SHA256(SHA256("TransactionSigningHashECDSA") || schnorr_digest)`.
//! Signature scripts never enter the preimage.

mod hash_type;
mod reused_values;

pub use hash_type::*;
pub use reused_values::SighashReusedValues;

use kas_primitives::chainhash::{Hash, ZERO_HASH};
use kas_primitives::hash::{Blake2bHasher, HashWriter, Sha256Hasher};

use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;

// -----------------------------------------------------------------------
// Sub-hashes
// -----------------------------------------------------------------------

/// Return the cached value or compute, cache and return it.
fn cached(slot: &mut Option<Hash>, compute: impl FnOnce() -> Hash) -> Hash {
    *slot.get_or_insert_with(compute)
}

fn previous_outputs_hash(tx: &Transaction, hash_type: SigHashType, reused: &mut SighashReusedValues) -> Hash {
    if hash_type.is_any_one_can_pay() {
        return ZERO_HASH;
    }
    cached(&mut reused.previous_outputs_hash, || {
        let mut hasher = Blake2bHasher::transaction_signing();
        for input in &tx.inputs {
            hasher
                .update(input.previous_outpoint.transaction_id)
                .write_u32(input.previous_outpoint.index);
        }
        hasher.finalize()
    })
}

fn sequences_hash(tx: &Transaction, hash_type: SigHashType, reused: &mut SighashReusedValues) -> Hash {
    if hash_type.is_any_one_can_pay() || hash_type.is_none() || hash_type.is_single() {
        return ZERO_HASH;
    }
    cached(&mut reused.sequences_hash, || {
        let mut hasher = Blake2bHasher::transaction_signing();
        for input in &tx.inputs {
            hasher.write_u64(input.sequence);
        }
        hasher.finalize()
    })
}

fn sig_op_counts_hash(tx: &Transaction, hash_type: SigHashType, reused: &mut SighashReusedValues) -> Hash {
    if hash_type.is_any_one_can_pay() {
        return ZERO_HASH;
    }
    cached(&mut reused.sig_op_counts_hash, || {
        let mut hasher = Blake2bHasher::transaction_signing();
        for input in &tx.inputs {
            hasher.write_u8(input.sig_op_count);
        }
        hasher.finalize()
    })
}

/// Under SINGLE the caller has already checked that `input_index` has a
/// matching output.
fn outputs_hash(
    tx: &Transaction,
    hash_type: SigHashType,
    reused: &mut SighashReusedValues,
    input_index: usize,
) -> Hash {
    if hash_type.is_none() {
        return ZERO_HASH;
    }
    if hash_type.is_single() {
        let Some(output) = tx.outputs.get(input_index) else {
            return ZERO_HASH;
        };
        let mut hasher = Blake2bHasher::transaction_signing();
        output.write_to(&mut hasher);
        return hasher.finalize();
    }
    cached(&mut reused.outputs_hash, || {
        let mut hasher = Blake2bHasher::transaction_signing();
        for output in &tx.outputs {
            output.write_to(&mut hasher);
        }
        hasher.finalize()
    })
}

/// Zero only for a native transaction without payload.
fn payload_hash(tx: &Transaction, reused: &mut SighashReusedValues) -> Hash {
    if tx.subnetwork_id.is_native() && tx.payload.is_empty() {
        return ZERO_HASH;
    }
    cached(&mut reused.payload_hash, || {
        let mut hasher = Blake2bHasher::transaction_signing();
        hasher.write_var_bytes(&tx.payload);
        hasher.finalize()
    })
}

// -----------------------------------------------------------------------
// Signature hashes
// -----------------------------------------------------------------------

/// Compute the Schnorr signature hash for one input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `utxo` - The entry spent by that input. Its amount and script public
///   key are committed to.
/// * `hash_type` - Which parts of the transaction to commit to.
/// * `reused` - Sub-hash cache for `tx`.
///
/// # Returns
/// The 32-byte digest, or `None` if the input index is out of range, the
/// spent script is empty, or `hash_type` is SINGLE and there is no output
/// at `input_index`.
pub fn calc_schnorr_signature_hash(
    tx: &Transaction,
    input_index: usize,
    utxo: &UtxoEntry,
    hash_type: SigHashType,
    reused: &mut SighashReusedValues,
) -> Option<Hash> {
    let input = tx.inputs.get(input_index)?;
    if utxo.script_public_key.script().is_empty() {
        return None;
    }
    if hash_type.is_single() && input_index >= tx.outputs.len() {
        return None;
    }

    let mut hasher = Blake2bHasher::transaction_signing();
    hasher
        .write_u16(tx.version)
        .update(previous_outputs_hash(tx, hash_type, reused))
        .update(sequences_hash(tx, hash_type, reused))
        .update(sig_op_counts_hash(tx, hash_type, reused));
    input.previous_outpoint.write_to(&mut hasher);
    hasher
        .write_u16(utxo.script_public_key.version)
        .write_var_bytes(utxo.script_public_key.script())
        .write_u64(utxo.amount)
        .write_u64(input.sequence)
        .write_u8(input.sig_op_count)
        .update(outputs_hash(tx, hash_type, reused, input_index))
        .write_u64(tx.lock_time)
        .update(tx.subnetwork_id)
        .write_u64(tx.gas)
        .update(payload_hash(tx, reused))
        .write_u8(hash_type.to_u8());

    let hash = hasher.finalize();
    tracing::trace!(input_index, hash_type = %hash_type, %hash, "computed signature hash");
    Some(hash)
}

/// Compute the ECDSA signature hash for one input.
///
/// Wraps the Schnorr digest in a domain-prefixed SHA-256. Arguments and
/// `None` cases are those of `calc_schnorr_signature_hash`.
pub fn calc_ecdsa_signature_hash(
    tx: &Transaction,
    input_index: usize,
    utxo: &UtxoEntry,
    hash_type: SigHashType,
    reused: &mut SighashReusedValues,
) -> Option<Hash> {
    let schnorr_hash = calc_schnorr_signature_hash(tx, input_index, utxo, hash_type, reused)?;
    let mut hasher = Sha256Hasher::transaction_signing_ecdsa();
    hasher.update(schnorr_hash);
    Some(hasher.finalize())
}
