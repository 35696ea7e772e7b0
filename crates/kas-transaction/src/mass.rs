//! Transaction mass and minimum fee estimation.
//!
//! Mass is the weight a transaction is charged by: its encoded size, plus a
//! surcharge per byte of output locking script and per signature operation.
//! The minimum relay fee is the mass times a fee rate in sompi per gram.
//! Estimates assume every unsigned input will carry a standard P2PK
//! signature script.

use crate::template::p2pk::SIGNATURE_SCRIPT_LEN;
use crate::transaction::{Transaction, SUBNETWORK_ID_SIZE};

/// Mass charged per byte of encoded transaction.
pub const MASS_PER_TX_BYTE: u64 = 1;

/// Mass charged per byte of output script public key (version + script).
pub const MASS_PER_SCRIPT_PUB_KEY_BYTE: u64 = 10;

/// Mass charged per signature operation.
pub const MASS_PER_SIG_OP: u64 = 1000;

/// Length of the largest standard locking script (ECDSA P2PK and P2SH).
pub const STANDARD_SCRIPT_PUB_KEY_LEN: u64 = 35;

/// Fixed transaction fields: version, two counts, lock time, subnetwork,
/// gas and the payload length prefix.
const BASE_TX_SIZE: u64 = 2 + 8 + 8 + 8 + SUBNETWORK_ID_SIZE as u64 + 8 + 8;

/// One input without its signature script bytes.
const BASE_INPUT_SIZE: u64 = 32 + 4 + 8 + 1 + 8;

/// One output without its script bytes.
const BASE_OUTPUT_SIZE: u64 = 8 + 2 + 8;

/// Estimate the mass of a standard transaction from its shape alone.
///
/// Every input is assumed to be a signed P2PK spend with one signature
/// operation and every output a standard locking script of the largest
/// size, so the estimate never undershoots a standard transaction.
///
/// # Arguments
/// * `input_count` - Number of inputs.
/// * `output_count` - Number of outputs, change included.
/// * `payload_len` - Length of the payload in bytes.
///
/// # Returns
/// The estimated mass in grams.
pub fn estimate_mass(input_count: usize, output_count: usize, payload_len: usize) -> u64 {
    let inputs = input_count as u64;
    let outputs = output_count as u64;

    let size = BASE_TX_SIZE
        + payload_len as u64
        + inputs * (BASE_INPUT_SIZE + SIGNATURE_SCRIPT_LEN as u64)
        + outputs * (BASE_OUTPUT_SIZE + STANDARD_SCRIPT_PUB_KEY_LEN);
    let script_bytes = outputs * (2 + STANDARD_SCRIPT_PUB_KEY_LEN);

    size * MASS_PER_TX_BYTE
        + script_bytes * MASS_PER_SCRIPT_PUB_KEY_BYTE
        + inputs * MASS_PER_SIG_OP
}

/// Compute the mass of a concrete transaction.
///
/// Inputs that are not signed yet are counted as if they carried a
/// standard signature script.
pub fn transaction_mass(tx: &Transaction) -> u64 {
    let unsigned_padding: u64 = tx
        .inputs
        .iter()
        .filter(|input| !input.is_signed())
        .map(|_| SIGNATURE_SCRIPT_LEN as u64)
        .sum();
    let size = tx.size() as u64 + unsigned_padding;

    let script_bytes: u64 = tx
        .outputs
        .iter()
        .map(|o| 2 + o.script_public_key.script().len() as u64)
        .sum();
    let sig_ops: u64 = tx.inputs.iter().map(|i| i.sig_op_count as u64).sum();

    size * MASS_PER_TX_BYTE
        + script_bytes * MASS_PER_SCRIPT_PUB_KEY_BYTE
        + sig_ops * MASS_PER_SIG_OP
}

/// Minimum fee for a transaction of the given mass.
///
/// # Arguments
/// * `mass` - Transaction mass in grams.
/// * `fee_rate` - Sompi charged per gram.
///
/// # Returns
/// The fee in sompi, saturating at `u64::MAX`.
pub fn minimum_fee(mass: u64, fee_rate: u64) -> u64 {
    mass.saturating_mul(fee_rate)
}
