//! Transaction input spending a previous output.
//!
//! An input names the output it spends by outpoint and carries the
//! signature script that satisfies that output's locking script. The
//! locking script and amount of the spent output are not part of the input;
//! they travel alongside it as a `UtxoEntry`.

use std::fmt;

use kas_primitives::chainhash::Hash;
use kas_primitives::hash::HashWriter;
use kas_primitives::util::ByteReader;
use kas_script::Script;
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// Sequence number given to inputs unless configured otherwise.
pub const DEFAULT_SEQUENCE: u64 = 0;

/// Signature operations counted for a standard P2PK input.
pub const DEFAULT_SIG_OP_COUNT: u8 = 1;

/// Reference to a specific output of a previous transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    /// ID of the transaction that created the output.
    pub transaction_id: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: Hash, index: u32) -> Self {
        TransactionOutpoint { transaction_id, index }
    }

    pub(crate) fn write_to<W: HashWriter>(&self, writer: &mut W) {
        writer.update(self.transaction_id).write_u32(self.index);
    }

    pub(crate) fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid: [u8; 32] = reader
            .read_array()
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint txid: {}", e)))?;
        let index = reader
            .read_u32()
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint index: {}", e)))?;
        Ok(TransactionOutpoint::new(Hash::new(txid), index))
    }
}

impl fmt::Display for TransactionOutpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}

/// A single input in a transaction.
///
/// # Wire format
///
/// | Field            | Size                      |
/// |------------------|---------------------------|
/// | transaction_id   | 32 bytes                  |
/// | index            | 4 bytes (LE)              |
/// | signature_script | u64 length (LE) + bytes   |
/// | sig_op_count     | 1 byte                    |
/// | sequence         | 8 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// The output being spent.
    pub previous_outpoint: TransactionOutpoint,

    /// The unlocking data. Empty until the input is signed.
    pub signature_script: Script,

    /// Relative lock sequence.
    pub sequence: u64,

    /// Number of signature operations the spend performs.
    pub sig_op_count: u8,
}

impl TransactionInput {
    /// Create an unsigned input spending `previous_outpoint`.
    ///
    /// # Arguments
    /// * `previous_outpoint` - The output being spent.
    /// * `sequence` - Sequence number for the input.
    ///
    /// # Returns
    /// An input with an empty signature script and one signature operation.
    pub fn new(previous_outpoint: TransactionOutpoint, sequence: u64) -> Self {
        TransactionInput {
            previous_outpoint,
            signature_script: Script::new(),
            sequence,
            sig_op_count: DEFAULT_SIG_OP_COUNT,
        }
    }

    /// Whether a signature script has been attached.
    pub fn is_signed(&self) -> bool {
        !self.signature_script.is_empty()
    }

    /// Write the input fields. With `include_signature_script` unset the
    /// signature script is written as an empty byte string and the sig-op
    /// count is omitted, which is the layout the transaction ID commits to.
    pub(crate) fn write_to<W: HashWriter>(&self, writer: &mut W, include_signature_script: bool) {
        self.previous_outpoint.write_to(writer);
        if include_signature_script {
            writer
                .write_var_bytes(self.signature_script.as_bytes())
                .write_u8(self.sig_op_count);
        } else {
            writer.write_var_bytes(&[]);
        }
        writer.write_u64(self.sequence);
    }

    /// Deserialize an input from its wire form.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// `Ok(TransactionInput)` on success, or a `SerializationError` if the
    /// data is truncated.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let previous_outpoint = TransactionOutpoint::read_from(reader)?;

        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading signature script: {}", e))
        })?;

        let sig_op_count = reader.read_u8().map_err(|e| {
            TransactionError::SerializationError(format!("reading sig op count: {}", e))
        })?;

        let sequence = reader.read_u64().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence: {}", e))
        })?;

        Ok(TransactionInput {
            previous_outpoint,
            signature_script: Script::from_bytes(script_bytes),
            sequence,
            sig_op_count,
        })
    }
}
