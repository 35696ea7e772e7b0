//! Transaction output with a sompi value and a versioned locking script.

use kas_primitives::hash::HashWriter;
use kas_primitives::util::ByteReader;
use kas_script::{Script, ScriptPublicKey};
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// A single output in a transaction.
///
/// # Wire format
///
/// | Field          | Size                    |
/// |----------------|-------------------------|
/// | value          | 8 bytes (LE)            |
/// | script version | 2 bytes (LE)            |
/// | script         | u64 length (LE) + bytes |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    /// Amount in sompi (1 KAS = 100,000,000 sompi).
    pub value: u64,

    /// Locking script defining the spending conditions.
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        TransactionOutput { value, script_public_key }
    }

    /// Write the output fields. The same layout is hashed into the
    /// signature hash outputs commitment.
    pub(crate) fn write_to<W: HashWriter>(&self, writer: &mut W) {
        writer
            .write_u64(self.value)
            .write_u16(self.script_public_key.version)
            .write_var_bytes(self.script_public_key.script());
    }

    /// Deserialize an output from its wire form.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded output.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)` on success, or a `SerializationError` if the
    /// data is truncated.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64().map_err(|e| {
            TransactionError::SerializationError(format!("reading output value: {}", e))
        })?;

        let version = reader.read_u16().map_err(|e| {
            TransactionError::SerializationError(format!("reading script version: {}", e))
        })?;

        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading script public key: {}", e))
        })?;

        Ok(TransactionOutput {
            value,
            script_public_key: ScriptPublicKey::new(version, Script::from_bytes(script)),
        })
    }
}
