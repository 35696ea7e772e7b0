//! Unspent outputs supplied by an external UTXO source.
//!
//! Entries are read-only inputs to the builder and the signer. Their JSON
//! form follows the camelCase field names UTXO indexers return.

use kas_script::{Address, ScriptPublicKey};
use serde::{Deserialize, Serialize};

use crate::input::TransactionOutpoint;
use crate::TransactionError;

/// An unspent output together with everything needed to spend it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntry {
    pub outpoint: TransactionOutpoint,

    /// Amount in sompi.
    pub amount: u64,

    /// Locking script of the output. The signature hash commits to it.
    pub script_public_key: ScriptPublicKey,

    /// Address the output pays to, when the source reports one.
    #[serde(default, rename = "address", skip_serializing_if = "Option::is_none")]
    pub owner_address: Option<Address>,

    /// DAA score of the block that accepted the output. Informational.
    #[serde(default)]
    pub block_daa_score: u64,

    /// Whether the output was created by a coinbase transaction. Informational.
    #[serde(default)]
    pub is_coinbase: bool,
}

impl UtxoEntry {
    pub fn new(outpoint: TransactionOutpoint, amount: u64, script_public_key: ScriptPublicKey) -> Self {
        UtxoEntry {
            outpoint,
            amount,
            script_public_key,
            owner_address: None,
            block_daa_score: 0,
            is_coinbase: false,
        }
    }

    /// Attach the owner address reported by the UTXO source.
    pub fn with_address(mut self, address: Address) -> Self {
        self.owner_address = Some(address);
        self
    }
}

/// Parse a JSON array of UTXO entries.
///
/// # Arguments
/// * `json` - A JSON array of entry objects.
///
/// # Returns
/// The parsed entries, or a `SerializationError` describing the first
/// malformed field.
pub fn parse_utxo_entries(json: &str) -> Result<Vec<UtxoEntry>, TransactionError> {
    serde_json::from_str(json).map_err(|e| TransactionError::SerializationError(e.to_string()))
}
