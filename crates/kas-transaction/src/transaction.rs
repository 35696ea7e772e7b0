//! Core transaction type.
//!
//! Represents a complete transaction with version, inputs, outputs, lock
//! time, subnetwork, gas and payload. Supports binary and hex
//! serialization, transaction ID and hash computation, and pairing with the
//! spent UTXO entries for signing.

use std::fmt;

use kas_primitives::chainhash::Hash;
use kas_primitives::hash::{Blake2bHasher, HashWriter};
use kas_primitives::util::{ByteReader, ByteWriter};

use crate::input::TransactionInput;
use crate::mass;
use crate::output::TransactionOutput;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Current transaction version.
pub const TX_VERSION: u16 = 0;

/// Size of a subnetwork ID in bytes.
pub const SUBNETWORK_ID_SIZE: usize = 20;

/// Smallest encoded input: outpoint, empty script length, sig-op count, sequence.
const MIN_INPUT_SIZE: usize = 32 + 4 + 8 + 1 + 8;

/// Smallest encoded output: value, script version, empty script length.
const MIN_OUTPUT_SIZE: usize = 8 + 2 + 8;

/// Identifier of the subnetwork a transaction belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SubnetworkId([u8; SUBNETWORK_ID_SIZE]);

impl SubnetworkId {
    /// The native subnetwork regular transfers live in.
    pub const NATIVE: SubnetworkId = SubnetworkId([0u8; SUBNETWORK_ID_SIZE]);

    /// The subnetwork of coinbase transactions.
    pub const COINBASE: SubnetworkId = {
        let mut id = [0u8; SUBNETWORK_ID_SIZE];
        id[0] = 1;
        SubnetworkId(id)
    };

    pub const fn new(bytes: [u8; SUBNETWORK_ID_SIZE]) -> Self {
        SubnetworkId(bytes)
    }

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn as_bytes(&self) -> &[u8; SUBNETWORK_ID_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for SubnetworkId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for SubnetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A transaction: ordered inputs and outputs plus the fields every
/// signature commits to.
///
/// # Wire format
///
/// | Field         | Size                      |
/// |---------------|---------------------------|
/// | version       | 2 bytes (LE)              |
/// | input count   | 8 bytes (LE)              |
/// | inputs        | variable (per input)      |
/// | output count  | 8 bytes (LE)              |
/// | outputs       | variable (per output)     |
/// | lock_time     | 8 bytes (LE)              |
/// | subnetwork_id | 20 bytes                  |
/// | gas           | 8 bytes (LE)              |
/// | payload       | u64 length (LE) + bytes   |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,

    /// Lock time. If non-zero, the transaction is not valid before the
    /// given DAA score or Unix time.
    pub lock_time: u64,

    pub subnetwork_id: SubnetworkId,
    pub gas: u64,

    /// Arbitrary data carried by the transaction.
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Create an empty native-subnetwork transaction.
    pub fn new() -> Self {
        Transaction {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            subnetwork_id: SubnetworkId::NATIVE,
            gas: 0,
            payload: Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of the encoded transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `SerializationError` if the hex is
    /// invalid or the bytes do not form a valid transaction.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// The slice must contain exactly one complete transaction; trailing
    /// bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `ByteReader`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)` on success, or a `SerializationError` on truncated
    /// or malformed data.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let ser = |field: &'static str| {
            move |e: kas_primitives::PrimitivesError| {
                TransactionError::SerializationError(format!("reading {}: {}", field, e))
            }
        };

        let version = reader.read_u16().map_err(ser("version"))?;

        let input_count = reader.read_len(MIN_INPUT_SIZE).map_err(ser("input count"))?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_len(MIN_OUTPUT_SIZE).map_err(ser("output count"))?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u64().map_err(ser("lock time"))?;
        let subnetwork_id = SubnetworkId::new(reader.read_array().map_err(ser("subnetwork id"))?);
        let gas = reader.read_u64().map_err(ser("gas"))?;
        let payload = reader.read_var_bytes().map_err(ser("payload"))?.to_vec();

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            subnetwork_id,
            gas,
            payload,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Write every field through `writer`. The hashers and the byte buffer
    /// share this path so the ID, the hash and the wire form cannot drift.
    fn write_to<W: HashWriter>(&self, writer: &mut W, include_signature_scripts: bool) {
        writer.write_u16(self.version).write_len(self.inputs.len());
        for input in &self.inputs {
            input.write_to(writer, include_signature_scripts);
        }
        writer.write_len(self.outputs.len());
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer
            .write_u64(self.lock_time)
            .update(self.subnetwork_id)
            .write_u64(self.gas)
            .write_var_bytes(&self.payload);
    }

    /// Serialize this transaction to its canonical wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer, true);
        writer.into_bytes()
    }

    /// Serialize this transaction to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Size of the wire encoding in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    // -----------------------------------------------------------------
    // Identification
    // -----------------------------------------------------------------

    /// Compute the transaction ID.
    ///
    /// The ID commits to everything except signature scripts and sig-op
    /// counts, so it is fixed before signing and unaffected by it. Coinbase
    /// transactions carry data in their signature scripts and are
    /// identified by the full encoding.
    pub fn id(&self) -> Hash {
        let mut hasher = Blake2bHasher::transaction_id();
        self.write_to(&mut hasher, self.is_coinbase());
        hasher.finalize()
    }

    /// Compute the transaction hash over the full encoding, signatures included.
    pub fn hash(&self) -> Hash {
        let mut hasher = Blake2bHasher::transaction_hash();
        self.write_to(&mut hasher, true);
        hasher.finalize()
    }

    // -----------------------------------------------------------------
    // Inputs & outputs
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of all output values.
    ///
    /// # Returns
    /// The total, or `InvalidAmount` if it overflows `u64`.
    pub fn total_output_value(&self) -> Result<u64, TransactionError> {
        self.outputs.iter().try_fold(0u64, |acc, o| {
            acc.checked_add(o.value)
                .ok_or_else(|| TransactionError::InvalidAmount("output total overflows".to_string()))
        })
    }

    /// Whether this is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.subnetwork_id == SubnetworkId::COINBASE
    }

    /// Whether every input carries a signature script.
    pub fn is_fully_signed(&self) -> bool {
        self.inputs.iter().all(TransactionInput::is_signed)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// SignableTransaction
// ---------------------------------------------------------------------------

/// A transaction paired with the UTXO entry each input spends.
///
/// `entries[i]` is the output spent by `tx.inputs[i]`. The signer reads the
/// amount and locking script of the spent output from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignableTransaction {
    pub tx: Transaction,
    pub entries: Vec<UtxoEntry>,
}

impl SignableTransaction {
    /// Pair a transaction with its spent entries.
    ///
    /// # Returns
    /// `ValidationError` if the counts differ or an entry's outpoint does
    /// not match the input at the same position.
    pub fn new(tx: Transaction, entries: Vec<UtxoEntry>) -> Result<Self, TransactionError> {
        if tx.inputs.len() != entries.len() {
            return Err(TransactionError::ValidationError(format!(
                "{} inputs but {} utxo entries",
                tx.inputs.len(),
                entries.len()
            )));
        }
        for (i, (input, entry)) in tx.inputs.iter().zip(&entries).enumerate() {
            if input.previous_outpoint != entry.outpoint {
                return Err(TransactionError::ValidationError(format!(
                    "input {} spends {} but entry is {}",
                    i, input.previous_outpoint, entry.outpoint
                )));
            }
        }
        Ok(SignableTransaction { tx, entries })
    }

    /// Sum of the spent entry amounts.
    pub fn total_input_value(&self) -> Result<u64, TransactionError> {
        self.entries.iter().try_fold(0u64, |acc, e| {
            acc.checked_add(e.amount)
                .ok_or_else(|| TransactionError::InvalidAmount("input total overflows".to_string()))
        })
    }

    /// The fee: whatever the inputs provide beyond the outputs.
    ///
    /// # Returns
    /// The fee, or `InsufficientFunds` if the outputs exceed the inputs.
    pub fn fee(&self) -> Result<u64, TransactionError> {
        let available = self.total_input_value()?;
        let required = self.tx.total_output_value()?;
        available
            .checked_sub(required)
            .ok_or(TransactionError::InsufficientFunds { required, available })
    }

    /// Mass of the transaction as it will be once every input is signed.
    pub fn mass(&self) -> u64 {
        mass::transaction_mass(&self.tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionOutpoint;
    use kas_script::{Script, ScriptPublicKey};

    fn sample_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new(
            TransactionOutpoint::new(Hash::new([1; 32]), 0),
            0,
        ));
        tx.add_output(TransactionOutput::new(
            1_000_000,
            ScriptPublicKey::from_script_bytes(vec![0x51]),
        ));
        tx
    }

    #[test]
    fn test_empty_transaction_encoding() {
        let tx = Transaction::new();
        let bytes = tx.to_bytes();
        // version + 2 counts + lock time + subnetwork + gas + payload length
        assert_eq!(bytes.len(), 2 + 8 + 8 + 8 + 20 + 8 + 8);
        assert!(bytes.iter().all(|&b| b == 0));
        assert_eq!(Transaction::from_bytes(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample_tx().to_bytes();
        bytes.push(0);
        assert!(matches!(
            Transaction::from_bytes(&bytes),
            Err(TransactionError::SerializationError(msg)) if msg.contains("trailing")
        ));
    }

    #[test]
    fn test_huge_input_count_rejected() {
        let mut bytes = Transaction::new().to_bytes();
        bytes[2..10].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(Transaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_id_ignores_signature_script() {
        let unsigned = sample_tx();
        let mut signed = unsigned.clone();
        signed.inputs[0].signature_script = Script::from_bytes(&[0x41; 66]);

        assert_eq!(unsigned.id(), signed.id());
        assert_ne!(unsigned.hash(), signed.hash());
        assert_ne!(unsigned.id(), unsigned.hash());
    }

    #[test]
    fn test_id_and_hash_known_answers() {
        fn input(txid: Hash) -> TransactionInput {
            let mut input = TransactionInput::new(TransactionOutpoint::new(txid, 2), 7);
            input.signature_script = Script::from_bytes(&[1, 2]);
            input.sig_op_count = 5;
            input
        }
        fn subnetwork(first: u8) -> SubnetworkId {
            let mut id = [0u8; SUBNETWORK_ID_SIZE];
            id[0] = first;
            SubnetworkId::new(id)
        }
        let tx = |version, inputs: &[TransactionInput], with_output: bool, lock_time, subnetwork_id, gas| Transaction {
            version,
            inputs: inputs.to_vec(),
            outputs: if with_output {
                vec![TransactionOutput::new(
                    1564,
                    ScriptPublicKey::new(7, Script::from_bytes(&[1, 2, 3, 4, 5])),
                )]
            } else {
                vec![]
            },
            lock_time,
            subnetwork_id,
            gas,
            payload: vec![],
        };

        let zero = [input(Hash::new([0; 32]))];
        let chained = [input(
            Hash::from_hex("59b3d6dc6cdc660c389c3fdb5704c48c598d279cdf1bab54182db586a4c95dd5").unwrap(),
        )];

        let cases = [
            (
                tx(0, &[], false, 0, subnetwork(0), 0),
                "2c18d5e59ca8fc4c23d9560da3bf738a8f40935c11c162017fbf2c907b7e665c",
                "c9e29784564c269ce2faaffd3487cb4684383018ace11133de082dce4bb88b0b",
            ),
            (
                tx(1, &zero, false, 0, subnetwork(0), 0),
                "dafa415216d26130a899422203559c809d3efe72e20d48505fb2f08787bc4f49",
                "e4045023768d98839c976918f80c9419c6a93003724eda97f7c61a5b68de851b",
            ),
            (
                tx(1, &zero, true, 0, subnetwork(0), 0),
                "d1cd9dc1f26955832ccd12c27afaef4b71443aa7e7487804baf340952ca927e5",
                "e5523c70f6b986cad9f6959e63f080e6ac5f93bc2a9e0e01a89ca9bf6908f51c",
            ),
            (
                tx(2, &zero, true, 54, subnetwork(0), 3),
                "59b3d6dc6cdc660c389c3fdb5704c48c598d279cdf1bab54182db586a4c95dd5",
                "b70f2f14c2f161a29b77b9a78997887a8e727bb57effca38cd246cb270b19cd5",
            ),
            (
                tx(2, &chained, true, 54, subnetwork(0), 3),
                "9d106623860567915b19cea33af486286a31b4bfc68627c6d4d377287afb40ad",
                "cd575e69fbf5f97fbfd4afb414feb56f8463b3948d6ac30f0ecdd9622672fab9",
            ),
            (
                tx(2, &chained, true, 54, SubnetworkId::COINBASE, 3),
                "3fad809b11bd5a4af027aa4ac3fbde97e40624fd40965ba3ee1ee1b57521ad10",
                "b4eb5f0cab5060bf336af5dcfdeb2198cc088b693b35c87309bd3dda04f1cfb9",
            ),
            (
                tx(2, &chained, true, 54, subnetwork(2), 3),
                "c542a204ab9416df910b01540b0c51b85e6d4e1724e081e224ea199a9e54e1b3",
                "31da267d5c34f0740c77b8c9ebde0845a01179ec68074578227b804bac306361",
            ),
        ];

        for (i, (tx, id, hash)) in cases.iter().enumerate() {
            assert_eq!(tx.id().to_string(), *id, "id of case {}", i + 1);
            assert_eq!(tx.hash().to_string(), *hash, "hash of case {}", i + 1);
        }
    }

    #[test]
    fn test_coinbase_id_commits_to_signature_script() {
        let mut tx = sample_tx();
        tx.subnetwork_id = SubnetworkId::COINBASE;
        let mut other = tx.clone();
        other.inputs[0].signature_script = Script::from_bytes(&[0x01]);
        assert_ne!(tx.id(), other.id());
    }

    #[test]
    fn test_id_commits_to_outputs() {
        let tx = sample_tx();
        let mut other = tx.clone();
        other.outputs[0].value += 1;
        assert_ne!(tx.id(), other.id());
    }

    #[test]
    fn test_subnetwork_ids() {
        assert!(SubnetworkId::NATIVE.is_native());
        assert!(!SubnetworkId::COINBASE.is_native());
        assert_eq!(SubnetworkId::COINBASE.to_string(), format!("01{}", "00".repeat(19)));

        let mut tx = sample_tx();
        assert!(!tx.is_coinbase());
        tx.subnetwork_id = SubnetworkId::COINBASE;
        assert!(tx.is_coinbase());
    }

    #[test]
    fn test_signable_rejects_mismatched_entries() {
        let tx = sample_tx();
        let wrong = UtxoEntry::new(
            TransactionOutpoint::new(Hash::new([2; 32]), 0),
            5,
            ScriptPublicKey::default(),
        );
        assert!(matches!(
            SignableTransaction::new(tx.clone(), vec![wrong]),
            Err(TransactionError::ValidationError(_))
        ));
        assert!(matches!(
            SignableTransaction::new(tx, vec![]),
            Err(TransactionError::ValidationError(_))
        ));
    }

    #[test]
    fn test_signable_fee() {
        let tx = sample_tx();
        let entry = UtxoEntry::new(tx.inputs[0].previous_outpoint, 1_002_000, ScriptPublicKey::default());
        let signable = SignableTransaction::new(tx.clone(), vec![entry.clone()]).unwrap();
        assert_eq!(signable.fee().unwrap(), 2_000);

        let short = UtxoEntry { amount: 10, ..entry };
        let signable = SignableTransaction::new(tx, vec![short]).unwrap();
        assert!(matches!(
            signable.fee(),
            Err(TransactionError::InsufficientFunds { required: 1_000_000, available: 10 })
        ));
    }
}
