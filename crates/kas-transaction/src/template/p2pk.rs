//! Pay-to-public-key (P2PK) script template.
//!
//! Standard outputs lock to a public key directly:
//! `OP_DATA_32 <x-only key> OP_CHECKSIG` for Schnorr and
//! `OP_DATA_33 <compressed key> OP_CHECKSIGECDSA` for ECDSA. Both are spent
//! with a single push of the 64-byte signature followed by the hash type
//! byte; the key is already in the locking script.
//!
//! ECDSA signature scripts therefore push no public key, only `sig || hash_type`.

use kas_script::{Script, ScriptClass, ScriptPublicKey};

use crate::sighash::{
    calc_ecdsa_signature_hash, calc_schnorr_signature_hash, SigHashType, SighashReusedValues,
};
use crate::signer::SigningKey;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Length of a P2PK signature script: `OP_DATA_65`, signature, hash type.
///
/// Mass estimation pads unsigned inputs by this length.
pub const SIGNATURE_SCRIPT_LEN: usize = 1 + 64 + 1;

/// Create the P2PK locking script for a signing key.
pub fn lock(key: &SigningKey) -> ScriptPublicKey {
    key.script_public_key()
}

/// Create a P2PK unlocker for signing transaction inputs.
///
/// # Arguments
/// * `key` - The key to sign with. Its scheme selects the signature hash.
/// * `hash_type` - The signature hash type to commit with.
pub fn unlock(key: &SigningKey, hash_type: SigHashType) -> P2PK<'_> {
    P2PK { key, hash_type }
}

/// P2PK signing template holding a key and a hash type.
pub struct P2PK<'a> {
    key: &'a SigningKey,
    hash_type: SigHashType,
}

impl P2PK<'_> {
    /// Check that the key is the one `utxo` locks to.
    fn check_spent_script(&self, input_index: usize, utxo: &UtxoEntry) -> Result<(), TransactionError> {
        let class = ScriptClass::from_script(&utxo.script_public_key);
        let Some(version) = class.address_version().filter(|_| class != ScriptClass::ScriptHash) else {
            return Err(TransactionError::SigningError(format!(
                "input {} spends a {:?} script, not pay-to-pubkey",
                input_index, class
            )));
        };
        if version != self.key.address_version() {
            return Err(TransactionError::SigningError(format!(
                "input {} is locked to a {} key but the signing key is {}",
                input_index,
                version,
                self.key.address_version()
            )));
        }
        if utxo.script_public_key != self.key.script_public_key() {
            return Err(TransactionError::SigningError(format!(
                "input {} is locked to a different public key",
                input_index
            )));
        }
        Ok(())
    }
}

impl UnlockingScriptTemplate for P2PK<'_> {
    /// Sign the specified input and produce its signature script.
    ///
    /// Computes the signature hash matching the key's scheme, signs it, and
    /// returns `OP_DATA_65 <signature || hash_type>`.
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        utxo: &UtxoEntry,
        reused: &mut SighashReusedValues,
    ) -> Result<Script, TransactionError> {
        let input = tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            ))
        })?;
        if input.previous_outpoint != utxo.outpoint {
            return Err(TransactionError::SigningError(format!(
                "input {} spends {} but the entry is {}",
                input_index, input.previous_outpoint, utxo.outpoint
            )));
        }
        self.check_spent_script(input_index, utxo)?;

        let no_hash = || {
            TransactionError::SigningError(format!(
                "no {} signature hash for input {}",
                self.hash_type, input_index
            ))
        };
        let signature = match self.key {
            SigningKey::Schnorr(key) => {
                let hash = calc_schnorr_signature_hash(tx, input_index, utxo, self.hash_type, reused)
                    .ok_or_else(no_hash)?;
                key.sign_schnorr(hash.as_bytes())?.to_bytes()
            }
            SigningKey::Ecdsa(key) => {
                let hash = calc_ecdsa_signature_hash(tx, input_index, utxo, self.hash_type, reused)
                    .ok_or_else(no_hash)?;
                key.sign_ecdsa(hash.as_bytes())?.to_bytes()
            }
        };

        let mut sig_buf = Vec::with_capacity(signature.len() + 1);
        sig_buf.extend_from_slice(&signature);
        sig_buf.push(self.hash_type.to_u8());

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        Ok(script)
    }
}
