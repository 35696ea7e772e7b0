//! Input and whole-transaction signing, and signature verification.

use kas_primitives::ec::{EcdsaSignature, PrivateKey, PublicKey, SchnorrSignature, XOnlyPublicKey};
use kas_script::opcodes::OP_DATA_65;
use kas_script::{pay_to_address_script, Address, Prefix, Script, ScriptClass, ScriptPublicKey, Version};

use crate::sighash::{
    calc_ecdsa_signature_hash, calc_schnorr_signature_hash, SigHashType, SighashReusedValues,
};
use crate::template::p2pk::{self, SIGNATURE_SCRIPT_LEN};
use crate::template::UnlockingScriptTemplate;
use crate::transaction::{SignableTransaction, Transaction};
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// A private key tagged with the signature scheme it signs under.
///
/// The same secret locks different outputs depending on the scheme:
/// Schnorr keys pay to the x-only key, ECDSA keys to the compressed key.
#[derive(Clone, Debug)]
pub enum SigningKey {
    Schnorr(PrivateKey),
    Ecdsa(PrivateKey),
}

impl SigningKey {
    pub fn private_key(&self) -> &PrivateKey {
        match self {
            SigningKey::Schnorr(key) | SigningKey::Ecdsa(key) => key,
        }
    }

    /// The address type outputs locked to this key carry.
    pub fn address_version(&self) -> Version {
        match self {
            SigningKey::Schnorr(_) => Version::PubKey,
            SigningKey::Ecdsa(_) => Version::PubKeyECDSA,
        }
    }

    /// The public key as it appears in the locking script.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            SigningKey::Schnorr(key) => key.x_only_public_key().to_bytes().to_vec(),
            SigningKey::Ecdsa(key) => key.public_key().to_bytes().to_vec(),
        }
    }

    /// The P2PK locking script paying to this key.
    pub fn script_public_key(&self) -> ScriptPublicKey {
        // The script does not depend on the network prefix.
        pay_to_address_script(&self.address(Prefix::Mainnet))
    }

    /// The address paying to this key on the network of `prefix`.
    pub fn address(&self, prefix: Prefix) -> Address {
        match self {
            SigningKey::Schnorr(key) => Address::from_x_only_public_key(prefix, &key.x_only_public_key()),
            SigningKey::Ecdsa(key) => Address::from_ecdsa_public_key(prefix, &key.public_key()),
        }
    }
}

/// Sign one input.
///
/// The scheme follows the key: `SigningKey::Schnorr` signs the Schnorr
/// signature hash, `SigningKey::Ecdsa` the ECDSA one.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input to sign.
/// * `key` - Key the spent output is locked to.
/// * `utxo` - The entry spent by the input.
/// * `hash_type` - The signature hash type.
/// * `reused` - Sub-hash cache for `tx`.
///
/// # Returns
/// The signature script, or `SigningError` if the key does not match the
/// spent script or no signature hash exists for the input.
pub fn sign_input(
    tx: &Transaction,
    input_index: usize,
    key: &SigningKey,
    utxo: &UtxoEntry,
    hash_type: SigHashType,
    reused: &mut SighashReusedValues,
) -> Result<Script, TransactionError> {
    p2pk::unlock(key, hash_type).sign(tx, input_index, utxo, reused)
}

/// Sign every input of a transaction.
///
/// Inputs are signed in index order with one shared sub-hash cache. The key
/// for each input is the one whose P2PK script matches the spent entry. The
/// first failure aborts signing and is returned; `signable` itself is never
/// modified, so no partially signed transaction escapes.
///
/// # Arguments
/// * `signable` - The unsigned transaction and its spent entries.
/// * `keys` - Candidate keys, in any order.
/// * `hash_type` - The signature hash type used for every input.
///
/// # Returns
/// A copy of `signable` with every signature script filled in.
pub fn sign_transaction(
    signable: &SignableTransaction,
    keys: &[SigningKey],
    hash_type: SigHashType,
) -> Result<SignableTransaction, TransactionError> {
    let tx = &signable.tx;
    if tx.inputs.len() != signable.entries.len() {
        return Err(TransactionError::ValidationError(format!(
            "{} inputs but {} utxo entries",
            tx.inputs.len(),
            signable.entries.len()
        )));
    }

    tracing::debug!(inputs = tx.inputs.len(), hash_type = %hash_type, "signing transaction");

    let locks: Vec<ScriptPublicKey> = keys.iter().map(SigningKey::script_public_key).collect();
    let mut reused = SighashReusedValues::new();
    let mut scripts = Vec::with_capacity(tx.inputs.len());

    for (i, entry) in signable.entries.iter().enumerate() {
        let result = locks
            .iter()
            .position(|lock| *lock == entry.script_public_key)
            .ok_or_else(|| {
                TransactionError::SigningError(format!(
                    "no key for input {} spending {}",
                    i, entry.outpoint
                ))
            })
            .and_then(|k| sign_input(tx, i, &keys[k], entry, hash_type, &mut reused));

        match result {
            Ok(script) => scripts.push(script),
            Err(e) => {
                tracing::warn!(input_index = i, error = %e, "signing aborted");
                return Err(e);
            }
        }
    }

    let mut signed = signable.clone();
    for (input, script) in signed.tx.inputs.iter_mut().zip(scripts) {
        input.signature_script = script;
    }
    tracing::debug!(tx_id = %signed.tx.id(), "transaction signed");
    Ok(signed)
}

/// Verify the signature script of one input against the spent entry.
///
/// Recomputes the signature hash with the hash type carried in the
/// signature script and checks the signature against the key embedded in
/// the spent P2PK script.
///
/// # Returns
/// `Ok(())` for a valid signature, `ValidationError` otherwise.
pub fn verify_input(tx: &Transaction, input_index: usize, utxo: &UtxoEntry) -> Result<(), TransactionError> {
    let invalid = |msg: &str| TransactionError::ValidationError(format!("input {}: {}", input_index, msg));

    let input = tx
        .inputs
        .get(input_index)
        .ok_or_else(|| invalid("index out of range"))?;
    let sig_script = input.signature_script.as_bytes();
    if sig_script.len() != SIGNATURE_SCRIPT_LEN || sig_script[0] != OP_DATA_65 {
        return Err(invalid("not a P2PK signature script"));
    }
    let signature = &sig_script[1..65];
    let hash_type = SigHashType::from_u8(sig_script[65])?;

    let spk = &utxo.script_public_key;
    let script = spk.script();
    let mut reused = SighashReusedValues::new();
    let no_hash = || invalid("no signature hash");

    let valid = match ScriptClass::from_script(spk) {
        ScriptClass::PubKey => {
            let key = XOnlyPublicKey::from_bytes(&script[1..33])?;
            let hash = calc_schnorr_signature_hash(tx, input_index, utxo, hash_type, &mut reused)
                .ok_or_else(no_hash)?;
            key.verify(hash.as_bytes(), &SchnorrSignature::from_bytes(signature)?)
        }
        ScriptClass::PubKeyECDSA => {
            let key = PublicKey::from_bytes(&script[1..34])?;
            let hash = calc_ecdsa_signature_hash(tx, input_index, utxo, hash_type, &mut reused)
                .ok_or_else(no_hash)?;
            key.verify(hash.as_bytes(), &EcdsaSignature::from_bytes(signature)?)
        }
        _ => return Err(invalid("spent script is not pay-to-pubkey")),
    };

    if valid {
        Ok(())
    } else {
        Err(invalid("signature does not verify"))
    }
}

/// Verify every input of a signed transaction.
pub fn verify_transaction(signable: &SignableTransaction) -> Result<(), TransactionError> {
    signable
        .entries
        .iter()
        .enumerate()
        .try_for_each(|(i, entry)| verify_input(&signable.tx, i, entry))
}
