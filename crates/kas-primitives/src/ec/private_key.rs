//! secp256k1 private key with Schnorr and ECDSA signing.
//!
//! Wraps the k256 signing key. The same 32-byte secret produces both the
//! x-only key used by Schnorr outputs and the compressed key used by ECDSA
//! outputs.

use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::SigningKey;
use k256::schnorr;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::ec::public_key::{PublicKey, XOnlyPublicKey};
use crate::ec::signature::{EcdsaSignature, SchnorrSignature};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key.
///
/// The wrapped k256 keys zeroize their scalars on drop; intermediate copies
/// of the secret made here are held in `Zeroizing` buffers.
#[derive(Clone)]
pub struct PrivateKey {
    /// The underlying k256 ECDSA signing key.
    inner: SigningKey,
    /// The same secret as a BIP-340 signing key.
    schnorr: schnorr::SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    ///
    /// # Returns
    /// A new randomly generated `PrivateKey`.
    pub fn new() -> Self {
        let mut secret = Zeroizing::new([0u8; PRIVATE_KEY_BYTES_LEN]);
        loop {
            OsRng.fill_bytes(secret.as_mut());
            // Zero and values >= n are rejected; draw again.
            if let Ok(key) = Self::from_bytes(secret.as_ref()) {
                return key;
            }
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes represent a valid scalar on secp256k1,
    /// or an error if the scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        let schnorr = schnorr::SigningKey::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner, schnorr })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string representing the 32-byte scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the hex or the scalar is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the compressed (33-byte) public key used by ECDSA outputs.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Derive the x-only (32-byte) public key used by Schnorr outputs.
    pub fn x_only_public_key(&self) -> XOnlyPublicKey {
        XOnlyPublicKey::from_k256_verifying_key(self.schnorr.verifying_key())
    }

    /// Produce a BIP-340 Schnorr signature over a 32-byte message with fresh
    /// auxiliary randomness.
    ///
    /// # Arguments
    /// * `msg` - The 32-byte message (a signature hash).
    ///
    /// # Returns
    /// `Ok(SchnorrSignature)` on success, or `SigningFailed`.
    pub fn sign_schnorr(&self, msg: &[u8; 32]) -> Result<SchnorrSignature, PrimitivesError> {
        let mut aux = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(aux.as_mut());
        self.sign_schnorr_with_aux(msg, &aux)
    }

    /// Produce a BIP-340 Schnorr signature with caller-supplied auxiliary
    /// randomness. Deterministic for a fixed `aux`.
    ///
    /// # Arguments
    /// * `msg` - The 32-byte message.
    /// * `aux` - 32 bytes of auxiliary randomness.
    ///
    /// # Returns
    /// `Ok(SchnorrSignature)` on success, or `SigningFailed`.
    pub fn sign_schnorr_with_aux(
        &self,
        msg: &[u8; 32],
        aux: &[u8; 32],
    ) -> Result<SchnorrSignature, PrimitivesError> {
        let sig = self
            .schnorr
            .sign_raw(msg, aux)
            .map_err(|e| PrimitivesError::SigningFailed(e.to_string()))?;
        Ok(SchnorrSignature::from_k256(sig))
    }

    /// Produce a low-S ECDSA signature over a 32-byte prehash using RFC 6979
    /// deterministic nonces.
    ///
    /// # Arguments
    /// * `msg` - The 32-byte message (a signature hash).
    ///
    /// # Returns
    /// `Ok(EcdsaSignature)` on success, or `SigningFailed`.
    pub fn sign_ecdsa(&self, msg: &[u8; 32]) -> Result<EcdsaSignature, PrimitivesError> {
        let sig: k256::ecdsa::Signature = self
            .inner
            .sign_prehash(msg)
            .map_err(|e| PrimitivesError::SigningFailed(e.to_string()))?;
        Ok(EcdsaSignature::from_k256(sig.normalize_s().unwrap_or(sig)))
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Redacts the secret.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().to_hex())
            .finish()
    }
}
