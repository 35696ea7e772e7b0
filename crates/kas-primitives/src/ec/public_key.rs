//! secp256k1 public keys in the two encodings standard scripts embed.
//!
//! `PublicKey` is the 33-byte compressed SEC1 form verified with ECDSA.
//! `XOnlyPublicKey` is the 32-byte BIP-340 form verified with Schnorr.

use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::VerifyingKey;
use k256::schnorr;

use crate::ec::signature::{EcdsaSignature, SchnorrSignature};
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an x-only public key in bytes.
pub const X_ONLY_LEN: usize = 32;

/// A compressed secp256k1 public key used for ECDSA verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from compressed SEC1 bytes.
    ///
    /// # Arguments
    /// * `bytes` - A 33-byte compressed public key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the bytes are not a valid
    /// compressed point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPRESSED_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: COMPRESSED_LEN,
                got: bytes.len(),
            });
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a 66-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the 32-byte X coordinate.
    pub fn to_bytes(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the public key as a lowercase hex string (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify an ECDSA signature over a 32-byte prehash.
    ///
    /// # Arguments
    /// * `msg` - The message hash that was signed.
    /// * `sig` - The ECDSA signature to verify.
    ///
    /// # Returns
    /// `true` if the signature is valid for this hash and key.
    pub fn verify(&self, msg: &[u8; 32], sig: &EcdsaSignature) -> bool {
        self.inner.verify_prehash(msg, sig.as_k256()).is_ok()
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An x-only secp256k1 public key used for BIP-340 Schnorr verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XOnlyPublicKey {
    inner: schnorr::VerifyingKey,
}

impl XOnlyPublicKey {
    /// Create an XOnlyPublicKey from its 32-byte x-coordinate.
    ///
    /// # Returns
    /// `Ok(XOnlyPublicKey)` if the coordinate lifts to a curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != X_ONLY_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: X_ONLY_LEN,
                got: bytes.len(),
            });
        }
        let vk = schnorr::VerifyingKey::from_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(XOnlyPublicKey { inner: vk })
    }

    /// Create an XOnlyPublicKey from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the 32-byte x-coordinate.
    pub fn to_bytes(&self) -> [u8; X_ONLY_LEN] {
        let mut out = [0u8; X_ONLY_LEN];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a BIP-340 signature over a 32-byte message.
    pub fn verify(&self, msg: &[u8; 32], sig: &SchnorrSignature) -> bool {
        self.inner.verify_raw(msg, sig.as_k256()).is_ok()
    }

    pub(crate) fn from_k256_verifying_key(vk: &schnorr::VerifyingKey) -> Self {
        XOnlyPublicKey { inner: *vk }
    }
}

impl fmt::Display for XOnlyPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
