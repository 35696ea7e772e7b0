//! Fixed-size 64-byte signatures for both signing schemes.
//!
//! Schnorr signatures are BIP-340 `r || s`. ECDSA signatures use the compact
//! `r || s` form, always low-S, never DER.

use k256::ecdsa;
use k256::schnorr;

use crate::PrimitivesError;

/// Serialized size of both signature kinds.
pub const SIGNATURE_SIZE: usize = 64;

/// A BIP-340 Schnorr signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchnorrSignature(schnorr::Signature);

impl SchnorrSignature {
    /// Parse a 64-byte signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            )));
        }
        let sig = schnorr::Signature::try_from(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(SchnorrSignature(sig))
    }

    /// Serialize as 64 bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        self.0.to_bytes()
    }

    pub(crate) fn from_k256(sig: schnorr::Signature) -> Self {
        SchnorrSignature(sig)
    }

    pub(crate) fn as_k256(&self) -> &schnorr::Signature {
        &self.0
    }
}

/// An ECDSA signature in 64-byte compact form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EcdsaSignature(ecdsa::Signature);

impl EcdsaSignature {
    /// Parse a 64-byte compact `r || s` signature.
    ///
    /// # Returns
    /// `Ok(EcdsaSignature)`, or an error if the length is wrong or either
    /// scalar is zero or out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_SIZE,
                bytes.len()
            )));
        }
        let sig = ecdsa::Signature::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(EcdsaSignature(sig))
    }

    /// Serialize as 64 bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut out = [0u8; SIGNATURE_SIZE];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Whether `s` is in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        self.0.normalize_s().is_none()
    }

    pub(crate) fn from_k256(sig: ecdsa::Signature) -> Self {
        EcdsaSignature(sig)
    }

    pub(crate) fn as_k256(&self) -> &ecdsa::Signature {
        &self.0
    }
}
