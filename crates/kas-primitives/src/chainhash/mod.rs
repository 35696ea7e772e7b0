//! Chain hash type for transaction identification and sub-hashes.
//!
//! Provides a `Hash` type: a 32-byte array rendered as hex in natural byte
//! order. Transaction IDs arrive from UTXO sources as 64-character hex
//! strings in exactly this form.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Hex string length of a Hash (64 hex characters).
pub const HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// The all-zero hash, committed in place of sub-hashes a sighash type excludes.
pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

/// A 32-byte hash used for transaction IDs and signature-hash commitments.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from a raw 32-byte array.
    ///
    /// # Arguments
    /// * `bytes` - The 32 hash bytes.
    ///
    /// # Returns
    /// A new `Hash`.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a byte slice.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Hash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(
                format!("invalid hash length of {}, want {}", bytes.len(), HASH_SIZE)
            ));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Hash(arr))
    }

    /// Create a Hash from a 64-character hex string.
    ///
    /// Unlike Bitcoin-style chain hashes, the string is not byte-reversed and
    /// short strings are rejected rather than zero-padded.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string of exactly 64 characters.
    ///
    /// # Returns
    /// `Ok(Hash)` on success, or an error for invalid input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_STRING_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} characters, got {}",
                HASH_STRING_SIZE,
                hex_str.len()
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut arr)?;
        Ok(Hash(arr))
    }

    /// Encode the hash as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Access the internal byte array as a reference.
    ///
    /// # Returns
    /// A reference to the 32-byte internal array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Whether every byte of the hash is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_SIZE]
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    const TXID_HEX: &str = "880eb9819a31821d9d2399e2f35e2433b72637e393d71ecc9b8d0250f49153c3";

    #[test]
    fn test_hash_api() {
        let hash = Hash::from_hex(TXID_HEX).unwrap();
        assert_eq!(hash.as_bytes()[0], 0x88);
        assert_eq!(hash.as_bytes()[31], 0xc3);
        assert_eq!(hash.to_string(), TXID_HEX);

        let from_bytes = Hash::from_bytes(hash.as_bytes()).unwrap();
        assert_eq!(from_bytes, hash);

        // Invalid size for from_bytes.
        let invalid = vec![0u8; HASH_SIZE + 1];
        assert!(Hash::from_bytes(&invalid).is_err());
    }

    #[test]
    fn test_zero_hash() {
        assert!(ZERO_HASH.is_zero());
        assert_eq!(ZERO_HASH, Hash::default());
        assert!(!Hash::new([1u8; 32]).is_zero());
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        // Too short.
        assert!(Hash::from_hex("abcd").is_err());
        // Too long.
        assert!(Hash::from_hex(&format!("{}00", TXID_HEX)).is_err());
        // Invalid hex character.
        assert!(Hash::from_hex(&TXID_HEX.replace('8', "g")).is_err());
        // Empty.
        assert!(Hash::from_hex("").is_err());
    }

    #[test]
    fn test_from_str() {
        let hash: Hash = TXID_HEX.parse().unwrap();
        assert_eq!(hash.to_hex(), TXID_HEX);
    }

    #[test]
    fn test_marshalling() {
        #[derive(Serialize, Deserialize)]
        struct TestData {
            hash: Hash,
        }

        let data = TestData {
            hash: Hash::new(sha256(b"hello")),
        };
        assert_eq!(
            data.hash.to_string(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );

        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"hash":"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"}"#
        );

        let data2: TestData = serde_json::from_str(&json).unwrap();
        assert_eq!(data2.hash, data.hash);
    }
}
