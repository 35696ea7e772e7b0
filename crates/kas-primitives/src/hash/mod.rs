//! Hash function primitives for the SDK.
//!
//! Provides plain SHA-256 and BLAKE2b-256, the domain-separated hashers
//! used for transaction IDs and signature hashes, and the `HashWriter`
//! trait that encodes protocol fields identically into hashers and byte
//! buffers.

use blake2b_simd::{Params, State};
use sha2::{Digest, Sha256};

use crate::chainhash::{Hash, HASH_SIZE};

/// BLAKE2b key used for the Schnorr signature hash.
pub const TRANSACTION_SIGNING_DOMAIN: &[u8] = b"TransactionSigningHash";

/// SHA-256 prefix domain used for the ECDSA signature hash.
pub const TRANSACTION_SIGNING_ECDSA_DOMAIN: &[u8] = b"TransactionSigningHashECDSA";

/// BLAKE2b key used for the full transaction hash.
pub const TRANSACTION_HASH_DOMAIN: &[u8] = b"TransactionHash";

/// BLAKE2b key used for the transaction ID.
pub const TRANSACTION_ID_DOMAIN: &[u8] = b"TransactionID";

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute unkeyed BLAKE2b with a 256-bit output.
///
/// This is the hash applied by `OP_BLAKE2B`, and therefore the one used to
/// derive pay-to-script-hash payloads.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte BLAKE2b-256 digest.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let digest = Params::new().hash_length(HASH_SIZE).hash(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(digest.as_bytes());
    output
}

// ---------------------------------------------------------------------------
// Field writer
// ---------------------------------------------------------------------------

/// Little-endian protocol field writer.
///
/// Implemented by every hasher in this module and by `util::ByteWriter`, so
/// the sighash preimage and the wire encoding share one definition of how
/// each field is laid out.
pub trait HashWriter {
    /// Append raw bytes.
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;

    /// Append a single byte.
    fn write_u8(&mut self, val: u8) -> &mut Self {
        self.update([val])
    }

    /// Append a little-endian u16.
    fn write_u16(&mut self, val: u16) -> &mut Self {
        self.update(val.to_le_bytes())
    }

    /// Append a little-endian u32.
    fn write_u32(&mut self, val: u32) -> &mut Self {
        self.update(val.to_le_bytes())
    }

    /// Append a little-endian u64.
    fn write_u64(&mut self, val: u64) -> &mut Self {
        self.update(val.to_le_bytes())
    }

    /// Append a collection length. Lengths are always encoded as u64.
    fn write_len(&mut self, len: usize) -> &mut Self {
        self.write_u64(len as u64)
    }

    /// Append a length-prefixed byte string.
    fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_len(bytes.len()).update(bytes)
    }
}

// ---------------------------------------------------------------------------
// Domain-separated hashers
// ---------------------------------------------------------------------------

/// Keyed BLAKE2b-256 hasher.
///
/// The domain string is used as the BLAKE2b key, so digests produced under
/// different domains can never collide with each other.
#[derive(Clone)]
pub struct Blake2bHasher {
    state: State,
}

impl Blake2bHasher {
    /// Create a hasher keyed with an arbitrary domain (at most 64 bytes).
    pub fn keyed(domain: &[u8]) -> Self {
        let state = Params::new().hash_length(HASH_SIZE).key(domain).to_state();
        Blake2bHasher { state }
    }

    /// Hasher for the Schnorr transaction signing hash.
    pub fn transaction_signing() -> Self {
        Self::keyed(TRANSACTION_SIGNING_DOMAIN)
    }

    /// Hasher for the full transaction hash.
    pub fn transaction_hash() -> Self {
        Self::keyed(TRANSACTION_HASH_DOMAIN)
    }

    /// Hasher for the transaction ID.
    pub fn transaction_id() -> Self {
        Self::keyed(TRANSACTION_ID_DOMAIN)
    }

    /// Consume the hasher and return the 32-byte digest.
    pub fn finalize(self) -> Hash {
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(self.state.finalize().as_bytes());
        Hash::new(out)
    }
}

impl HashWriter for Blake2bHasher {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.state.update(data.as_ref());
        self
    }
}

/// SHA-256 hasher primed with the SHA-256 of a domain string.
///
/// Prefixing with the domain digest fills exactly one 32-byte half block,
/// which keeps the construction unambiguous for any message.
#[derive(Clone)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create a hasher prefixed with `SHA256(domain)`.
    pub fn with_domain(domain: &[u8]) -> Self {
        let mut inner = Sha256::new();
        Digest::update(&mut inner, sha256(domain));
        Sha256Hasher { inner }
    }

    /// Hasher for the ECDSA transaction signing hash.
    pub fn transaction_signing_ecdsa() -> Self {
        Self::with_domain(TRANSACTION_SIGNING_ECDSA_DOMAIN)
    }

    /// Consume the hasher and return the 32-byte digest.
    pub fn finalize(self) -> Hash {
        Hash::new(self.inner.finalize().into())
    }
}

impl HashWriter for Sha256Hasher {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        Digest::update(&mut self.inner, data.as_ref());
        self
    }
}
