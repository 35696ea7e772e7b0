//! Kaspa transaction SDK - Cryptographic primitives, hashing, and utilities.
//!
//! This crate provides the foundational building blocks for the SDK:
//! - Domain-separated hashers (keyed BLAKE2b-256, prefixed SHA-256)
//! - The 32-byte `Hash` type used for transaction IDs and sub-hashes
//! - Little-endian field writer/reader shared by hashing and wire encoding
//! - secp256k1 keys with Schnorr (BIP-340) and ECDSA signing

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
