//! Elliptic curve cryptography on secp256k1.
//!
//! Provides private keys, compressed and x-only public keys, and the two
//! signature schemes accepted by standard scripts: BIP-340 Schnorr and
//! ECDSA over a 32-byte prehash.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::{PublicKey, XOnlyPublicKey};
pub use signature::{EcdsaSignature, SchnorrSignature, SIGNATURE_SIZE};
