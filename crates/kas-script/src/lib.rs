//! Kaspa transaction SDK - Scripts, standard locking scripts and addresses.
//!
//! Provides the raw `Script` type and the versioned `ScriptPublicKey`, the
//! standard-script opcodes, the bech32-style address codec, and
//! the mapping between addresses and standard locking scripts.

pub mod script;
pub mod script_public_key;
pub mod opcodes;
pub mod address;
pub mod standard;

mod error;
pub use error::{AddressError, ScriptError};
pub use script::Script;
pub use script_public_key::ScriptPublicKey;
pub use address::{Address, Prefix, Version};
pub use standard::{
    extract_script_pub_key_address, pay_to_address_script, pay_to_script_hash_script,
    pubkey_to_script, ScriptClass,
};
