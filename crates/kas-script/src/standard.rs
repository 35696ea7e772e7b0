//! Standard locking scripts and their addresses.
//!
//! Three templates are standard, all at script version 0:
//!
//! | Address type  | Script                                   |
//! |---------------|------------------------------------------|
//! | `PubKey`      | `OP_DATA_32 <x-only key> OP_CHECKSIG`      |
//! | `PubKeyECDSA` | `OP_DATA_33 <compressed key> OP_CHECKSIGECDSA` |
//! | `ScriptHash`  | `OP_BLAKE2B OP_DATA_32 <hash> OP_EQUAL`    |

use kas_primitives::hash::blake2b_256;

use crate::address::{Address, Prefix, Version};
use crate::opcodes::*;
use crate::script_public_key::{ScriptPublicKey, SCRIPT_PUBLIC_KEY_VERSION};
use crate::ScriptError;

/// Classification of a script public key against the standard templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptClass {
    NonStandard,
    PubKey,
    PubKeyECDSA,
    ScriptHash,
}

impl ScriptClass {
    /// Match a script public key against the standard templates.
    pub fn from_script(spk: &ScriptPublicKey) -> Self {
        if spk.version != SCRIPT_PUBLIC_KEY_VERSION {
            return ScriptClass::NonStandard;
        }
        let s = spk.script();
        match s.len() {
            34 if s[0] == OP_DATA_32 && s[33] == OP_CHECKSIG => ScriptClass::PubKey,
            35 if s[0] == OP_DATA_33 && s[34] == OP_CHECKSIGECDSA => ScriptClass::PubKeyECDSA,
            35 if s[0] == OP_BLAKE2B && s[1] == OP_DATA_32 && s[34] == OP_EQUAL => {
                ScriptClass::ScriptHash
            }
            _ => ScriptClass::NonStandard,
        }
    }

    /// The address type this class pays to, if standard.
    pub fn address_version(&self) -> Option<Version> {
        match self {
            ScriptClass::PubKey => Some(Version::PubKey),
            ScriptClass::PubKeyECDSA => Some(Version::PubKeyECDSA),
            ScriptClass::ScriptHash => Some(Version::ScriptHash),
            ScriptClass::NonStandard => None,
        }
    }
}

/// Build the locking script for a key or script hash of the given type.
///
/// # Arguments
/// * `payload` - x-only key, compressed key, or script hash.
/// * `version` - The address type selecting the template.
///
/// # Returns
/// The version-0 script public key, or `InvalidPayloadLength` wrapped in
/// `InvalidAddress` if the payload does not fit the type.
pub fn pubkey_to_script(payload: &[u8], version: Version) -> Result<ScriptPublicKey, ScriptError> {
    if payload.len() != version.payload_len() {
        return Err(crate::AddressError::InvalidPayloadLength {
            version,
            expected: version.payload_len(),
            got: payload.len(),
        }
        .into());
    }
    Ok(standard_script(version, payload))
}

/// Build the locking script paying to an address.
pub fn pay_to_address_script(address: &Address) -> ScriptPublicKey {
    standard_script(address.version(), address.payload())
}

/// Lay out the template for `version`; the payload length is already checked.
fn standard_script(version: Version, payload: &[u8]) -> ScriptPublicKey {
    let mut script = Vec::with_capacity(payload.len() + 3);
    match version {
        Version::PubKey => {
            script.push(OP_DATA_32);
            script.extend_from_slice(payload);
            script.push(OP_CHECKSIG);
        }
        Version::PubKeyECDSA => {
            script.push(OP_DATA_33);
            script.extend_from_slice(payload);
            script.push(OP_CHECKSIGECDSA);
        }
        Version::ScriptHash => {
            script.push(OP_BLAKE2B);
            script.push(OP_DATA_32);
            script.extend_from_slice(payload);
            script.push(OP_EQUAL);
        }
    }
    ScriptPublicKey::from_script_bytes(script)
}

/// Build the pay-to-script-hash locking script for a redeem script.
///
/// The committed hash is the unkeyed BLAKE2b-256 of the redeem script,
/// matching what `OP_BLAKE2B` computes at spend time.
pub fn pay_to_script_hash_script(redeem_script: &[u8]) -> ScriptPublicKey {
    standard_script(Version::ScriptHash, &blake2b_256(redeem_script))
}

/// Recover the address a standard script public key pays to.
///
/// # Arguments
/// * `spk` - The locking script.
/// * `prefix` - Network prefix of the resulting address.
///
/// # Returns
/// The address, `UnsupportedScriptVersion` for non-zero versions, or
/// `NonStandardScript`.
pub fn extract_script_pub_key_address(
    spk: &ScriptPublicKey,
    prefix: Prefix,
) -> Result<Address, ScriptError> {
    if spk.version != SCRIPT_PUBLIC_KEY_VERSION {
        return Err(ScriptError::UnsupportedScriptVersion(spk.version));
    }
    let class = ScriptClass::from_script(spk);
    let s = spk.script();
    let (version, payload) = match class {
        ScriptClass::PubKey => (Version::PubKey, &s[1..33]),
        ScriptClass::PubKeyECDSA => (Version::PubKeyECDSA, &s[1..34]),
        ScriptClass::ScriptHash => (Version::ScriptHash, &s[2..34]),
        ScriptClass::NonStandard => return Err(ScriptError::NonStandardScript),
    };
    Ok(Address::new(prefix, version, payload)?)
}
