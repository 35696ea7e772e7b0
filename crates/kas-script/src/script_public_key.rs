//! Versioned locking script.

use serde::{Deserialize, Serialize};

use crate::Script;

/// The only script public key version standard scripts use.
pub const SCRIPT_PUBLIC_KEY_VERSION: u16 = 0;

/// A locking script together with its script-engine version.
///
/// Both fields are committed to by the signature hash of any input spending
/// an output locked with this key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScriptPublicKey {
    pub version: u16,
    pub script: Script,
}

impl ScriptPublicKey {
    pub fn new(version: u16, script: Script) -> Self {
        ScriptPublicKey { version, script }
    }

    /// Build a version-0 script public key from raw script bytes.
    pub fn from_script_bytes(bytes: Vec<u8>) -> Self {
        ScriptPublicKey {
            version: SCRIPT_PUBLIC_KEY_VERSION,
            script: Script::from(bytes),
        }
    }

    pub fn script(&self) -> &[u8] {
        self.script.as_bytes()
    }
}
