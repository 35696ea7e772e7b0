//! Signature hash types.

use std::fmt;

use crate::TransactionError;

const SIG_HASH_MASK: u8 = 0b0000_0111;
const SIG_HASH_ANY_ONE_CAN_PAY_FLAG: u8 = 0x80;

/// Selects which parts of a transaction a signature commits to.
///
/// Only the six standard combinations can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SigHashType(u8);

/// Commit to all inputs and all outputs.
pub const SIG_HASH_ALL: SigHashType = SigHashType(0x01);

/// Commit to all inputs and no outputs.
pub const SIG_HASH_NONE: SigHashType = SigHashType(0x02);

/// Commit to all inputs and the output at the signed input's index.
pub const SIG_HASH_SINGLE: SigHashType = SigHashType(0x04);

pub const SIG_HASH_ALL_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0x81);
pub const SIG_HASH_NONE_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0x82);
pub const SIG_HASH_SINGLE_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0x84);

const STANDARD_TYPES: [SigHashType; 6] = [
    SIG_HASH_ALL,
    SIG_HASH_NONE,
    SIG_HASH_SINGLE,
    SIG_HASH_ALL_ANY_ONE_CAN_PAY,
    SIG_HASH_NONE_ANY_ONE_CAN_PAY,
    SIG_HASH_SINGLE_ANY_ONE_CAN_PAY,
];

impl SigHashType {
    /// Parse a hash type byte, accepting only standard combinations.
    ///
    /// # Returns
    /// The hash type, or a `ValidationError` for any other byte.
    pub fn from_u8(val: u8) -> Result<Self, TransactionError> {
        STANDARD_TYPES
            .iter()
            .copied()
            .find(|t| t.0 == val)
            .ok_or_else(|| TransactionError::ValidationError(format!("invalid sighash type 0x{:02x}", val)))
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn is_all(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_ALL.0
    }

    pub fn is_none(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_NONE.0
    }

    pub fn is_single(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_SINGLE.0
    }

    pub fn is_any_one_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANY_ONE_CAN_PAY_FLAG != 0
    }
}

impl Default for SigHashType {
    fn default() -> Self {
        SIG_HASH_ALL
    }
}

impl TryFrom<u8> for SigHashType {
    type Error = TransactionError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        SigHashType::from_u8(val)
    }
}

impl fmt::Display for SigHashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = if self.is_all() {
            "ALL"
        } else if self.is_none() {
            "NONE"
        } else {
            "SINGLE"
        };
        if self.is_any_one_can_pay() {
            write!(f, "{}|ANYONECANPAY", base)
        } else {
            f.write_str(base)
        }
    }
}
