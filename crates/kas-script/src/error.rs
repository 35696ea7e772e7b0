use crate::address::Version;

/// Error types for script operations.
///
/// Covers hex decoding, oversized pushes, non-standard scripts, and
/// address failures wrapped from the codec.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// The script does not match any standard locking template.
    #[error("non-standard script public key")]
    NonStandardScript,

    /// The script public key version is not supported.
    #[error("unsupported script public key version {0}")]
    UnsupportedScriptVersion(u16),

    /// Address codec failure.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] kas_primitives::PrimitivesError),
}

/// Typed failures of the address codec.
///
/// Each variant keeps the data needed to explain the failure without
/// parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The human-readable prefix is missing or not a known network.
    #[error("unknown address prefix '{0}'")]
    InvalidPrefix(String),

    /// The prefix is valid but belongs to a different network.
    #[error("address prefix '{got}' does not match expected '{expected}'")]
    PrefixMismatch { expected: String, got: String },

    /// Bad separator, character outside the alphabet, mixed case, or bad padding.
    #[error("malformed address encoding: {0}")]
    MalformedEncoding(String),

    /// The checksum does not match the prefix and payload.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// The version byte is not a known address type.
    #[error("unknown address version {0}")]
    InvalidVersion(u8),

    /// The payload length does not match the address type.
    #[error("invalid payload length for {version} address: expected {expected}, got {got}")]
    InvalidPayloadLength { version: Version, expected: usize, got: usize },
}
