use kas_script::AddressError;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// An address failed to decode or belongs to another network.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// An amount is zero, below dust, above the maximum supply, or overflows.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The selected inputs do not cover the outputs plus the fee.
    #[error("insufficient funds: required {required} sompi, available {available} sompi")]
    InsufficientFunds { required: u64, available: u64 },

    /// An input could not be signed (no key, wrong key, no signature hash).
    #[error("signing error: {0}")]
    SigningError(String),

    /// The transaction or builder is in a state that forbids the operation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Binary, hex or JSON encoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("internal error: {0}")]
    InternalError(String),

    /// An underlying script error (forwarded from `kas-script`).
    #[error("script error: {0}")]
    Script(#[from] kas_script::ScriptError),

    /// An underlying primitives error (forwarded from `kas-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] kas_primitives::PrimitivesError),
}
