use kas_primitives::PrimitivesError;
use kas_script::{AddressError, ScriptError};
use kas_transaction::TransactionError;

/// Result alias using the unified SDK error.
pub type Result<T> = std::result::Result<T, Error>;

/// Every error the SDK can produce, plus an opaque slot for errors raised by
/// the caller's UTXO source or broadcast client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Hashing, key or encoding failure.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// Script construction or parsing failure.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Address decoding failure.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Building, signing or serializing a transaction failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// An error from the network layer, passed through unchanged.
    #[error("network error: {0}")]
    Network(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error raised outside the SDK, typically by the network client.
    pub fn network<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Network(err.into())
    }

    /// Whether the error reports that the inputs cannot cover the spend.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            Error::Transaction(TransactionError::InsufficientFunds { .. })
        )
    }
}
