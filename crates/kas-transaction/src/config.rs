//! Builder configuration and monetary constants.

use kas_script::{Address, Prefix};
use serde::{Deserialize, Serialize};

use crate::input::DEFAULT_SEQUENCE;
use crate::TransactionError;

/// Sompi in one KAS.
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Maximum supply in sompi. No amount may exceed it.
pub const MAX_SOMPI: u64 = 29_000_000_000 * SOMPI_PER_KASPA;

/// Outputs below this many sompi are never created.
pub const DEFAULT_DUST_THRESHOLD: u64 = 1000;

/// Default fee rate in sompi per gram of mass.
pub const DEFAULT_FEE_RATE: u64 = 1;

/// Network a transaction is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    Mainnet,
    Testnet,
    Simnet,
    Devnet,
}

impl NetworkType {
    /// The address prefix used on this network.
    pub fn prefix(&self) -> Prefix {
        match self {
            NetworkType::Mainnet => Prefix::Mainnet,
            NetworkType::Testnet => Prefix::Testnet,
            NetworkType::Simnet => Prefix::Simnet,
            NetworkType::Devnet => Prefix::Devnet,
        }
    }
}

/// Transaction builder configuration.
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderConfig {
    /// Network whose address prefix recipient and change addresses must carry.
    #[serde(default)]
    pub network: NetworkType,

    /// Smallest output value in sompi. Change below it is folded into the fee.
    #[serde(default = "BuilderConfig::default_dust_threshold")]
    pub dust_threshold: u64,

    /// Sompi per gram of mass used by fee estimation.
    #[serde(default = "BuilderConfig::default_fee_rate")]
    pub fee_rate: u64,

    /// Sequence number given to new inputs.
    #[serde(default = "BuilderConfig::default_sequence")]
    pub default_sequence: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            network: NetworkType::default(),
            dust_threshold: Self::default_dust_threshold(),
            fee_rate: Self::default_fee_rate(),
            default_sequence: Self::default_sequence(),
        }
    }
}

impl BuilderConfig {
    const fn default_dust_threshold() -> u64 {
        DEFAULT_DUST_THRESHOLD
    }

    const fn default_fee_rate() -> u64 {
        DEFAULT_FEE_RATE
    }

    const fn default_sequence() -> u64 {
        DEFAULT_SEQUENCE
    }

    /// Default configuration for `network`.
    pub fn for_network(network: NetworkType) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON document.
    ///
    /// # Returns
    /// The configuration, or a `SerializationError` for malformed JSON or
    /// unknown fields.
    pub fn from_json(json: &str) -> Result<Self, TransactionError> {
        serde_json::from_str(json)
            .map_err(|e| TransactionError::SerializationError(format!("builder config: {}", e)))
    }

    /// Decode an address and require it to belong to the configured network.
    ///
    /// # Returns
    /// The address, or `InvalidAddress` for malformed addresses and
    /// addresses of another network.
    pub fn parse_address(&self, address: &str) -> Result<Address, TransactionError> {
        Ok(Address::decode_with_prefix(address, self.network.prefix())?)
    }

    /// Check an already decoded address against the configured network.
    pub(crate) fn check_address(&self, address: &Address) -> Result<(), TransactionError> {
        let expected = self.network.prefix();
        if address.prefix() != expected {
            return Err(kas_script::AddressError::PrefixMismatch {
                expected: expected.to_string(),
                got: address.prefix().to_string(),
            }
            .into());
        }
        Ok(())
    }
}
