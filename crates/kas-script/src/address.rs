//! Kaspa address codec.
//!
//! An address is `<prefix>:<data><checksum>`, where `data` is the version
//! byte followed by the payload, regrouped into 5-bit values and written with
//! the bech32 alphabet, and `checksum` is the 40-bit BCH code over the prefix
//! and data. Any single-character change breaks the checksum.

use std::fmt;
use std::str::FromStr;

use kas_primitives::ec::{PublicKey, XOnlyPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::AddressError;

/// The bech32 alphabet.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Number of 5-bit checksum characters.
const CHECKSUM_LEN: usize = 8;

/// BCH generator coefficients of the 40-bit checksum.
const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

// ---------------------------------------------------------------------------
// Prefix
// ---------------------------------------------------------------------------

/// Network-specific human-readable address prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prefix {
    Mainnet,
    Testnet,
    Simnet,
    Devnet,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Mainnet => "kaspa",
            Prefix::Testnet => "kaspatest",
            Prefix::Simnet => "kaspasim",
            Prefix::Devnet => "kaspadev",
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prefix {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kaspa" => Ok(Prefix::Mainnet),
            "kaspatest" => Ok(Prefix::Testnet),
            "kaspasim" => Ok(Prefix::Simnet),
            "kaspadev" => Ok(Prefix::Devnet),
            _ => Err(AddressError::InvalidPrefix(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Address type, encoded as the first byte of the address data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Version {
    /// Schnorr pay-to-pubkey; payload is a 32-byte x-only key.
    PubKey = 0,
    /// ECDSA pay-to-pubkey; payload is a 33-byte compressed key.
    PubKeyECDSA = 1,
    /// Pay-to-script-hash; payload is the 32-byte BLAKE2b of the redeem script.
    ScriptHash = 8,
}

impl Version {
    /// Required payload length for this address type.
    pub fn payload_len(&self) -> usize {
        match self {
            Version::PubKey => 32,
            Version::PubKeyECDSA => 33,
            Version::ScriptHash => 32,
        }
    }
}

impl TryFrom<u8> for Version {
    type Error = AddressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::PubKey),
            1 => Ok(Version::PubKeyECDSA),
            8 => Ok(Version::ScriptHash),
            v => Err(AddressError::InvalidVersion(v)),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Version::PubKey => "PubKey",
            Version::PubKeyECDSA => "PubKeyECDSA",
            Version::ScriptHash => "ScriptHash",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A decoded address: network prefix, type and fixed-length payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    prefix: Prefix,
    version: Version,
    payload: Vec<u8>,
}

impl Address {
    /// Create an address, checking the payload length against the type.
    ///
    /// # Arguments
    /// * `prefix` - Network prefix.
    /// * `version` - Address type.
    /// * `payload` - Key or script hash bytes.
    ///
    /// # Returns
    /// The address, or `InvalidPayloadLength`.
    pub fn new(prefix: Prefix, version: Version, payload: &[u8]) -> Result<Self, AddressError> {
        if payload.len() != version.payload_len() {
            return Err(AddressError::InvalidPayloadLength {
                version,
                expected: version.payload_len(),
                got: payload.len(),
            });
        }
        Ok(Address { prefix, version, payload: payload.to_vec() })
    }

    /// Schnorr pay-to-pubkey address for an x-only key.
    pub fn from_x_only_public_key(prefix: Prefix, key: &XOnlyPublicKey) -> Self {
        Address { prefix, version: Version::PubKey, payload: key.to_bytes().to_vec() }
    }

    /// ECDSA pay-to-pubkey address for a compressed key.
    pub fn from_ecdsa_public_key(prefix: Prefix, key: &PublicKey) -> Self {
        Address { prefix, version: Version::PubKeyECDSA, payload: key.to_bytes().to_vec() }
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encode to the `prefix:data+checksum` string form.
    pub fn encode(&self) -> String {
        let mut data = Vec::with_capacity(1 + self.payload.len());
        data.push(self.version as u8);
        data.extend_from_slice(&self.payload);
        let five_bit = conv8to5(&data);
        let checksum = checksum(&five_bit, self.prefix.as_str());

        let mut out = String::with_capacity(self.prefix.as_str().len() + 1 + five_bit.len() + CHECKSUM_LEN);
        out.push_str(self.prefix.as_str());
        out.push(':');
        out.extend(five_bit.iter().map(|&v| CHARSET[v as usize] as char));
        out.extend(checksum_to_5bit(checksum).iter().map(|&v| CHARSET[v as usize] as char));
        out
    }

    /// Decode an address string for any known network.
    ///
    /// # Arguments
    /// * `address` - The address string.
    ///
    /// # Returns
    /// The decoded address, or the first check that failed.
    pub fn decode(address: &str) -> Result<Self, AddressError> {
        let has_lower = address.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = address.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper {
            return Err(AddressError::MalformedEncoding("mixed case".to_string()));
        }
        let address = address.to_ascii_lowercase();

        let (prefix_str, data_str) = address
            .split_once(':')
            .ok_or_else(|| AddressError::MalformedEncoding("missing ':' separator".to_string()))?;
        let prefix: Prefix = prefix_str.parse()?;

        if data_str.len() <= CHECKSUM_LEN {
            return Err(AddressError::MalformedEncoding("address data too short".to_string()));
        }
        let values = data_str
            .bytes()
            .map(|c| {
                CHARSET.iter().position(|&x| x == c).map(|p| p as u8).ok_or_else(|| {
                    AddressError::MalformedEncoding(format!("invalid character '{}'", c as char))
                })
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let (five_bit, checksum_part) = values.split_at(values.len() - CHECKSUM_LEN);
        if checksum_to_5bit(checksum(five_bit, prefix.as_str())) != checksum_part {
            return Err(AddressError::ChecksumMismatch);
        }

        let data = conv5to8(five_bit)?;
        let (&version_byte, payload) = data
            .split_first()
            .ok_or_else(|| AddressError::MalformedEncoding("empty address data".to_string()))?;
        let version = Version::try_from(version_byte)?;
        Address::new(prefix, version, payload)
    }

    /// Decode an address and require it to belong to `expected`.
    ///
    /// # Returns
    /// The address, or `PrefixMismatch` if it is valid for another network.
    pub fn decode_with_prefix(address: &str, expected: Prefix) -> Result<Self, AddressError> {
        let decoded = Address::decode(address)?;
        if decoded.prefix != expected {
            return Err(AddressError::PrefixMismatch {
                expected: expected.to_string(),
                got: decoded.prefix.to_string(),
            });
        }
        Ok(decoded)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::decode(s)
    }
}

/// Serialize as the address string.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::decode(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Checksum and bit regrouping
// ---------------------------------------------------------------------------

fn polymod(values: impl Iterator<Item = u8>) -> u64 {
    let mut c = 1u64;
    for d in values {
        let c0 = c >> 35;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, g) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

/// Checksum over the low five bits of each prefix character, a zero
/// separator, the data and eight zero placeholders.
fn checksum(five_bit: &[u8], prefix: &str) -> u64 {
    let values = prefix
        .bytes()
        .map(|c| c & 0x1f)
        .chain(std::iter::once(0))
        .chain(five_bit.iter().copied())
        .chain(std::iter::repeat(0).take(CHECKSUM_LEN));
    polymod(values)
}

fn checksum_to_5bit(checksum: u64) -> [u8; CHECKSUM_LEN] {
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, v) in out.iter_mut().enumerate() {
        *v = ((checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8;
    }
    out
}

/// Regroup bytes into 5-bit values, zero-padding the final group.
fn conv8to5(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((data.len() * 8 + 4) / 5);
    let mut acc = 0u32;
    let mut bits = 0u32;
    for &b in data {
        acc = ((acc << 8) | b as u32) & 0xfff;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

/// Regroup 5-bit values into bytes. Leftover padding must be under five
/// bits and all zero.
fn conv5to8(data: &[u8]) -> Result<Vec<u8>, AddressError> {
    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    let mut acc = 0u32;
    let mut bits = 0u32;
    for &v in data {
        acc = ((acc << 5) | v as u32) & 0xfff;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xff) as u8);
        }
    }
    if bits >= 5 || (acc & ((1 << bits) - 1)) != 0 {
        return Err(AddressError::MalformedEncoding("invalid padding".to_string()));
    }
    Ok(out)
}
