/*!
# Core Types

This module defines the shared type system for the Causeway settlement core,
providing identifiers for chains, accounts and validators, and the coin and
token representations used by the attestation and batching pipelines.

## Core Types

### Chain Identifier
The `ChainId` type provides:
- Unique destination-chain identification by prefix
- String-based representation
- Serialization support
- Ordering capabilities

### Addresses
- `EthAddress` is a validated 20-byte external-chain address
- `AccountId` is an opaque local account identifier
- `ValidatorId` is an opaque validator identity used for vote bookkeeping

### Assets
- `Coin` is a local-denomination amount
- `Erc20Token` is an external token contract paired with an amount
*/

use std::fmt;
use std::str::FromStr;

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::error::StateError;

/// Chain identifier: the unique, immutable prefix of a registered
/// destination chain. Every other entity in the store is namespaced by one.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered destination-chain identity and display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: ChainId,
    pub display_name: String,
}

impl ChainInfo {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: ChainId::new(id),
            display_name: display_name.into(),
        }
    }
}

/// Validated external-chain address (20 bytes, hex encoded with 0x prefix).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Encode, Decode, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    pub const ZERO: EthAddress = EthAddress([0; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed, 40-hex-digit address string.
    pub fn parse(s: &str) -> Result<Self, StateError> {
        let hex_part = s
            .strip_prefix("0x")
            .ok_or_else(|| StateError::InvalidAddress(format!("missing 0x prefix: {s}")))?;
        if hex_part.len() != 40 {
            return Err(StateError::InvalidAddress(format!(
                "expected 40 hex characters, got {}: {s}",
                hex_part.len()
            )));
        }
        let raw = hex::decode(hex_part)
            .map_err(|e| StateError::InvalidAddress(format!("invalid hex in {s}: {e}")))?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 20]
    }
}

impl FromStr for EthAddress {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Opaque local account identifier.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validator identity as tracked in attestation votes.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ValidatorId(String);

impl ValidatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ValidatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local-denomination amount.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// External token contract paired with an amount.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq, Eq)]
pub struct Erc20Token {
    pub contract: EthAddress,
    pub amount: u128,
}

impl Erc20Token {
    pub fn new(contract: EthAddress, amount: u128) -> Self {
        Self { contract, amount }
    }
}
