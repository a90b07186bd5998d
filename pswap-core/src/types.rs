//! Core newtypes: addresses, hashes, amounts, transaction ids.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PoolError;

/// Token amount in the token's smallest unit.
pub type Amount = u128;

/// A 20-byte EVM-style address, used for both token contracts and accounts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

/// Hash of a claim holder's secret: `owner_hash = keccak256(secret)`.
///
/// Binds a commitment to a holder pseudonymously; revealing the secret
/// authorizes nullification without ever revealing the amount or the
/// commitment set in advance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerHash(pub [u8; 32]);

/// Content-addressed commitment identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitmentId(pub [u8; 32]);

/// Ledger transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId(pub [u8; 32]);

/// Token metadata for display formatting only; never used for accounting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token contract address.
    pub address: Address,
    /// Token symbol (e.g. "WETH", "USDC").
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], PoolError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    if stripped.len() != N * 2 {
        return Err(PoolError::InvalidInput(format!(
            "expected {} hex chars, got {}",
            N * 2,
            stripped.len()
        )));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(stripped, &mut out)
        .map_err(|e| PoolError::InvalidInput(format!("invalid hex: {}", e)))?;
    Ok(out)
}

macro_rules! hex_newtype {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase `0x`-prefixed hex encoding.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = PoolError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed::<$len>(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_newtype!(Address, 20);
hex_newtype!(OwnerHash, 32);
hex_newtype!(CommitmentId, 32);
hex_newtype!(TxId, 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trips_through_hex() {
        let addr: Address = "0x167742649592dEB298Af317b1aEd97D9dADD02a5"
            .parse()
            .expect("should parse");
        assert_eq!(
            addr.to_hex(),
            "0x167742649592deb298af317b1aed97d9dadd02a5"
        );
    }

    #[test]
    fn rejects_wrong_length() {
        let result: Result<Address, _> = "0x1234".parse();
        assert!(matches!(result, Err(PoolError::InvalidInput(_))));
    }

    #[test]
    fn rejects_non_hex() {
        let result: Result<CommitmentId, _> =
            "0xzz00000000000000000000000000000000000000000000000000000000000000".parse();
        assert!(matches!(result, Err(PoolError::InvalidInput(_))));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let id = CommitmentId([0xab; 32]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: CommitmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
