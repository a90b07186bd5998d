//! Commitment codec: deterministic hashing of claims and owner secrets.
//!
//! The layout matches Solidity's `abi.encodePacked(uint256, address, bytes32)`
//! so ids computed off-chain agree with the vault contract:
//! a 32-byte big-endian amount word, the 20-byte token address, and the
//! 32-byte owner hash, hashed with Keccak-256.

use sha3::{Digest, Keccak256};

use crate::types::{Address, Amount, CommitmentId, OwnerHash};

/// Compute the commitment id for an `(amount, token, owner_hash)` triple.
///
/// Pure and deterministic: identical inputs always yield the identical id,
/// and any single-bit change yields an unrelated one.
pub fn commit(amount: Amount, token: Address, owner_hash: OwnerHash) -> CommitmentId {
    let mut hasher = Keccak256::new();
    hasher.update(amount_word(amount));
    hasher.update(token.0);
    hasher.update(owner_hash.0);
    CommitmentId(hasher.finalize().into())
}

/// Derive the owner hash from a holder's secret.
pub fn derive_owner_hash(secret: &[u8]) -> OwnerHash {
    let mut hasher = Keccak256::new();
    hasher.update(secret);
    OwnerHash(hasher.finalize().into())
}

/// Encode a u128 amount as a 32-byte big-endian uint256 word.
fn amount_word(amount: Amount) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&amount.to_be_bytes());
    word
}
