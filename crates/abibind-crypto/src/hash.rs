//! Keccak-256 digests

use abibind_primitives::H256;
use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`
pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    H256::from_bytes(Keccak256::digest(data.as_ref()).into())
}

/// Keccak-256 over the concatenation of `parts`, without an intermediate buffer
pub fn keccak256_concat<I, P>(parts: I) -> H256
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    H256::from_bytes(hasher.finalize().into())
}
