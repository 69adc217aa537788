//! Function selectors and event topics

use abibind_crypto::keccak256;
use abibind_primitives::H256;

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Compute an event topic (keccak256 of the canonical signature)
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}
