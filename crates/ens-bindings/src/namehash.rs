//! ENS name hashing (EIP-137)

use abibind_crypto::{keccak256, keccak256_concat};
use abibind_runtime::Address;

/// keccak256 of a single label
pub fn labelhash(label: &str) -> [u8; 32] {
    *keccak256(label.as_bytes()).as_bytes()
}

/// Node of a dotted name. The empty name is the root node (all zeros).
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.to_lowercase().rsplit('.') {
        node = *keccak256_concat([node, labelhash(label)]).as_bytes();
    }
    node
}

/// `<hex address>.addr.reverse` node claimed through the reverse registrar
pub fn reverse_node(address: &Address) -> [u8; 32] {
    let hex = hex::encode(address.as_bytes());
    namehash(&format!("{}.addr.reverse", hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex32(s: &str) -> [u8; 32] {
        *abibind_runtime::H256::from_hex(s).unwrap().as_bytes()
    }

    #[test]
    fn test_root() {
        assert_eq!(namehash(""), [0u8; 32]);
    }

    #[test]
    fn test_known_nodes() {
        assert_eq!(
            namehash("eth"),
            hex32("0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            hex32("0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(namehash("Foo.ETH"), namehash("foo.eth"));
    }

    #[test]
    fn test_reverse_node_uses_lowercase_hex() {
        let address = Address::from_bytes([0xAB; 20]);
        assert_eq!(
            reverse_node(&address),
            namehash(&format!("{}.addr.reverse", "ab".repeat(20)))
        );
    }
}
