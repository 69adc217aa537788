//! # abibind-crypto
//!
//! Hashing used by the ABI codec and the runtime.
//!
//! - Keccak-256 hashing (selectors, event topics, hashed indexed values)
//! - EIP-55 checksum encoding for address display

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod hash;

pub use checksum::to_checksum;
pub use hash::{keccak256, keccak256_concat};
