//! # abibind-primitives
//!
//! Fixed-size value types used by the ABI codec, the runtime and the
//! generated bindings.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod fixed;

pub use fixed::{Address, ParseError, H256};
pub use primitive_types::U256;

/// Block height
pub type BlockNumber = u64;
