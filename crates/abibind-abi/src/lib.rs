//! # abibind-abi
//!
//! Contract ABI handling for abibind:
//!
//! - **ContractAbi**: immutable model parsed from ABI JSON
//! - **ParamType**: the Solidity type grammar (`uint256`, `bytes32[]`, tuples, ...)
//! - **Codec**: strict Solidity ABI encoding and decoding of [`Token`]s
//! - **Selectors**: function selectors and event topics
//!
//! # Example
//!
//! ```rust
//! use abibind_abi::{decode, encode, function_selector, ContractAbi, ParamType, Token};
//! use abibind_primitives::U256;
//!
//! let abi = ContractAbi::from_json(
//!     r#"[{"type":"function","name":"ttl","stateMutability":"view",
//!          "inputs":[{"name":"node","type":"bytes32"}],
//!          "outputs":[{"name":"","type":"uint64"}]}]"#,
//! )
//! .unwrap();
//! assert_eq!(abi.functions[0].signature(), "ttl(bytes32)");
//! assert_eq!(function_selector("ttl(bytes32)"), abi.functions[0].selector());
//!
//! let types = [ParamType::Uint(64)];
//! let data = encode(&types, &[Token::Uint(U256::from(3600))]).unwrap();
//! assert_eq!(decode(&types, &data).unwrap(), vec![Token::Uint(U256::from(3600))]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod encode;
mod error;
mod int;
mod json;
mod model;
mod signature;
mod types;

pub use decode::decode;
pub use encode::{encode, encode_function_call};
pub use error::{AbiError, AbiLocation, DecodeError, EncodeError};
pub use int::I256;
pub use model::{Constructor, ContractAbi, CustomError, Event, Function, Param, StateMutability};
pub use signature::{event_topic, function_selector};
pub use types::{parse_type, ParamType, Token};

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;
