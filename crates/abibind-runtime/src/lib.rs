//! # abibind-runtime
//!
//! Support library for generated contract bindings:
//!
//! - **Backend**: object-safe chain access (`call`, `transact`, logs)
//! - **BoundContract**: ABI + address + backend, used by every generated wrapper
//! - **LogIterator / EventWatch**: lazy historical events and cancellable live events
//! - **tokens**: explicit Rust value <-> [`Token`] conversions
//! - **MockBackend / RpcBackend**: in-memory and JSON-RPC backends
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use abibind_runtime::{tokens, Address, BoundContract, CallOpts, MockBackend, Token};
//!
//! # async fn example() -> Result<(), abibind_runtime::BindError> {
//! let abi = r#"[{"type":"function","name":"owner","stateMutability":"view",
//!     "inputs":[{"name":"node","type":"bytes32"}],
//!     "outputs":[{"name":"","type":"address"}]}]"#;
//! let backend = Arc::new(MockBackend::new());
//! let registry = BoundContract::from_json(Address::ZERO, abi, backend)?;
//!
//! let out = registry
//!     .call(&CallOpts::default(), "owner(bytes32)", vec![tokens::fixed_bytes(&[0u8; 32])])
//!     .await?;
//! let owner = tokens::TokenReader::new("owner(bytes32)", out).read(tokens::into_address)?;
//! # let _ = owner;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod bound;
mod error;
mod event;
mod filter;
mod iterator;
mod mock;
mod rpc;
pub mod tokens;
mod transport;
mod types;
mod watch;

pub use backend::{Backend, LogSubscription, Subscription};
pub use bound::{BoundContract, FunctionDef};
pub use error::{BindError, TransportError};
pub use event::{decode_log, encode_topic, encode_topics, ContractEvent};
pub use filter::LogFilter;
pub use iterator::LogIterator;
pub use mock::MockBackend;
pub use rpc::{RpcBackend, DEFAULT_POLL_INTERVAL};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{deserialize_response, MockTransport, Transport};
pub use types::{
    BlockId, CallOpts, CallRequest, FilterOpts, Log, PendingTransaction, TransactOpts, WatchOpts,
};
pub use watch::EventWatch;

pub use abibind_abi::{DecodeError, EncodeError, ParamType, Token, I256};
pub use abibind_primitives::{Address, BlockNumber, H256, U256};
pub use bytes::Bytes;

/// Re-export of the ABI crate for generated code
pub use abibind_abi as abi;
