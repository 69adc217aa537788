//! # ens-bindings
//!
//! Typed bindings for the ENS contracts, generated at build time from the
//! ABIs in `abi/`:
//!
//! - **ens_registry**: node ownership, resolvers and TTLs
//! - **base_registrar**: the `.eth` ERC-721 registrar
//! - **eth_registrar_controller**: commit / register / renew with pricing
//! - **dns_registrar**: DNSSEC-proven claims of DNS names
//! - **reverse_registrar**: `addr.reverse` claims and primary names
//! - **public_resolver**: address, text, contenthash and other records
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ens_bindings::{namehash, EnsRegistry};
//! use abibind_runtime::{Address, CallOpts, RpcBackend};
//!
//! # async fn example(registry: Address) -> Result<(), abibind_runtime::BindError> {
//! let backend = Arc::new(RpcBackend::http("http://localhost:8545"));
//! let ens = EnsRegistry::new(registry, backend)?;
//! let owner = ens.caller.owner(&CallOpts::default(), namehash("vitalik.eth")).await?;
//! # let _ = owner;
//! # Ok(())
//! # }
//! ```

mod namehash;

pub use namehash::{labelhash, namehash, reverse_node};

include!(concat!(env!("OUT_DIR"), "/ens_registry.rs"));
include!(concat!(env!("OUT_DIR"), "/base_registrar.rs"));
include!(concat!(env!("OUT_DIR"), "/eth_registrar_controller.rs"));
include!(concat!(env!("OUT_DIR"), "/dns_registrar.rs"));
include!(concat!(env!("OUT_DIR"), "/reverse_registrar.rs"));
include!(concat!(env!("OUT_DIR"), "/public_resolver.rs"));

pub use base_registrar::BaseRegistrarImplementation;
pub use dns_registrar::DnsRegistrar;
pub use ens_registry::EnsRegistry;
pub use eth_registrar_controller::EthRegistrarController;
pub use public_resolver::PublicResolver;
pub use reverse_registrar::ReverseRegistrar;
