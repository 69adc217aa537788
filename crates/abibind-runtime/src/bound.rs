//! Contract bound to an address and a backend

use std::collections::HashMap;
use std::sync::Arc;

use abibind_abi::{decode, encode_function_call, ContractAbi, ParamType, Token};
use abibind_crypto::to_checksum;
use abibind_primitives::{Address, H256};
use tracing::debug;

use crate::backend::Backend;
use crate::event::ContractEvent;
use crate::filter::LogFilter;
use crate::iterator::LogIterator;
use crate::types::{CallOpts, CallRequest, FilterOpts, PendingTransaction, TransactOpts, WatchOpts};
use crate::watch::EventWatch;
use crate::BindError;

/// Resolved function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function selector (4 bytes)
    pub selector: [u8; 4],
    /// Input parameter types
    pub inputs: Vec<ParamType>,
    /// Output parameter types
    pub outputs: Vec<ParamType>,
}

/// A contract ABI bound to an address and a [`Backend`].
///
/// All generated wrappers delegate here. Cloning is cheap; the parsed ABI and
/// the function table are shared.
#[derive(Clone)]
pub struct BoundContract {
    address: Address,
    abi: Arc<ContractAbi>,
    functions: Arc<HashMap<String, FunctionDef>>,
    backend: Arc<dyn Backend>,
}

impl BoundContract {
    /// Bind a parsed ABI, resolving every function's types up front
    pub fn new(address: Address, abi: Arc<ContractAbi>, backend: Arc<dyn Backend>) -> Result<Self, BindError> {
        let mut functions = HashMap::with_capacity(abi.functions.len());
        for function in &abi.functions {
            functions.insert(
                function.signature(),
                FunctionDef {
                    selector: function.selector(),
                    inputs: function.input_types()?,
                    outputs: function.output_types()?,
                },
            );
        }
        Ok(Self {
            address,
            abi,
            functions: Arc::new(functions),
            backend,
        })
    }

    /// Parse ABI JSON and bind it
    pub fn from_json(address: Address, json: &str, backend: Arc<dyn Backend>) -> Result<Self, BindError> {
        Self::new(address, Arc::new(ContractAbi::from_json(json)?), backend)
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Parsed ABI
    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Backend used for chain access
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Resolved definition of a function by canonical signature
    pub fn function(&self, signature: &str) -> Result<&FunctionDef, BindError> {
        self.functions
            .get(signature)
            .ok_or_else(|| BindError::UnknownFunction(signature.to_string()))
    }

    /// Encode calldata for `signature`
    pub fn encode_call(&self, signature: &str, args: &[Token]) -> Result<Vec<u8>, BindError> {
        let function = self.function(signature)?;
        encode_function_call(function.selector, &function.inputs, args).map_err(|source| {
            BindError::Encoding {
                context: signature.to_string(),
                source,
            }
        })
    }

    /// Execute a read-only call and decode its outputs
    pub async fn call(&self, opts: &CallOpts, signature: &str, args: Vec<Token>) -> Result<Vec<Token>, BindError> {
        let data = self.encode_call(signature, &args)?;
        let outputs = &self.function(signature)?.outputs;
        debug!(contract = %self, function = signature, "call");

        let result = self
            .backend
            .call(CallRequest::call(self.address, data, opts), opts.block)
            .await?;
        decode(outputs, &result).map_err(|source| BindError::Decoding {
            context: signature.to_string(),
            index: 0,
            source,
        })
    }

    /// Submit a state-mutating call
    pub async fn transact(
        &self,
        opts: &TransactOpts,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<PendingTransaction, BindError> {
        let data = self.encode_call(signature, &args)?;
        debug!(contract = %self, function = signature, "transact");
        self.raw_transact(opts, data).await
    }

    /// Submit arbitrary calldata (fallback / receive)
    pub async fn raw_transact(&self, opts: &TransactOpts, calldata: Vec<u8>) -> Result<PendingTransaction, BindError> {
        let hash = self
            .backend
            .transact(CallRequest::transact(self.address, calldata, opts))
            .await?;
        Ok(PendingTransaction::new(hash))
    }

    /// Fetch historical logs of `E` matching the indexed-topic candidates
    pub async fn filter_logs<E: ContractEvent>(
        &self,
        opts: &FilterOpts,
        topics: Vec<Vec<H256>>,
    ) -> Result<LogIterator<E>, BindError> {
        let filter = self
            .log_filter::<E>(topics)
            .with_blocks(opts.from_block, opts.to_block);
        let logs = self.backend.filter_logs(&filter).await?;
        debug!(contract = %self, event = E::NAME, count = logs.len(), "filtered logs");
        Ok(LogIterator::new(logs))
    }

    /// Subscribe to future logs of `E` matching the indexed-topic candidates
    pub async fn watch_logs<E: ContractEvent>(
        &self,
        opts: &WatchOpts,
        topics: Vec<Vec<H256>>,
    ) -> Result<EventWatch<E>, BindError> {
        let filter = self
            .log_filter::<E>(topics)
            .with_blocks(opts.from_block, None);
        let subscription = self.backend.watch_logs(&filter).await?;
        debug!(contract = %self, event = E::NAME, "subscribed to logs");
        Ok(EventWatch::spawn(subscription))
    }

    fn log_filter<E: ContractEvent>(&self, indexed: Vec<Vec<H256>>) -> LogFilter {
        let topics = if E::ANONYMOUS {
            indexed
        } else {
            std::iter::once(vec![E::signature_topic()]).chain(indexed).collect()
        };
        LogFilter::new(self.address).with_topics(topics)
    }
}

/// Displays the EIP-55 checksummed contract address
impl std::fmt::Display for BoundContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_checksum(&self.address))
    }
}

impl std::fmt::Debug for BoundContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &to_checksum(&self.address))
            .field("functions", &self.functions.len())
            .finish_non_exhaustive()
    }
}
