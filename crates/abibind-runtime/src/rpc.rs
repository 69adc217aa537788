//! JSON-RPC backed [`Backend`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use abibind_primitives::{Address, H256};

use crate::backend::{Backend, LogSubscription, Subscription};
use crate::filter::LogFilter;
use crate::transport::{deserialize_response, Transport};
use crate::types::{BlockId, CallRequest, Log};
use crate::TransportError;

/// Default interval between `eth_getFilterChanges` polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

const WATCH_BUFFER: usize = 256;

/// Backend speaking Ethereum JSON-RPC over a [`Transport`].
///
/// Live subscriptions poll an installed log filter and uninstall it when
/// released.
pub struct RpcBackend<T> {
    transport: Arc<T>,
    poll_interval: Duration,
}

impl<T: Transport + 'static> RpcBackend<T> {
    /// Create a backend over `transport`
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Change the polling interval used by live subscriptions
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(feature = "http")]
impl RpcBackend<crate::transport::HttpTransport> {
    /// Connect to an HTTP JSON-RPC endpoint
    pub fn http(url: &str) -> Self {
        Self::new(crate::transport::HttpTransport::new(url))
    }
}

#[async_trait]
impl<T: Transport + 'static> Backend for RpcBackend<T> {
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, TransportError> {
        let params = vec![serde_json::to_value(&request)?, serde_json::to_value(block)?];
        let result: String = deserialize_response(self.transport.request_json("eth_call", params).await?)?;
        parse_hex_bytes(&result)
    }

    async fn transact(&self, request: CallRequest) -> Result<H256, TransportError> {
        let params = vec![serde_json::to_value(&request)?];
        let result: String =
            deserialize_response(self.transport.request_json("eth_sendTransaction", params).await?)?;
        H256::from_hex(&result).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, TransportError> {
        let result = self
            .transport
            .request_json("eth_getLogs", vec![filter.to_json()])
            .await?;
        let mut logs = parse_logs(result)?;
        logs.sort_by_key(Log::position);
        Ok(logs)
    }

    async fn watch_logs(&self, filter: &LogFilter) -> Result<LogSubscription, TransportError> {
        let result = self
            .transport
            .request_json("eth_newFilter", vec![filter.to_json()])
            .await?;
        let filter_id: String = deserialize_response(result)?;
        debug!(filter_id = %filter_id, "installed log filter");

        let (sender, receiver) = mpsc::channel(WATCH_BUFFER);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_filter(
            Arc::clone(&self.transport),
            filter_id.clone(),
            self.poll_interval,
            sender,
            cancel.clone(),
        ));

        Ok(LogSubscription::new(
            receiver,
            Box::new(FilterSubscription {
                transport: Arc::clone(&self.transport),
                filter_id,
                cancel,
                task,
            }),
        ))
    }
}

async fn poll_filter<T: Transport>(
    transport: Arc<T>,
    filter_id: String,
    interval: Duration,
    sender: mpsc::Sender<Result<Log, TransportError>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }

        let changes = transport
            .request_json("eth_getFilterChanges", vec![json!(filter_id)])
            .await
            .and_then(parse_logs);
        match changes {
            Ok(logs) => {
                for log in logs {
                    if sender.send(Ok(log)).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!(filter_id = %filter_id, error = %e, "log filter poll failed");
                let _ = sender.send(Err(e)).await;
                return;
            }
        }
    }
}

struct FilterSubscription<T> {
    transport: Arc<T>,
    filter_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

#[async_trait]
impl<T: Transport + 'static> Subscription for FilterSubscription<T> {
    async fn unsubscribe(self: Box<Self>) {
        let FilterSubscription {
            transport,
            filter_id,
            cancel,
            task,
        } = *self;
        cancel.cancel();
        let _ = task.await;
        match transport
            .request_json("eth_uninstallFilter", vec![json!(filter_id)])
            .await
        {
            Ok(_) => debug!(filter_id = %filter_id, "uninstalled log filter"),
            Err(e) => warn!(filter_id = %filter_id, error = %e, "failed to uninstall log filter"),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
    block_number: Option<String>,
    transaction_hash: Option<String>,
    log_index: Option<String>,
    #[serde(default)]
    removed: bool,
}

impl TryFrom<RpcLog> for Log {
    type Error = TransportError;

    fn try_from(raw: RpcLog) -> Result<Self, Self::Error> {
        let invalid = |e: &dyn std::fmt::Display| TransportError::InvalidResponse(e.to_string());
        Ok(Log {
            address: Address::from_hex(&raw.address).map_err(|e| invalid(&e))?,
            topics: raw
                .topics
                .iter()
                .map(|t| H256::from_hex(t).map_err(|e| invalid(&e)))
                .collect::<Result<_, _>>()?,
            data: parse_hex_bytes(&raw.data)?,
            block_number: raw.block_number.as_deref().map(parse_hex_u64).transpose()?,
            transaction_hash: raw
                .transaction_hash
                .as_deref()
                .map(|h| H256::from_hex(h).map_err(|e| invalid(&e)))
                .transpose()?,
            log_index: raw.log_index.as_deref().map(parse_hex_u64).transpose()?,
            removed: raw.removed,
        })
    }
}

fn parse_logs(value: Value) -> Result<Vec<Log>, TransportError> {
    let raw: Vec<RpcLog> = deserialize_response(value)?;
    raw.into_iter().map(Log::try_from).collect()
}

fn parse_hex_u64(s: &str) -> Result<u64, TransportError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| TransportError::InvalidResponse(e.to_string()))
}

fn parse_hex_bytes(s: &str) -> Result<Bytes, TransportError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    Ok(Bytes::from(hex::decode(s)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x10").unwrap(), 16);
        assert_eq!(parse_hex_u64("ff").unwrap(), 255);
        assert!(parse_hex_u64("0xzz").is_err());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("0x0102").unwrap().as_ref(), &[1, 2]);
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
    }

    #[test]
    fn test_parse_logs() {
        let value = json!([{
            "address": "0x00000000000c2e074ec69a0dfb2997ba6c7d2e1e",
            "topics": ["0xce0457fe73731f824cc272376169235128c118b49d344817417c6d108d155e82"],
            "data": "0x",
            "blockNumber": "0x10",
            "transactionHash": null,
            "logIndex": "0x2",
        }]);
        let logs = parse_logs(value).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].position(), (16, 2));
        assert!(logs[0].transaction_hash.is_none());
        assert!(!logs[0].removed);
    }
}
