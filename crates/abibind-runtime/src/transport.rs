//! JSON-RPC transports

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::TransportError;

/// JSON-RPC code a node returns for an unsupported method
const METHOD_NOT_FOUND: i64 = -32601;

/// Carries one JSON-RPC request and returns the `result` member
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `method` with positional `params`
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;
}

/// Convert a `result` value into a typed response
pub fn deserialize_response<T: DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    Ok(serde_json::from_value(value)?)
}

#[derive(Default)]
struct Script {
    once: HashMap<String, VecDeque<Result<Value, TransportError>>>,
    always: HashMap<String, Value>,
    log: Vec<(String, Vec<Value>)>,
}

impl Script {
    fn answer(&mut self, method: &str) -> Result<Value, TransportError> {
        if let Some(next) = self.once.get_mut(method).and_then(VecDeque::pop_front) {
            return next;
        }
        self.always.get(method).cloned().ok_or_else(|| TransportError::Rpc {
            code: METHOD_NOT_FOUND,
            message: format!("method {} not scripted", method),
        })
    }
}

/// Scripted transport for exercising [`crate::RpcBackend`] without a node.
///
/// One-shot answers from [`MockTransport::push_response`] win over the
/// standing answer from [`MockTransport::set_response`]. Unscripted methods
/// fail with a method-not-found RPC error.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<Script>,
}

impl MockTransport {
    /// Transport with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Standing answer for `method`
    pub fn set_response(&self, method: &str, response: Value) {
        self.script.lock().always.insert(method.to_owned(), response);
    }

    /// Answer the next `method` request with `response`
    pub fn push_response(&self, method: &str, response: Result<Value, TransportError>) {
        let mut script = self.script.lock();
        script.once.entry(method.to_owned()).or_default().push_back(response);
    }

    /// Every request seen, oldest first
    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.script.lock().log.clone()
    }

    /// How many times `method` was requested
    pub fn count(&self, method: &str) -> usize {
        self.script.lock().log.iter().filter(|(m, _)| m == method).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let mut script = self.script.lock();
        script.log.push((method.to_owned(), params));
        script.answer(method)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use tracing::trace;

    use super::Transport;
    use crate::TransportError;

    /// JSON-RPC over HTTP POST
    pub struct HttpTransport {
        client: reqwest::Client,
        url: String,
        ids: AtomicU64,
    }

    impl HttpTransport {
        /// Transport posting to `url`
        pub fn new(url: &str) -> Self {
            Self {
                client: reqwest::Client::new(),
                url: url.to_owned(),
                ids: AtomicU64::new(1),
            }
        }
    }

    #[derive(Serialize)]
    struct Envelope<'a> {
        jsonrpc: &'static str,
        id: u64,
        method: &'a str,
        params: Vec<Value>,
    }

    #[derive(Deserialize)]
    struct Reply {
        result: Option<Value>,
        error: Option<ReplyError>,
    }

    #[derive(Deserialize)]
    struct ReplyError {
        code: i64,
        message: String,
    }

    fn network(e: reqwest::Error) -> TransportError {
        TransportError::Transport(e.to_string())
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
            let envelope = Envelope {
                jsonrpc: "2.0",
                id: self.ids.fetch_add(1, Ordering::Relaxed),
                method,
                params,
            };
            trace!(method, id = envelope.id, "json-rpc request");

            let reply: Reply = self
                .client
                .post(&self.url)
                .json(&envelope)
                .send()
                .await
                .map_err(network)?
                .json()
                .await
                .map_err(network)?;

            match (reply.result, reply.error) {
                (_, Some(error)) => Err(TransportError::Rpc {
                    code: error.code,
                    message: error.message,
                }),
                (Some(result), None) => Ok(result),
                // `null` results deserialize to `None`
                (None, None) => Ok(Value::Null),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_standing_answer_repeats() {
        let transport = MockTransport::new();
        transport.set_response("eth_blockNumber", json!("0x10"));
        for _ in 0..2 {
            assert_eq!(transport.request_json("eth_blockNumber", vec![]).await.unwrap(), "0x10");
        }
        assert_eq!(transport.count("eth_blockNumber"), 2);
    }

    #[tokio::test]
    async fn test_one_shot_answers_drain_first() {
        let transport = MockTransport::new();
        transport.set_response("eth_getFilterChanges", json!([]));
        transport.push_response(
            "eth_getFilterChanges",
            Err(TransportError::Transport("timeout".into())),
        );

        assert!(transport.request_json("eth_getFilterChanges", vec![]).await.is_err());
        assert_eq!(
            transport.request_json("eth_getFilterChanges", vec![]).await.unwrap(),
            json!([])
        );
    }

    #[tokio::test]
    async fn test_unscripted_method() {
        let transport = MockTransport::new();
        let err = transport.request_json("eth_chainId", vec![json!(1)]).await.unwrap_err();
        assert!(matches!(err, TransportError::Rpc { code: METHOD_NOT_FOUND, .. }));
        assert_eq!(transport.requests(), vec![("eth_chainId".to_string(), vec![json!(1)])]);
    }
}
