//! In-memory backend for tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use abibind_abi::function_selector;
use abibind_primitives::H256;

use crate::backend::{Backend, LogSubscription, Subscription};
use crate::filter::LogFilter;
use crate::types::{BlockId, CallRequest, Log};
use crate::TransportError;

/// Buffer of each mock subscription channel
const SUBSCRIPTION_BUFFER: usize = 256;

#[derive(Default)]
struct MockState {
    call_responses: HashMap<[u8; 4], Bytes>,
    calls: Vec<(CallRequest, BlockId)>,
    transactions: Vec<CallRequest>,
    logs: Vec<Log>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
    subscribed: usize,
    unsubscribed: usize,
    failure: Option<TransportError>,
}

struct Subscriber {
    id: u64,
    filter: LogFilter,
    sender: mpsc::Sender<Result<Log, TransportError>>,
}

/// Scriptable [`Backend`] holding everything in memory.
///
/// Calls are answered by selector, transactions are recorded and get
/// sequential hashes, stored logs are served in (block, log index) order and
/// live subscriptions receive whatever is passed to [`MockBackend::emit`].
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls to `signature` with `data`
    pub fn set_call_response(&self, signature: &str, data: Vec<u8>) {
        self.state
            .lock()
            .call_responses
            .insert(function_selector(signature), Bytes::from(data));
    }

    /// Fail the next backend operation with `error`
    pub fn fail_next(&self, error: TransportError) {
        self.state.lock().failure = Some(error);
    }

    /// Calls received so far, with the block they targeted
    pub fn calls(&self) -> Vec<(CallRequest, BlockId)> {
        self.state.lock().calls.clone()
    }

    /// Transactions received so far
    pub fn transactions(&self) -> Vec<CallRequest> {
        self.state.lock().transactions.clone()
    }

    /// Store a historical log
    pub fn push_log(&self, log: Log) {
        let mut state = self.state.lock();
        state.logs.push(log);
        state.logs.sort_by_key(Log::position);
    }

    /// Deliver a log to every live subscription whose filter matches it.
    /// Returns the number of subscriptions that received it.
    pub fn emit(&self, log: Log) -> usize {
        let state = self.state.lock();
        state
            .subscribers
            .iter()
            .filter(|s| s.filter.matches(&log))
            .filter(|s| s.sender.try_send(Ok(log.clone())).is_ok())
            .count()
    }

    /// Push an upstream failure into every live subscription
    pub fn emit_error(&self, error: TransportError) {
        let state = self.state.lock();
        for subscriber in &state.subscribers {
            let _ = subscriber.sender.try_send(Err(error.clone()));
        }
    }

    /// Close every live subscription from the upstream side
    pub fn close_subscriptions(&self) {
        let mut state = self.state.lock();
        let closed = std::mem::take(&mut state.subscribers);
        drop(state);
        drop(closed);
    }

    /// Number of subscriptions opened
    pub fn subscribe_count(&self) -> usize {
        self.state.lock().subscribed
    }

    /// Number of subscriptions released
    pub fn unsubscribe_count(&self) -> usize {
        self.state.lock().unsubscribed
    }

    /// Subscriptions still open
    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    fn take_failure(&self) -> Result<(), TransportError> {
        match self.state.lock().failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, TransportError> {
        self.take_failure()?;
        let mut state = self.state.lock();
        let response = request
            .selector()
            .and_then(|selector| state.call_responses.get(&selector).cloned());
        state.calls.push((request, block));
        response.ok_or(TransportError::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        })
    }

    async fn transact(&self, request: CallRequest) -> Result<H256, TransportError> {
        self.take_failure()?;
        let mut state = self.state.lock();
        state.transactions.push(request);
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&(state.transactions.len() as u64).to_be_bytes());
        Ok(H256::from(hash))
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, TransportError> {
        self.take_failure()?;
        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn watch_logs(&self, filter: &LogFilter) -> Result<LogSubscription, TransportError> {
        self.take_failure()?;
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut state = self.state.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        state.subscribed += 1;
        state.subscribers.push(Subscriber {
            id,
            filter: filter.clone(),
            sender,
        });
        debug!(id, "mock subscription opened");
        Ok(LogSubscription::new(
            receiver,
            Box::new(MockSubscription {
                id,
                state: Arc::clone(&self.state),
            }),
        ))
    }
}

struct MockSubscription {
    id: u64,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl Subscription for MockSubscription {
    async fn unsubscribe(self: Box<Self>) {
        let mut state = self.state.lock();
        state.unsubscribed += 1;
        state.subscribers.retain(|s| s.id != self.id);
        debug!(id = self.id, "mock subscription released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abibind_primitives::Address;

    fn log_at(block: u64, index: u64) -> Log {
        Log {
            block_number: Some(block),
            log_index: Some(index),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scripted_call() {
        let backend = MockBackend::new();
        backend.set_call_response("ttl(bytes32)", vec![0u8; 32]);

        let mut data = function_selector("ttl(bytes32)").to_vec();
        data.extend([0u8; 32]);
        let out = backend
            .call(CallRequest::call(Address::ZERO, data, &Default::default()), BlockId::Latest)
            .await
            .unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(backend.calls().len(), 1);

        let unknown = CallRequest::call(Address::ZERO, vec![1, 2, 3, 4], &Default::default());
        assert!(backend.call(unknown, BlockId::Latest).await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let backend = MockBackend::new();
        backend.fail_next(TransportError::Transport("connection refused".into()));
        assert!(backend.transact(CallRequest::default()).await.is_err());
        let hash = backend.transact(CallRequest::default()).await.unwrap();
        assert_eq!(hash.as_bytes()[31], 1);
    }

    #[tokio::test]
    async fn test_logs_are_ordered() {
        let backend = MockBackend::new();
        backend.push_log(log_at(5, 1));
        backend.push_log(log_at(3, 0));
        backend.push_log(log_at(5, 0));
        let logs = backend.filter_logs(&LogFilter::default()).await.unwrap();
        let positions: Vec<_> = logs.iter().map(Log::position).collect();
        assert_eq!(positions, vec![(3, 0), (5, 0), (5, 1)]);
    }

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let backend = MockBackend::new();
        let subscription = backend.watch_logs(&LogFilter::default()).await.unwrap();
        assert_eq!(backend.subscribe_count(), 1);
        assert_eq!(backend.emit(log_at(1, 0)), 1);

        let (mut logs, handle) = subscription.into_parts();
        assert_eq!(logs.recv().await.unwrap().unwrap(), log_at(1, 0));

        handle.unsubscribe().await;
        assert_eq!(backend.unsubscribe_count(), 1);
        assert_eq!(backend.active_subscriptions(), 0);
        assert_eq!(backend.emit(log_at(2, 0)), 0);
    }
}
