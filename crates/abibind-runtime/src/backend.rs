//! Chain access abstraction

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use abibind_primitives::H256;

use crate::filter::LogFilter;
use crate::types::{BlockId, CallRequest, Log};
use crate::TransportError;

/// Chain access used by bound contracts (object-safe)
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a read-only call and return the raw result
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, TransportError>;

    /// Submit a transaction and return its hash
    async fn transact(&self, request: CallRequest) -> Result<H256, TransportError>;

    /// Fetch historical logs, ordered by block number then log index
    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, TransportError>;

    /// Open a live subscription for logs matching `filter`
    async fn watch_logs(&self, filter: &LogFilter) -> Result<LogSubscription, TransportError>;
}

/// Handle that tears down an upstream subscription
#[async_trait]
pub trait Subscription: Send {
    /// Release the upstream subscription
    async fn unsubscribe(self: Box<Self>);
}

/// A live log stream plus the handle that ends it.
///
/// The stream yields `Err` once when the upstream fails and ends when the
/// upstream closes. Whoever takes the handle must call
/// [`Subscription::unsubscribe`] exactly once.
pub struct LogSubscription {
    logs: mpsc::Receiver<Result<Log, TransportError>>,
    handle: Box<dyn Subscription>,
}

impl LogSubscription {
    /// Create from a log channel and its teardown handle
    pub fn new(
        logs: mpsc::Receiver<Result<Log, TransportError>>,
        handle: Box<dyn Subscription>,
    ) -> Self {
        Self { logs, handle }
    }

    /// Split into the stream and the teardown handle
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Receiver<Result<Log, TransportError>>,
        Box<dyn Subscription>,
    ) {
        (self.logs, self.handle)
    }
}

impl std::fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSubscription").finish_non_exhaustive()
    }
}
