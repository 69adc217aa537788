//! Cancellable live event delivery

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::{LogSubscription, Subscription};
use crate::event::ContractEvent;
use crate::types::Log;
use crate::{BindError, TransportError};

/// Capacity of the decoded-event channel between the task and the consumer
const EVENT_BUFFER: usize = 64;

/// A live subscription that decodes logs into `E` on a spawned task.
///
/// The task ends when the watch is cancelled, the upstream closes or errors,
/// or a log fails to decode. Any of the last three is delivered once as the
/// final item; an upstream close surfaces as
/// [`TransportError::SubscriptionClosed`]. On every exit path the upstream
/// subscription is released exactly once. Dropping the watch cancels it.
pub struct EventWatch<E> {
    events: mpsc::Receiver<Result<E, BindError>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<E: ContractEvent> EventWatch<E> {
    /// Start delivering events from `subscription`
    pub fn spawn(subscription: LogSubscription) -> Self {
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();
        let (logs, handle) = subscription.into_parts();
        let task = tokio::spawn(deliver::<E>(logs, handle, tx, cancel.clone()));
        debug!(event = E::NAME, "watch started");
        Self {
            events,
            cancel,
            task: Some(task),
        }
    }

    /// Next decoded event; `None` once the watch is cancelled or finished
    pub async fn next(&mut self) -> Option<Result<E, BindError>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            item = self.events.recv() => item,
        }
    }

    /// Request cancellation without waiting for the task
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait until the upstream subscription has been released
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(event = E::NAME, error = %e, "watch task failed");
            }
        }
    }
}

impl<E> Drop for EventWatch<E> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<E> std::fmt::Debug for EventWatch<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWatch")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("running", &self.task.as_ref().is_some_and(|t| !t.is_finished()))
            .finish()
    }
}

enum Exit {
    Cancelled,
    UpstreamClosed,
    ConsumerGone,
    Failed,
}

async fn deliver<E: ContractEvent>(
    logs: mpsc::Receiver<Result<Log, TransportError>>,
    handle: Box<dyn Subscription>,
    tx: mpsc::Sender<Result<E, BindError>>,
    cancel: CancellationToken,
) {
    let exit = pump(logs, &tx, &cancel).await;
    match exit {
        Exit::Cancelled => debug!(event = E::NAME, "watch cancelled"),
        Exit::UpstreamClosed => debug!(event = E::NAME, "upstream subscription closed"),
        Exit::ConsumerGone => debug!(event = E::NAME, "watch consumer dropped"),
        Exit::Failed => debug!(event = E::NAME, "watch ended with an error"),
    }
    handle.unsubscribe().await;
}

async fn pump<E: ContractEvent>(
    mut logs: mpsc::Receiver<Result<Log, TransportError>>,
    tx: &mpsc::Sender<Result<E, BindError>>,
    cancel: &CancellationToken,
) -> Exit {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Exit::Cancelled,
            next = logs.recv() => next,
        };
        let (item, last) = match next {
            None => (
                Err(BindError::Transport(TransportError::SubscriptionClosed)),
                Some(Exit::UpstreamClosed),
            ),
            Some(Err(e)) => (Err(BindError::Transport(e)), Some(Exit::Failed)),
            Some(Ok(log)) => match E::decode_log(&log) {
                Ok(event) => (Ok(event), None),
                Err(e) => (Err(e), Some(Exit::Failed)),
            },
        };
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Exit::Cancelled,
            sent = tx.send(item) => sent,
        };
        if sent.is_err() {
            return Exit::ConsumerGone;
        }
        if let Some(exit) = last {
            return exit;
        }
    }
}
