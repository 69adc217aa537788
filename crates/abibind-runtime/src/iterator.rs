//! Lazy decoded log sequence

use std::marker::PhantomData;

use tracing::debug;

use crate::event::ContractEvent;
use crate::types::Log;
use crate::BindError;

/// Forward-only sequence of decoded events over fetched logs.
///
/// Logs are decoded one at a time as the iterator advances. The first decode
/// failure ends the sequence; it is then available from [`LogIterator::error`].
pub struct LogIterator<E> {
    logs: std::vec::IntoIter<Log>,
    error: Option<BindError>,
    done: bool,
    _event: PhantomData<fn() -> E>,
}

impl<E: ContractEvent> LogIterator<E> {
    /// Iterate over already-fetched logs
    pub fn new(logs: Vec<Log>) -> Self {
        Self {
            logs: logs.into_iter(),
            error: None,
            done: false,
            _event: PhantomData,
        }
    }

    /// The failure that ended iteration, if any
    pub fn error(&self) -> Option<&BindError> {
        self.error.as_ref()
    }

    /// Stop iterating and release remaining logs
    pub fn close(&mut self) {
        self.done = true;
        self.logs = Vec::new().into_iter();
    }

    /// Logs not yet consumed
    pub fn remaining(&self) -> usize {
        if self.done {
            0
        } else {
            self.logs.len()
        }
    }
}

impl<E: ContractEvent> Iterator for LogIterator<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        if self.done {
            return None;
        }
        let Some(log) = self.logs.next() else {
            self.done = true;
            return None;
        };
        match E::decode_log(&log) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!(event = E::NAME, error = %e, "log iteration stopped");
                self.error = Some(e);
                self.close();
                None
            }
        }
    }
}

impl<E> std::fmt::Debug for LogIterator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogIterator")
            .field("remaining", &self.logs.len())
            .field("error", &self.error)
            .field("done", &self.done)
            .finish()
    }
}
