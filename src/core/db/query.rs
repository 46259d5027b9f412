//! Query results and the blocking call facade.
//!
//! Connect and query work runs on a background worker thread, one per
//! operation, while the caller blocks on a channel with a deadline. The
//! caller perceives synchronous execution but the wait is bounded and
//! cancellable instead of a spin loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::core::{RequeryError, Result};

/// Represents the result of a SQL query execution.
///
/// Rows and columns keep the backend's order. A cell is `None` when the
/// column's declared type is unrecognized or the value was SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as decoded string cells
    pub rows: Vec<Vec<Option<String>>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }
}

/// The tagged outcome of a `query()` call.
///
/// The client never raises an error to the caller; instead the outcome says
/// whether the rows are current or a stale carry-over, so callers that cannot
/// tolerate staleness can reject everything but `Fresh`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The statement ran; these rows are current.
    Fresh(QueryResult),
    /// The network was unreachable; the last stored result, unchanged.
    Unreachable(Option<QueryResult>),
    /// Both attempts failed; the last stored result, unchanged.
    Failed(Option<QueryResult>),
}

impl QueryOutcome {
    /// The rows this outcome carries, fresh or stale.
    pub fn rows(&self) -> Option<&QueryResult> {
        match self {
            QueryOutcome::Fresh(result) => Some(result),
            QueryOutcome::Unreachable(last) | QueryOutcome::Failed(last) => last.as_ref(),
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, QueryOutcome::Fresh(_))
    }
}

/// Handle for one background call.
///
/// The worker runs the job to completion regardless; `wait` only bounds how
/// long the caller is willing to block. A call that times out or is cancelled
/// is marked abandoned, and the worker discards its result (dropping whatever
/// the job moved in, such as a connection handle) instead of sending it back.
/// A result that races the deadline is dropped with the channel.
pub struct Call<T> {
    receiver: mpsc::Receiver<T>,
    abandoned: Arc<AtomicBool>,
}

impl<T: Send + 'static> Call<T> {
    /// Spawns a named worker thread running `job`.
    pub fn spawn<F>(name: &str, job: F) -> Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let abandoned = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&abandoned);

        thread::Builder::new().name(name.to_string()).spawn(move || {
            let out = job();
            if !flag.load(Ordering::SeqCst) {
                let _ = sender.send(out);
            }
        })?;

        Ok(Call {
            receiver,
            abandoned,
        })
    }

    /// Blocks the caller until the worker finishes or the deadline passes.
    pub fn wait(self, timeout: Duration) -> Result<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                self.abandoned.store(true, Ordering::SeqCst);
                Err(RequeryError::Timeout(timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RequeryError::Cancelled),
        }
    }

    /// Attempts to receive the result without blocking.
    pub fn try_wait(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Marks the call abandoned; the worker will discard its result.
    pub fn cancel(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }
}
