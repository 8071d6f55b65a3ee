//! Completion handles of submitted problem changes.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::ProblemChangeError;

/// Outcome of a submitted problem change.
pub type ProblemChangeOutcome = Result<(), ProblemChangeError>;

/// Creates a connected completer/future pair.
pub fn problem_change_channel() -> (ProblemChangeCompleter, ProblemChangeFuture) {
    let (tx, rx) = oneshot::channel();
    (
        ProblemChangeCompleter { tx },
        ProblemChangeFuture { rx, outcome: None },
    )
}

/// Resolves one [`ProblemChangeFuture`] exactly once.
///
/// Every resolving method consumes the completer. Dropping it unresolved
/// reads as a cancellation on the future side.
pub struct ProblemChangeCompleter {
    tx: oneshot::Sender<ProblemChangeOutcome>,
}

impl ProblemChangeCompleter {
    /// A best solution containing the change was delivered.
    pub fn complete(self) {
        // The submitter may have dropped its future.
        let _ = self.tx.send(Ok(()));
    }

    pub fn fail(self, error: ProblemChangeError) {
        let _ = self.tx.send(Err(error));
    }

    pub fn cancel(self) {
        self.fail(ProblemChangeError::Cancelled);
    }

    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for ProblemChangeCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeCompleter")
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}

/// Resolves once a best solution containing the change has been consumed,
/// or once the change is cancelled.
///
/// Await it from async code, or call [`wait`](Self::wait) from a thread
/// outside any async runtime.
pub struct ProblemChangeFuture {
    rx: oneshot::Receiver<ProblemChangeOutcome>,
    outcome: Option<ProblemChangeOutcome>,
}

impl ProblemChangeFuture {
    /// A future that is already resolved.
    pub fn resolved(outcome: ProblemChangeOutcome) -> Self {
        let (_tx, rx) = oneshot::channel();
        Self {
            rx,
            outcome: Some(outcome),
        }
    }

    /// Blocks the current thread until the change is resolved.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn wait(self) -> ProblemChangeOutcome {
        match self.outcome {
            Some(outcome) => outcome,
            None => self
                .rx
                .blocking_recv()
                .unwrap_or(Err(ProblemChangeError::Cancelled)),
        }
    }

    /// Returns the outcome if the change is already resolved.
    pub fn try_result(&mut self) -> Option<ProblemChangeOutcome> {
        if self.outcome.is_none() {
            match self.rx.try_recv() {
                Ok(outcome) => self.outcome = Some(outcome),
                Err(TryRecvError::Closed) => {
                    self.outcome = Some(Err(ProblemChangeError::Cancelled))
                }
                Err(TryRecvError::Empty) => {}
            }
        }
        self.outcome.clone()
    }

    pub fn is_done(&mut self) -> bool {
        self.try_result().is_some()
    }
}

impl Future for ProblemChangeFuture {
    type Output = ProblemChangeOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.outcome.clone() {
            return Poll::Ready(outcome);
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(received) => {
                let outcome = received.unwrap_or(Err(ProblemChangeError::Cancelled));
                self.outcome = Some(outcome.clone());
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for ProblemChangeFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemChangeFuture")
            .field("outcome", &self.outcome)
            .finish()
    }
}
