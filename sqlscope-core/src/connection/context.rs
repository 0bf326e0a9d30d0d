//! Caller-supplied cancellation and deadline.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ExecError;

/// Cancellation token plus optional deadline passed down from the caller.
///
/// The engine imposes no timeout of its own; every statement it runs is
/// raced against this context and dropped (releasing its connection) as
/// soon as the token fires or the deadline passes.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never cancels.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Uses `token` (typically shared with the caller's request) for cancellation.
    pub fn cancelled_by(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fails fast when the context is already cancelled or expired.
    pub fn check(&self) -> Result<(), ExecError> {
        if self.token.is_cancelled() {
            return Err(ExecError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(ExecError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Runs `operation`, aborting it on cancellation or deadline.
    pub async fn run<F, T>(&self, operation: F) -> Result<T, ExecError>
    where
        F: Future<Output = Result<T, ExecError>>,
    {
        self.check()?;
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ExecError::Cancelled),
            _ = deadline => Err(ExecError::DeadlineExceeded),
            result = operation => result,
        }
    }
}
