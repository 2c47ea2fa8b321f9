//! Bounded worker pool for platform operations.
//!
//! Every remote call runs as a spawned task that first acquires one of N
//! semaphore permits; a saturated pool queues the task. The submitting caller
//! awaits the task under a deadline measured from submission (so queueing
//! time counts against it). On expiry the caller receives `Timeout` and the
//! task is detached, not cancelled: the platform may still complete the
//! in-flight operation. That divergence window is an accepted property of
//! the design, not corrected by cancellation propagation.

use crate::errors::TelephonyError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, warn};

/// Default worker-pool capacity.
pub const DEFAULT_POOL_CAPACITY: usize = 4;

/// Default per-submission deadline.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Bounded pool with per-submission deadline.
///
/// Cloning shares the underlying pool, so one bridge cloned into several
/// services still enforces a single global concurrency bound.
#[derive(Clone)]
pub struct OperationBridge {
    permits: Arc<Semaphore>,
    deadline: Duration,
}

impl OperationBridge {
    /// Create a bridge with the given capacity and deadline.
    #[must_use]
    pub fn new(capacity: usize, deadline: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            deadline,
        }
    }

    /// Create a bridge with default capacity (4) and deadline (30s).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, DEFAULT_DEADLINE)
    }

    /// Run `operation` on the pool, waiting at most the configured deadline.
    ///
    /// The permit is held for the full duration of the operation and released
    /// on every exit path, including after the caller has given up.
    ///
    /// # Errors
    ///
    /// - `Timeout` when the deadline elapses (queue wait included)
    /// - the operation's own error otherwise
    pub async fn submit<F, T>(&self, operation: F) -> Result<T, TelephonyError>
    where
        F: Future<Output = Result<T, TelephonyError>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let task = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(|_| {
                error!(target: "tc.services.bridge", "Worker pool closed");
                TelephonyError::Internal
            })?;
            operation.await
        });

        match tokio::time::timeout(self.deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(target: "tc.services.bridge", error = %join_error, "Worker task failed");
                Err(TelephonyError::Internal)
            }
            Err(_) => {
                // The task keeps running; only the caller gives up.
                warn!(
                    target: "tc.services.bridge",
                    deadline_secs = self.deadline.as_secs_f64(),
                    "Platform operation exceeded deadline"
                );
                Err(TelephonyError::Timeout)
            }
        }
    }
}
