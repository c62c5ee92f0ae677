// Control plane: admission control and caller-level deadlines
//
// Bounds the number of quotes priced at once and abandons requests that
// exceed the configured deadline. No partial result is ever produced.
//
// Numan Thabit 2025 Nov

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

#[derive(Debug, Error)]
#[error("request exceeded deadline of {0:?}")]
pub struct DeadlineExceeded(pub Duration);

#[derive(Clone)]
pub struct AdmissionControl {
    max_inflight: Arc<Semaphore>,
    capacity: usize,
    request_timeout: Duration,
}

impl AdmissionControl {
    pub fn new(max_inflight: usize, request_timeout: Duration) -> Self {
        Self {
            max_inflight: Arc::new(Semaphore::new(max_inflight)),
            capacity: max_inflight,
            request_timeout,
        }
    }

    /// Requests currently holding a permit.
    pub fn inflight(&self) -> usize {
        self.capacity - self.max_inflight.available_permits()
    }

    /// Run `work` once a permit is free. Waiting for the permit counts against
    /// the deadline; on expiry the future is dropped and its ledger calls abandoned.
    pub async fn run<F, T>(&self, work: F) -> Result<T, DeadlineExceeded>
    where
        F: Future<Output = T>,
    {
        let deadline = self.request_timeout;
        tokio::time::timeout(deadline, async {
            let _permit = self.max_inflight.acquire().await;
            work.await
        })
        .await
        .map_err(|_| {
            debug!(deadline_ms = deadline.as_millis() as u64, "request deadline exceeded");
            DeadlineExceeded(deadline)
        })
    }
}
