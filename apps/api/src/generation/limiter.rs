use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::generation::GenerationError;

/// Shared backpressure for generator calls: bounded concurrency plus a minimum
/// spacing between call starts. Waiting is cooperative and capped by `queue_wait`.
#[derive(Debug, Clone)]
pub struct GenerationLimiter {
    permits: Arc<Semaphore>,
    last_start: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
    queue_wait: Duration,
}

/// Held for the duration of one generator call.
#[derive(Debug)]
pub struct GenerationPermit {
    _permit: OwnedSemaphorePermit,
}

impl GenerationLimiter {
    pub fn new(max_concurrent: usize, min_interval: Duration, queue_wait: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_start: Arc::new(Mutex::new(None)),
            min_interval,
            queue_wait,
        }
    }

    /// Waits for a slot. Fails with `RateLimited` when the queue budget runs out.
    pub async fn acquire(&self) -> Result<GenerationPermit, GenerationError> {
        let deadline = Instant::now() + self.queue_wait;

        let permit = tokio::time::timeout_at(deadline, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| {
                warn!(
                    "Generation queue wait exceeded {}ms",
                    self.queue_wait.as_millis()
                );
                GenerationError::RateLimited
            })?
            // the semaphore is never closed
            .map_err(|_| GenerationError::RateLimited)?;

        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.min_interval;
            if ready_at > deadline {
                warn!("Generation spacing would exceed the queue budget");
                return Err(GenerationError::RateLimited);
            }
            if ready_at > Instant::now() {
                debug!(
                    "Spacing generation call by {}ms",
                    (ready_at - Instant::now()).as_millis()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());

        Ok(GenerationPermit { _permit: permit })
    }
}
