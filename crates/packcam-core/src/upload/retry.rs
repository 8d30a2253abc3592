use crate::CoreResult;

use std::{future::Future, time::Duration};

use tracing::warn;

/// Fixed-delay retry applied by transports around each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before every retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Run `attempt` until it succeeds or the retries are exhausted.
    ///
    /// The error of the last attempt is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> CoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CoreResult<T>>,
    {
        let mut retry = 0;

        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.retries => {
                    retry += 1;
                    warn!(
                        operation,
                        retry,
                        delay_ms = self.delay.as_millis(),
                        error = %e,
                        "Retrying upload request"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
