//! Fixed-delay pacing for outbound calls
//!
//! Both the LLM and search providers rate-limit aggressively; a single
//! shared pacer spaces out every external call within an analysis run.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive calls
pub struct RatePacer {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RatePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Wait until at least the configured interval has passed since the
    /// previous call. The first call never waits.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let pacer = RatePacer::from_millis(500);
        let start = Instant::now();
        pacer.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let pacer = RatePacer::from_millis(500);
        let start = Instant::now();

        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;

        // Two inter-call gaps of 500ms each
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_interval() {
        let pacer = RatePacer::from_millis(500);

        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        let before = Instant::now();
        pacer.wait().await;
        // Only the remaining 100ms should be slept
        assert_eq!(before.elapsed(), Duration::from_millis(100));
    }
}
