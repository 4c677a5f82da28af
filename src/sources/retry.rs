//! Retry decorator for snapshot sources.
//!
//! [`RetrySource`] wraps any [`SnapshotSource`] and retries requests that
//! failed for transient reasons (timeouts, connection errors, `429`, `5xx`).
//! Missing files and unparseable bodies are returned immediately: asking
//! again would give the same answer and only delays the next tier.
//!
//! # Backoff
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..100ms)
//! ```

use rand::{Rng, rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::warn;

use super::SnapshotSource;
use crate::error::Result;
use crate::models::{Manifest, Snapshot};

pub struct RetrySource<S> {
    inner: S,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<S> RetrySource<S> {
    /// Wrap `inner`, retrying up to `max_retries` times after the first attempt.
    ///
    /// ```ignore
    /// let source = RetrySource::new(HttpSource::new(config)?, 2, Duration::from_millis(250));
    /// ```
    pub fn new(inner: S, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(5),
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=100);
        delay + Duration::from_millis(jitter_ms)
    }

    async fn with_retry<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    if !e.is_transient() || attempt > self.max_retries {
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        op,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                        ?delay,
                        error = %e,
                        "Source request failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl<S> fmt::Debug for RetrySource<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrySource")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<S: SnapshotSource> SnapshotSource for RetrySource<S> {
    async fn fetch_live(&self, category: &str) -> Result<Snapshot> {
        self.with_retry("fetch_live", move || self.inner.fetch_live(category))
            .await
    }

    async fn fetch_manifest(&self) -> Result<Manifest> {
        self.with_retry("fetch_manifest", move || self.inner.fetch_manifest())
            .await
    }

    async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot> {
        self.with_retry("fetch_snapshot", move || self.inner.fetch_snapshot(filename))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        calls: AtomicUsize,
        fail_times: usize,
        status: u16,
    }

    impl SnapshotSource for Flaky {
        async fn fetch_live(&self, _category: &str) -> Result<Snapshot> {
            Err(ResolveError::NotFound("live".to_string()))
        }

        async fn fetch_manifest(&self) -> Result<Manifest> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Err(ResolveError::Status {
                    url: "http://test/index.json".to_string(),
                    status: self.status,
                })
            } else {
                Ok(Manifest::default())
            }
        }

        async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResolveError::NotFound(filename.to_string()))
        }
    }

    fn flaky(fail_times: usize, status: u16) -> Flaky {
        Flaky {
            calls: AtomicUsize::new(0),
            fail_times,
            status,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let source = RetrySource::new(flaky(2, 503), 2, Duration::from_millis(1));
        assert!(source.fetch_manifest().await.is_ok());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let source = RetrySource::new(flaky(10, 500), 1, Duration::from_millis(1));
        assert!(source.fetch_manifest().await.is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let source = RetrySource::new(flaky(10, 403), 3, Duration::from_millis(1));
        assert!(source.fetch_manifest().await.is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_does_not_retry_not_found() {
        let source = RetrySource::new(flaky(0, 200), 3, Duration::from_millis(1));
        assert!(source.fetch_snapshot("2025-08-27-general.json").await.is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_is_capped() {
        let source = RetrySource::new(flaky(0, 200), 3, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(2));
        assert!(source.delay_for(10) <= Duration::from_millis(2100));
        assert!(source.delay_for(1) >= Duration::from_secs(1));
    }
}
