//! Settle waits.
//!
//! After an interaction the page may update asynchronously. These helpers
//! poll an observation until a condition holds or the window closes, and
//! always hand back the last value seen.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::plan::{Timeouts, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_MS};
use crate::result::AriaResult;

/// Options for a settle wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Window in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl From<Timeouts> for WaitOptions {
    fn from(t: Timeouts) -> Self {
        Self {
            timeout_ms: t.settle_ms,
            poll_interval_ms: t.poll_interval_ms,
        }
    }
}

/// Result of a settle wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    /// Last observed value
    pub value: T,
    /// Whether the condition held for that value
    pub met: bool,
    /// Time spent waiting
    pub elapsed: Duration,
}

/// Poll `probe` until `done` accepts its value or the window elapses.
///
/// The probe runs at least once. Probe errors abort the wait.
pub async fn wait_until<T, F, Fut, P>(options: WaitOptions, mut probe: F, done: P) -> AriaResult<Settled<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AriaResult<T>>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let window = options.timeout();

    loop {
        let value = probe().await?;
        let elapsed = start.elapsed();
        if done(&value) {
            return Ok(Settled {
                value,
                met: true,
                elapsed,
            });
        }
        if elapsed >= window {
            return Ok(Settled {
                value,
                met: false,
                elapsed,
            });
        }
        let remaining = window.saturating_sub(elapsed);
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}
