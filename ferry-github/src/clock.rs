//! Time source used for rate-limit and retry waits

use std::time::Duration;

use async_trait::async_trait;

/// Wall clock plus a way to wait on it
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds
    fn now(&self) -> i64;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// The real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
