//! Pause applied before a settings action checks the session.
//!
//! The pause is awaited on the runtime timer, so concurrent requests wait
//! side by side instead of queueing behind each other.

use std::time::Duration;

use async_trait::async_trait;

/// Policy deciding how long a settings action waits before running.
#[async_trait]
pub trait DelayPolicy: Send + Sync {
    /// Wait according to the policy.
    async fn pause(&self);
}

/// Wait a fixed duration on every action.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use account_settings::domain::FixedDelay;
///
/// let delay = FixedDelay::from_millis(250);
/// assert_eq!(delay.duration(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    duration: Duration,
}

impl FixedDelay {
    /// Delay applied when configuration does not override it.
    pub const DEFAULT: Duration = Duration::from_millis(500);

    /// Wait `duration` on every action.
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Wait `millis` milliseconds on every action.
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Configured wait.
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[async_trait]
impl DelayPolicy for FixedDelay {
    async fn pause(&self) {
        if !self.duration.is_zero() {
            tokio::time::sleep(self.duration).await;
        }
    }
}

/// Do not wait at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDelay;

#[async_trait]
impl DelayPolicy for NoDelay {
    async fn pause(&self) {}
}
