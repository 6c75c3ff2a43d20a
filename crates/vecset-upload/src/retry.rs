use std::time::{Duration, SystemTime, UNIX_EPOCH};
use vecset_core::config::LayeredConfig;

/// Bounded retry with exponential backoff for transient upsert failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per batch, including the first
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.value.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms.value),
            max_backoff: Duration::from_millis(config.max_backoff_ms.value),
        }
    }

    /// A single attempt and no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_backoff.as_millis() as u64,
            self.max_backoff.as_millis() as u64,
        )
    }
}

/// Exponential backoff with +/-25% jitter, never above `max_ms`
fn calculate_backoff(attempt: u32, initial_ms: u64, max_ms: u64) -> Duration {
    let exp = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let capped = initial_ms.saturating_mul(exp).min(max_ms);

    let jitter_range = capped / 4;
    let jitter = if jitter_range > 0 {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos() as u64;
        seed % (jitter_range * 2)
    } else {
        0
    };

    let with_jitter = capped
        .saturating_sub(jitter_range)
        .saturating_add(jitter)
        .min(max_ms);
    Duration::from_millis(with_jitter)
}
