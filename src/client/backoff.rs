//! Exponential backoff between reconnection attempts.

use std::time::Duration;

/// Delays grow from `initial_delay` by `multiplier`, clamped to `max_delay`.
/// After `max_attempts` consecutive failures the client gives up.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt number `failures + 1`.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 0..failures {
            delay = next_delay(delay, self);
            if delay == self.max_delay {
                break;
            }
        }
        delay.min(self.max_delay)
    }

    pub fn exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts
    }
}

/// The delay that follows `current`.
pub fn next_delay(current: Duration, policy: &ReconnectPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}
