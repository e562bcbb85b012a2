//! Retry policy for a single provider.
//!
//! Attempt 0 runs immediately. Attempt `n >= 1` waits `backoff_unit * 2^n`
//! first (2s then 4s with the default one-second unit). A permission denial
//! ends the loop early since retrying cannot grant permission.

use imsg_core::classify::CODE_PERMISSION_DENIED;
use imsg_core::config::SendConfig;
use imsg_core::message::SendResult;
use std::time::Duration;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base unit for the backoff delay.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &SendConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            backoff_unit: Duration::from_millis(cfg.backoff_unit_ms),
        }
    }

    /// Policy that never sleeps. Used in tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_unit: Duration::ZERO,
        }
    }

    /// Total attempts, first one included.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before `attempt` (0-based). Zero for the first attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Whether a failed result is a permission/automation denial.
pub fn is_permission_denial(result: &SendResult) -> bool {
    let code = CODE_PERMISSION_DENIED.to_string();
    result.error_code.as_deref() == Some(code.as_str())
        || result
            .error
            .as_deref()
            .is_some_and(|e| e.contains(code.as_str()))
        || result
            .recommendation
            .as_deref()
            .is_some_and(|r| r.contains("Automation"))
}
