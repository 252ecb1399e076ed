//! Rate-limit backoff configuration

use std::time::Duration;

/// Default number of retries after a rate-limited first attempt
pub const DEFAULT_EXP_LIMIT: u32 = 8;

/// Configuration for retrying rate-limited requests with exponential backoff
///
/// The first attempt is unconditional; each of up to `exp_limit` retries is
/// preceded by a sleep of `base_delay * multiplier^n` for the n-th retry
/// (0-indexed). With the defaults that is 1s, 2s, 4s, ... 128s.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Maximum number of retries
    pub exp_limit: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 doubles delay each retry)
    pub multiplier: f64,
    /// Random jitter factor (0.0 to 1.0), off by default
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            exp_limit: DEFAULT_EXP_LIMIT,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }
}

impl BackoffConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retries
    pub fn with_exp_limit(mut self, exp_limit: u32) -> Self {
        self.exp_limit = exp_limit;
        self
    }

    /// Set the delay before the first retry
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set jitter factor
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Total attempts allowed for one call, including the first
    pub fn max_attempts(&self) -> u32 {
        self.exp_limit.saturating_add(1)
    }

    /// Check whether another attempt is allowed after `attempts` attempts
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts()
    }

    /// Delay before retry number `retry` (0-indexed)
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let exponent = retry.min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Apply jitter to a base delay
    pub fn apply_jitter(&self, base: Duration) -> Duration {
        if self.jitter == 0.0 {
            return base;
        }

        let jitter_range = base.as_secs_f64() * self.jitter;
        let jitter = rand::random::<f64>() * 2.0 * jitter_range - jitter_range;
        let adjusted = (base.as_secs_f64() + jitter).max(0.0);

        Duration::try_from_secs_f64(adjusted).unwrap_or(base)
    }

    /// Get delay with jitter applied for a given retry
    pub fn delay_with_jitter(&self, retry: u32) -> Duration {
        let base = self.delay_for_attempt(retry);
        self.apply_jitter(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BackoffConfig::default();
        assert_eq!(config.exp_limit, 8);
        assert_eq!(config.base_delay, Duration::from_secs(1));
        assert_eq!(config.max_attempts(), 9);
        assert_eq!(config.jitter, 0.0);
    }

    #[test]
    fn test_delay_calculation() {
        let config = BackoffConfig::new();

        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(7), Duration::from_secs(128));
    }

    #[test]
    fn test_should_retry() {
        let config = BackoffConfig::new().with_exp_limit(2);
        assert!(config.should_retry(0));
        assert!(config.should_retry(2));
        assert!(!config.should_retry(3));

        let no_retries = BackoffConfig::new().with_exp_limit(0);
        assert!(no_retries.should_retry(0));
        assert!(!no_retries.should_retry(1));
    }

    #[test]
    fn test_huge_exponent_saturates() {
        let config = BackoffConfig::new();
        assert_eq!(config.delay_for_attempt(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_jitter_bounds() {
        let config = BackoffConfig::new().with_jitter(0.5);
        for _ in 0..100 {
            let delay = config.delay_with_jitter(1);
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(3));
        }

        assert_eq!(BackoffConfig::new().with_jitter(4.0).jitter, 1.0);
    }
}
