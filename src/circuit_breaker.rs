//! # Circuit Breaker Module
//!
//! Stops calling the ingredient extraction service after repeated failures
//! and lets requests through again once the reset timeout has passed.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

use crate::extraction_config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for extraction requests
///
/// # State Machine
///
/// - **Closed**: requests pass through
/// - **Open**: `circuit_breaker_threshold` failures seen within
///   `circuit_breaker_reset_secs`, requests fail fast
/// - after the reset timeout the counter is cleared and the circuit closes
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_costing::circuit_breaker::CircuitBreaker;
    /// use food_costing::extraction_config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    fn state(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if the circuit is open (blocking requests)
    pub fn is_open(&self) -> bool {
        let mut state = self.state();

        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }

        match state.last_failure {
            Some(last) if last.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) => true,
            _ => {
                *state = BreakerState::default();
                false
            }
        }
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        let mut state = self.state();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());

        if state.failure_count == self.config.circuit_breaker_threshold {
            warn!(
                "Extraction circuit opened after {} consecutive failures",
                state.failure_count
            );
        }
    }

    /// Record a successful request, closing the circuit
    pub fn record_success(&self) {
        *self.state() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.state().failure_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32, reset_secs: u64) -> RecoveryConfig {
        RecoveryConfig {
            circuit_breaker_threshold: threshold,
            circuit_breaker_reset_secs: reset_secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::new(config(2, 60));
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_success_closes() {
        let breaker = CircuitBreaker::new(config(1, 60));
        breaker.record_failure();
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_resets_after_timeout() {
        let breaker = CircuitBreaker::new(config(1, 0));
        breaker.record_failure();
        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 0);
    }
}
