//! Exponential backoff with jitter.
//!
//! # Responsibilities
//! - Compute how long a failed host stays out of rotation
//! - Advance and reset the failure count without mutating the receiver
//!
//! # Design Decisions
//! - `ExponentialBackoff` is a plain `Copy` value; every transition returns a new one
//! - Jitter only ever shortens the delay, so `max_delay` is a hard ceiling
//! - The first delay and any delay at the ceiling are exact; jitter applies in between

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Backoff tuning shared by every host of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first failure, in milliseconds.
    pub initial_ms: u64,

    /// Upper bound for any computed delay, in milliseconds.
    pub max_ms: u64,

    /// Fraction of the delay that may be shaved off at random (0.0 - 1.0).
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 300,
            max_ms: 10_000,
            jitter: 1.0,
        }
    }
}

/// Immutable exponential backoff state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    attempt: u32,
}

impl ExponentialBackoff {
    /// Create a backoff at attempt 0.
    pub fn new(config: BackoffConfig) -> Self {
        let jitter = if config.jitter.is_finite() {
            config.jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            config: BackoffConfig { jitter, ..config },
            attempt: 0,
        }
    }

    /// Number of failures recorded so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// The ceiling no delay ever exceeds.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.config.max_ms)
    }

    /// Un-jittered delay for the current attempt: `min(initial * 2^attempt, max)`.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.uncapped_ms().min(self.config.max_ms))
    }

    /// True once the exponential has reached `max_delay`.
    pub fn is_capped(&self) -> bool {
        self.uncapped_ms() >= self.config.max_ms
    }

    fn uncapped_ms(&self) -> u64 {
        let factor = 2u64.saturating_pow(self.attempt);
        self.config.initial_ms.saturating_mul(factor)
    }

    /// Delay for the current attempt, jittered with the thread-local RNG.
    pub fn delay(&self) -> Duration {
        self.delay_with(&mut rand::thread_rng())
    }

    /// Delay for the current attempt.
    ///
    /// Attempt 0 yields `initial` and a capped attempt yields `max`. Attempts in between are
    /// sampled uniformly from `[base * (1 - jitter), base]`.
    pub fn delay_with<R: Rng>(&self, rng: &mut R) -> Duration {
        let base = self.base_delay();
        if self.attempt == 0 || self.is_capped() || self.config.jitter <= 0.0 || base.is_zero() {
            return base;
        }

        let base_ms = base.as_secs_f64() * 1000.0;
        let low_ms = base_ms * (1.0 - self.config.jitter);
        let sampled_ms = rng.gen_range(low_ms..=base_ms);
        Duration::from_secs_f64(sampled_ms / 1000.0).min(base)
    }

    /// Backoff for the next failure.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            config: self.config,
            attempt: self.attempt.saturating_add(1),
        }
    }

    /// Backoff with the failure count cleared.
    #[must_use]
    pub fn reset(&self) -> Self {
        Self {
            config: self.config,
            attempt: 0,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(initial_ms: u64, max_ms: u64) -> ExponentialBackoff {
        ExponentialBackoff::new(BackoffConfig {
            initial_ms,
            max_ms,
            jitter: 0.0,
        })
    }

    #[test]
    fn test_delay_without_jitter() {
        let mut b = fixed(300, 10_000);
        let expected = [300, 600, 1200, 2400, 4800, 9600, 10_000, 10_000];
        for ms in expected {
            assert_eq!(b.delay(), Duration::from_millis(ms));
            b = b.next();
        }
    }

    #[test]
    fn test_delay_is_monotonic_and_capped() {
        for (initial, max) in [(1, 1), (7, 1000), (500, 5000), (250, 250), (1000, 60_000)] {
            let mut b = fixed(initial, max);
            let mut previous = Duration::ZERO;
            for attempt in 0..80u32 {
                let d = b.delay();
                let expected = initial.saturating_mul(2u64.saturating_pow(attempt)).min(max);
                assert_eq!(d, Duration::from_millis(expected));
                assert!(d >= previous);
                assert!(d <= b.max_delay());
                previous = d;
                b = b.next();
            }
        }
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 500,
            max_ms: 5000,
            jitter: 1.0,
        });
        for _ in 0..10 {
            let base = b.base_delay();
            for _ in 0..50 {
                let d = b.delay();
                assert!(d <= base);
                assert!(d <= Duration::from_millis(5000));
            }
            b = b.next();
        }
    }

    #[test]
    fn test_first_delay_is_never_jittered() {
        for jitter in [0.25, 1.0] {
            let b = ExponentialBackoff::new(BackoffConfig {
                initial_ms: 300,
                max_ms: 10_000,
                jitter,
            });
            for _ in 0..200 {
                assert_eq!(b.delay(), Duration::from_millis(300));
            }
        }
        let b = ExponentialBackoff::default();
        assert_eq!(b.delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_jittered_sequence_after_resets() {
        fn check_sequence(mut b: ExponentialBackoff) {
            assert_eq!(b.delay(), Duration::from_millis(500));
            b = b.next();
            for _ in 0..4 {
                let base = b.base_delay();
                let d = b.delay();
                assert!(d <= base, "{:?} above {:?}", d, base);
                assert!(d <= Duration::from_millis(5000));
                b = b.next();
            }
            assert!(b.is_capped());
            assert_eq!(b.delay(), Duration::from_millis(5000));
        }

        let b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 500,
            max_ms: 5000,
            jitter: 1.0,
        });
        check_sequence(b);

        let advanced = b.next().next().next();
        let reset = advanced.reset();
        let dupe = advanced.reset();
        check_sequence(reset);
        check_sequence(dupe);
    }

    #[test]
    fn test_capped_delay_is_exact() {
        let mut b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 500,
            max_ms: 5000,
            jitter: 1.0,
        });
        while !b.is_capped() {
            b = b.next();
        }
        // 500 * 2^4 = 8000 is the first attempt over the ceiling
        assert_eq!(b.attempt(), 4);
        for _ in 0..50 {
            assert_eq!(b.delay(), Duration::from_millis(5000));
            b = b.next();
        }
    }

    #[test]
    fn test_partial_jitter_lower_bound() {
        let b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 1000,
            max_ms: 10_000,
            jitter: 0.25,
        })
        .next();
        for _ in 0..100 {
            let d = b.delay();
            assert!(d >= Duration::from_millis(1500), "{:?} below lower bound", d);
            assert!(d <= Duration::from_millis(2000));
        }
    }

    #[test]
    fn test_out_of_range_jitter_is_clamped() {
        let b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 100,
            max_ms: 1000,
            jitter: 7.5,
        });
        assert_eq!(b.config().jitter, 1.0);

        let b = ExponentialBackoff::new(BackoffConfig {
            initial_ms: 100,
            max_ms: 1000,
            jitter: f64::NAN,
        });
        assert_eq!(b.delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let b = fixed(100, 1000).next().next().next();
        assert_eq!(b.attempt(), 3);
        let r = b.reset();
        assert_eq!(r.attempt(), 0);
        assert_eq!(r.reset(), r);
        // receiver untouched
        assert_eq!(b.attempt(), 3);
    }

    #[test]
    fn test_reset_values_evolve_independently() {
        let origin = fixed(500, 5000).next().next();
        let a = origin.reset();
        let mut b = origin.reset();

        let mut a1 = a;
        for _ in 0..4 {
            a1 = a1.next();
        }
        // advancing one copy leaves the other at its own position
        assert_eq!(b.attempt(), 0);
        assert_eq!(a.attempt(), 0);

        let mut a2 = a;
        for _ in 0..6 {
            assert_eq!(a2.delay(), b.delay());
            a2 = a2.next();
            b = b.next();
        }
    }

    #[test]
    fn test_advance_never_overflows() {
        let mut b = fixed(u64::MAX / 2, u64::MAX);
        for _ in 0..200 {
            b = b.next();
        }
        assert_eq!(b.delay(), Duration::from_millis(u64::MAX));
    }
}
