//! Retry Policy for Blocking Setup Operations
//!
//! A retry loop is described by data: how many retries follow the first
//! attempt, and how long to wait before each retry. The wait goes through an
//! injected [`DelayNs`], so the same policy drives a real 2 s backoff on the
//! device and a zero-delay stub in tests.
//!
//! ## Attempt accounting
//!
//! ```text
//! max_retries = R
//!
//! attempt 1 ─ fail ─ wait(1) ─ attempt 2 ─ fail ─ wait(2) ─ ... ─ attempt R+1 ─ fail ─► Exhausted
//! ```
//!
//! There is no wait after the final failure.

use embedded_hal::delay::DelayNs;

use crate::constants::sensors::{SENSOR_SETUP_MAX_RETRIES, SENSOR_SETUP_RETRY_DELAY_MS};

/// Wait schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backoff {
    /// Retry immediately
    None,
    /// Same wait before every retry
    Fixed {
        /// Wait (ms)
        delay_ms: u32,
    },
    /// Wait grows by `step_ms` per retry
    Linear {
        /// Wait before the first retry (ms)
        initial_ms: u32,
        /// Increase per retry (ms)
        step_ms: u32,
    },
    /// Wait doubles per retry up to `max_ms`
    Exponential {
        /// Wait before the first retry (ms)
        initial_ms: u32,
        /// Cap (ms)
        max_ms: u32,
    },
}

impl Backoff {
    /// Wait after failed attempt number `attempt` (1-based)
    pub fn delay_ms(&self, attempt: u32) -> u32 {
        let retry = attempt.saturating_sub(1);
        match *self {
            Self::None => 0,
            Self::Fixed { delay_ms } => delay_ms,
            Self::Linear { initial_ms, step_ms } => {
                initial_ms.saturating_add(step_ms.saturating_mul(retry))
            }
            Self::Exponential { initial_ms, max_ms } => {
                let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
                initial_ms.saturating_mul(factor).min(max_ms)
            }
        }
    }
}

/// Outcome of a policy whose every attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted<E> {
    /// Attempts made, always `max_retries + 1`
    pub attempts: u32,
    /// Error from the final attempt
    pub last_error: E,
}

/// Bounded retry with a backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait schedule
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: SENSOR_SETUP_MAX_RETRIES,
            backoff: Backoff::Fixed {
                delay_ms: SENSOR_SETUP_RETRY_DELAY_MS,
            },
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries and a fixed wait
    pub const fn fixed(max_retries: u32, delay_ms: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay_ms },
        }
    }

    /// Policy with `max_retries` immediate retries
    pub const fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::None,
        }
    }

    /// Total attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` until it succeeds or the budget is spent
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, E, D, F>(&self, delay: &mut D, mut op: F) -> Result<T, Exhausted<E>>
    where
        D: DelayNs,
        F: FnMut(u32) -> Result<T, E>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(last_error) if attempt >= self.max_attempts() => {
                    return Err(Exhausted {
                        attempts: attempt,
                        last_error,
                    });
                }
                Err(_) => {
                    let wait = self.backoff.delay_ms(attempt);
                    if wait > 0 {
                        delay.delay_ms(wait);
                    }
                }
            }
        }
    }
}
