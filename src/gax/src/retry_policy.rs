// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the retry policy used to wait for long-running operations.
//!
//! Waiting for a long-running operation is a loop: check whether the
//! operation is done, sleep, reload the operation, and repeat. The
//! [RetryPolicy] controls how long to sleep between reloads, and when to
//! stop waiting. It implements truncated [exponential backoff] without
//! jitter, bounded by a total elapsed time budget.
//!
//! Note that the policy does not retry failed poll requests. Any error
//! reported by the service (or the transport) stops the loop.
//!
//! [exponential backoff]: https://en.wikipedia.org/wiki/Exponential_backoff

use std::time::Duration;

/// The error type for retry policy creation.
#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("the multiplier ({0}) should be >= 1.0")]
    InvalidMultiplier(f64),
    #[error("the initial delay ({0:?}) should be greater than zero")]
    InvalidInitialDelay(Duration),
    #[error(
        "the maximum delay ({maximum:?}) should be greater than or equal to the initial delay ({initial:?})"
    )]
    EmptyRange {
        maximum: Duration,
        initial: Duration,
    },
}

/// Controls the delays and the total time budget of a wait loop.
///
/// # Example
/// ```
/// # use cloud_gax::retry_policy::RetryPolicy;
/// use std::time::Duration;
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.initial_delay(), Duration::from_secs(1));
/// assert_eq!(policy.next_delay(Duration::from_secs(1)), Duration::from_millis(1300));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    timeout: Duration,
}

impl RetryPolicy {
    /// Returns a builder initialized with the default values.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// The delay before the first reload.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// The growth factor applied to the delay after each reload.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The upper bound for any delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// The total elapsed time budget for the loop.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Computes the delay that follows `current`.
    ///
    /// This is `min(current * multiplier, max_delay)`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        // Avoid overflows in mul_f64() for large multipliers or delays.
        let floor = current.max(Duration::from_nanos(1));
        if self.multiplier >= self.max_delay.div_duration_f64(floor) {
            return self.max_delay;
        }
        current.mul_f64(self.multiplier).min(self.max_delay)
    }

    /// Returns true if a loop started `elapsed` ago should stop waiting.
    pub fn is_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.timeout
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MULTIPLIER: f64 = 1.3;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Creates [RetryPolicy] values.
#[derive(Clone, Debug)]
pub struct RetryPolicyBuilder {
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    timeout: Duration,
}

impl RetryPolicyBuilder {
    /// Creates a builder with the default parameters.
    ///
    /// # Example
    /// ```
    /// # use cloud_gax::retry_policy::{Error, RetryPolicyBuilder};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicyBuilder::new()
    ///     .with_initial_delay(Duration::from_secs(10))
    ///     .with_multiplier(2.0)
    ///     .with_max_delay(Duration::from_secs(300))
    ///     .with_timeout(Duration::from_secs(3600))
    ///     .build()?;
    /// assert_eq!(policy.next_delay(Duration::from_secs(160)), Duration::from_secs(300));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn new() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Change the initial delay.
    pub fn with_initial_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.initial_delay = v.into();
        self
    }

    /// Change the multiplier.
    pub fn with_multiplier<V: Into<f64>>(mut self, v: V) -> Self {
        self.multiplier = v.into();
        self
    }

    /// Change the maximum delay.
    pub fn with_max_delay<V: Into<Duration>>(mut self, v: V) -> Self {
        self.max_delay = v.into();
        self
    }

    /// Change the total time budget.
    ///
    /// A zero timeout is valid, the loop checks the operation once and
    /// returns.
    pub fn with_timeout<V: Into<Duration>>(mut self, v: V) -> Self {
        self.timeout = v.into();
        self
    }

    /// Creates a new retry policy, validating the parameters.
    pub fn build(self) -> Result<RetryPolicy, Error> {
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            return Err(Error::InvalidMultiplier(self.multiplier));
        }
        if self.initial_delay.is_zero() {
            return Err(Error::InvalidInitialDelay(self.initial_delay));
        }
        if self.max_delay < self.initial_delay {
            return Err(Error::EmptyRange {
                maximum: self.max_delay,
                initial: self.initial_delay,
            });
        }
        Ok(RetryPolicy {
            initial_delay: self.initial_delay,
            multiplier: self.multiplier,
            max_delay: self.max_delay,
            timeout: self.timeout,
        })
    }

    /// Creates a new retry policy clamping the ranges towards recommended
    /// values.
    ///
    /// The maximum delay is clamped first, to be between one second and one
    /// day (both inclusive). Then the initial delay is clamped to be between
    /// one millisecond and the maximum delay. Finally, the multiplier is
    /// clamped to the `[1.0, 32.0]` range. The timeout is used as-is.
    ///
    /// # Example
    /// ```
    /// # use cloud_gax::retry_policy::RetryPolicyBuilder;
    /// use std::time::Duration;
    /// let policy = RetryPolicyBuilder::new()
    ///     .with_initial_delay(Duration::ZERO)
    ///     .with_multiplier(0.5)
    ///     .clamp();
    /// assert_eq!(policy.initial_delay(), Duration::from_millis(1));
    /// assert_eq!(policy.multiplier(), 1.0);
    /// ```
    pub fn clamp(self) -> RetryPolicy {
        let multiplier = if self.multiplier.is_nan() {
            DEFAULT_MULTIPLIER
        } else {
            self.multiplier.clamp(1.0, 32.0)
        };
        let max_delay = self
            .max_delay
            .clamp(Duration::from_secs(1), Duration::from_secs(24 * 60 * 60));
        let initial_delay = self
            .initial_delay
            .clamp(Duration::from_millis(1), max_delay);
        RetryPolicy {
            initial_delay,
            multiplier,
            max_delay,
            timeout: self.timeout,
        }
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
