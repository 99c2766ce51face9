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

//! Abstracts reading the current time and sleeping.
//!
//! Waiting for a long-running operation blocks the calling thread. The loop
//! reads the time and sleeps only through the [Clock] trait, so applications
//! (and tests) can substitute a virtual clock.

use std::time::{Duration, Instant};

/// A source of time and a way to block the calling thread.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current time.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for `delay`.
    fn sleep(&self, delay: Duration);
}

/// The [Clock] used by default, backed by the system's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay)
    }
}
