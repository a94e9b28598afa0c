// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manually advanced clock.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, TimeDelta};
use dupwatch_core::Clock;

/// A [`Clock`] frozen at a fixed instant until advanced.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += TimeDelta::seconds(secs);
    }

    pub fn set(&self, instant: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
