// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rapid-repeat suppression.
//!
//! A sender who re-posts their own message shortly after posting it (double
//! send, retry after a flaky connection) should not be reported as a
//! duplicate of themselves. Only the most recent sighting is compared: once
//! somebody else has posted the same text in between, the next repeat is
//! always reported.

use crate::history::{History, Sighting};

/// Default suppression window in seconds.
pub const SUPPRESS_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionPolicy {
    window_secs: i64,
}

impl SuppressionPolicy {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs: i64::try_from(window_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// True when the last sighting in `history` is from the same sender and
    /// less than the window has elapsed since it.
    pub fn should_suppress(&self, history: &History, new: &Sighting) -> bool {
        let Some(last) = history.last() else {
            return false;
        };
        if last.sender.id != new.sender.id {
            return false;
        }
        let elapsed = (new.seen_at - last.seen_at).num_seconds();
        elapsed < self.window_secs
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self::new(SUPPRESS_WINDOW_SECS)
    }
}
