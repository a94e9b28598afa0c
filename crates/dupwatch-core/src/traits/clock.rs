// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock source for sighting timestamps.

use chrono::{DateTime, FixedOffset, Local};

/// Supplies the time at which an event is processed.
///
/// Sightings are stamped with the processing host's local wall-clock time,
/// not the platform's event timestamp.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}
