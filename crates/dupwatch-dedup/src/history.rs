// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sightings and the ordered history kept per (chat, message key).

use std::collections::VecDeque;

use chrono::{DateTime, FixedOffset, SubsecRound};
use dupwatch_core::Sender;

/// One occurrence of a message key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub sender: Sender,
    /// Chat-local wall-clock time, truncated to whole seconds.
    pub seen_at: DateTime<FixedOffset>,
    /// Text as the sender typed it, trimmed.
    pub text: String,
}

impl Sighting {
    pub fn new(sender: Sender, seen_at: DateTime<FixedOffset>, text: impl Into<String>) -> Self {
        Self {
            sender,
            seen_at: seen_at.trunc_subsecs(0),
            text: text.into(),
        }
    }
}

/// Insertion-ordered sightings of one message key in one chat.
///
/// Never empty: a history is created from its first sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<Sighting>,
}

impl History {
    pub(crate) fn new(first: Sighting) -> Self {
        Self {
            entries: VecDeque::from([first]),
        }
    }

    pub(crate) fn push(&mut self, sighting: Sighting) {
        self.entries.push_back(sighting);
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<Sighting> {
        // Keep at least one entry.
        if self.entries.len() > 1 {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest sighting still in the window.
    pub fn first(&self) -> Option<&Sighting> {
        self.entries.front()
    }

    /// Most recent sighting.
    pub fn last(&self) -> Option<&Sighting> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Sighting> {
        self.entries.iter()
    }

    /// Owned snapshot of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<Sighting> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .timestamp_opt(1_771_729_262 + secs, 0)
            .unwrap()
    }

    #[test]
    fn sighting_truncates_subseconds() {
        let precise = at(0) + chrono::TimeDelta::milliseconds(750);
        let sighting = Sighting::new(Sender::new(1, "Andre"), precise, "halo semua");
        assert_eq!(sighting.seen_at, at(0));
    }

    #[test]
    fn history_keeps_insertion_order() {
        let mut history = History::new(Sighting::new(Sender::new(1, "Andre"), at(0), "a"));
        history.push(Sighting::new(Sender::new(2, "Budi"), at(5), "b"));
        history.push(Sighting::new(Sender::new(3, "Citra"), at(9), "c"));

        let names: Vec<_> = history.iter().map(|s| s.sender.display_name.as_str()).collect();
        assert_eq!(names, ["Andre", "Budi", "Citra"]);
        assert_eq!(history.first().unwrap().sender.id, 1);
        assert_eq!(history.last().unwrap().sender.id, 3);
    }

    #[test]
    fn pop_oldest_never_empties_history() {
        let mut history = History::new(Sighting::new(Sender::new(1, "Andre"), at(0), "a"));
        assert!(history.pop_oldest().is_none());
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
    }
}
