// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization for matching and display.

use std::fmt;

use sha2::{Digest, Sha256};

/// Messages with fewer characters than this (after trimming) are not tracked.
pub const MIN_TEXT_CHARS: usize = 3;

/// Duplicate-matching identity of a message: trimmed and lowercased text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey(String);

impl MessageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 hex digest of the key, as stored in the durable backup.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison key: leading/trailing whitespace removed, then lowercased.
pub fn normalize_for_match(raw: &str) -> MessageKey {
    MessageKey(raw.trim().to_lowercase())
}

/// Display text: leading/trailing whitespace removed, case preserved.
pub fn normalize_for_store(raw: &str) -> String {
    raw.trim().to_string()
}

/// Whether `raw` is long enough to be tracked at all.
///
/// Length is counted in characters, not bytes, so short non-ASCII messages
/// are judged the same way as short ASCII ones.
pub fn is_trackable(raw: &str, min_chars: usize) -> bool {
    raw.trim().chars().count() >= min_chars
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn match_key_trims_and_lowercases() {
        assert_eq!(normalize_for_match("  Hello World \n").as_str(), "hello world");
    }

    #[test]
    fn store_text_keeps_case() {
        assert_eq!(normalize_for_store("\tHello World  "), "Hello World");
    }

    #[test]
    fn inner_whitespace_is_significant() {
        assert_ne!(normalize_for_match("hello world"), normalize_for_match("hello  world"));
    }

    #[test]
    fn short_messages_are_not_trackable() {
        assert!(!is_trackable("", MIN_TEXT_CHARS));
        assert!(!is_trackable("   ", MIN_TEXT_CHARS));
        assert!(!is_trackable(" ok ", MIN_TEXT_CHARS));
        assert!(is_trackable(" yes ", MIN_TEXT_CHARS));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Two characters, six bytes.
        assert!(!is_trackable("日本", MIN_TEXT_CHARS));
        assert!(is_trackable("日本語", MIN_TEXT_CHARS));
    }

    #[test]
    fn digest_is_stable_hex() {
        let key = normalize_for_match("Hello");
        let digest = key.digest();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, normalize_for_match("  HELLO ").digest());
        assert_ne!(digest, normalize_for_match("hello!").digest());
    }

    proptest! {
        #[test]
        fn case_and_edge_whitespace_never_change_the_key(
            text in "[a-zA-Z0-9 ]{0,40}",
            lead in "[ \t\n]{0,4}",
            trail in "[ \t\n]{0,4}",
        ) {
            let padded = format!("{lead}{}{trail}", text.to_uppercase());
            prop_assert_eq!(normalize_for_match(&padded), normalize_for_match(&text));
        }

        #[test]
        fn trimmed_shorter_than_three_is_never_trackable(
            core in "[a-z]{0,2}",
            pad in "[ \t]{0,5}",
        ) {
            let raw = format!("{pad}{core}{pad}");
            prop_assert!(!is_trackable(&raw, MIN_TEXT_CHARS));
        }
    }
}
