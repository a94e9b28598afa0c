// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate message detection for dupwatch.
//!
//! Messages are keyed per chat by their trimmed, lowercased text. Every
//! repeat of a key is appended to that key's history and rendered into a
//! report, except when the same sender repeats themselves within the
//! suppression window. Histories are capped; the durable backup is pruned by
//! age independently of the cap.

pub mod detector;
pub mod history;
pub mod normalize;
pub mod report;
pub mod retention;
pub mod store;
pub mod suppression;

pub use detector::{Detector, Outcome, backup_record};
pub use history::{History, Sighting};
pub use normalize::{MessageKey, is_trackable, normalize_for_match, normalize_for_store};
pub use report::build_report;
pub use retention::RetentionPolicy;
pub use store::{CheckOutcome, DedupStore};
pub use suppression::SuppressionPolicy;
