// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate report rendering.
//!
//! The report is a pure function of the triggering text and the history, so
//! identical inputs always render identical text. Labels use the wording the
//! bot's groups already know (Indonesian).

use crate::history::{History, Sighting};

const HEADER: &str = "❌DETEKSI DITEMUKAN❌";
const LABEL_FIRST: &str = "Pengirim pertama kali";
const LABEL_CURRENT: &str = "Pengirim saat ini";

/// Timestamp format shown in reports, in the sighting's own offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum characters of an entry's own text shown as a preview.
pub const PREVIEW_CHARS: usize = 50;

/// Render the report for `history`, triggered by a message whose text as
/// received was `original_text`.
pub fn build_report(original_text: &str, history: &History) -> String {
    let trigger = original_text.trim();
    let last_index = history.len().saturating_sub(1);

    let mut out = String::new();
    out.push_str(&format!("{HEADER}\n"));
    out.push_str(&format!("Isi pesan : {original_text}\n\n"));

    for (index, sighting) in history.iter().enumerate() {
        write_entry(&mut out, index, last_index, sighting, trigger);
    }

    out.push('\n');
    out.push_str(&format!("Total : {} kali", history.len()));
    out
}

fn write_entry(out: &mut String, index: usize, last_index: usize, sighting: &Sighting, trigger: &str) {
    let label = if index == 0 {
        LABEL_FIRST.to_string()
    } else if index == last_index {
        LABEL_CURRENT.to_string()
    } else {
        format!("Pengirim ke-{}", index + 1)
    };

    out.push_str(&format!("{} : {label}\n", sighting.sender.display_name));
    out.push_str(&format!("{}\n", sighting.seen_at.format(TIMESTAMP_FORMAT)));
    if sighting.text != trigger {
        out.push_str(&format!("Teks asli : \"{}\"\n", preview(&sighting.text)));
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
