//! Rendering of drift reports for terminal and machine consumption.
//!
//! Text output groups entries by kind, one line per entry, with diff-style
//! markers: `+` added, `-` removed, `~` modified, `!` type changed. JSON
//! output serializes the report as-is for downstream tooling.

use std::fmt::Write;

use confdrift_core::{DriftEntry, DriftKind, DriftReport};

/// Renders a report as human-readable text grouped by kind.
///
/// Entries keep the engine's deterministic document order. An empty report
/// renders as a single "no drift" line.
#[must_use]
pub fn render_text(report: &DriftReport) -> String {
    if report.is_empty() {
        return "No drift detected.\n".to_string();
    }

    let mut out = String::new();
    render_group(&mut out, "Added", &report.added);
    render_group(&mut out, "Removed", &report.removed);

    let (modified, type_changed): (Vec<&DriftEntry>, Vec<&DriftEntry>) = report
        .modified
        .iter()
        .partition(|entry| entry.kind == DriftKind::Modified);
    render_group(&mut out, "Modified", &modified);
    render_group(&mut out, "Type changed", &type_changed);

    let total = report.len();
    let noun = if total == 1 { "difference" } else { "differences" };
    let _ = writeln!(out, "{total} {noun} found.");
    out
}

/// Renders a report as pretty-printed JSON.
#[must_use]
pub fn render_json(report: &DriftReport) -> String {
    // DriftReport serialization is infallible: no maps with non-string
    // keys, no non-finite rejections in serde_json's value model.
    let mut out = serde_json::to_string_pretty(report).unwrap_or_default();
    out.push('\n');
    out
}

fn render_group<E: std::borrow::Borrow<DriftEntry>>(out: &mut String, title: &str, entries: &[E]) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for entry in entries {
        let _ = writeln!(out, "  {}", render_entry(entry.borrow()));
    }
}

fn render_entry(entry: &DriftEntry) -> String {
    match entry.kind {
        DriftKind::Added => match &entry.new_value {
            Some(value) => format!("+ {} = {value}", entry.path),
            None => format!("+ {}", entry.path),
        },
        DriftKind::Removed => match &entry.old_value {
            Some(value) => format!("- {} = {value}", entry.path),
            None => format!("- {}", entry.path),
        },
        DriftKind::Modified | DriftKind::TypeChanged => {
            let marker = if entry.kind == DriftKind::Modified { '~' } else { '!' };
            let old = entry
                .old_value
                .as_ref()
                .map_or_else(|| "(absent)".to_string(), ToString::to_string);
            let new = entry
                .new_value
                .as_ref()
                .map_or_else(|| "(absent)".to_string(), ToString::to_string);
            format!("{marker} {}: {old} -> {new}", entry.path)
        },
    }
}
