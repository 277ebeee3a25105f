//! Terminal rendering for `status` and `icon`.
//!
//! Cells are padded before they are colored so escape codes never count
//! toward column width.

use colored::{ColoredString, Colorize};

use cm_core::status::{IconSummary, RowKind, StatusReport, StatusRow};

pub const ICON: &str = "●";
const ABSENT: &str = "absent";
const HEADERS: [&str; 4] = ["NAME", "STATE", "IMAGE", "ID"];
const COLUMN_GAP: &str = "  ";

fn state_text(row: &StatusRow) -> String {
    match &row.state {
        Some(state) => state.to_string(),
        None => ABSENT.to_string(),
    }
}

fn id_text(row: &StatusRow) -> &str {
    match &row.kind {
        RowKind::Container { id } => id,
        RowKind::Absent => "",
    }
}

fn cells(row: &StatusRow) -> [String; 4] {
    [
        row.name.clone(),
        state_text(row),
        row.image.clone().unwrap_or_default(),
        id_text(row).to_string(),
    ]
}

fn paint_name(row: &StatusRow, padded: String) -> ColoredString {
    if row.highlighted {
        padded.yellow()
    } else {
        padded.normal()
    }
}

fn paint_state(row: &StatusRow, padded: String) -> ColoredString {
    if row.is_running() {
        padded.green()
    } else {
        padded.red()
    }
}

/// One line per row under a `NAME STATE IMAGE ID` header.
pub fn status_table(report: &StatusReport) -> String {
    let rows: Vec<[String; 4]> = report.rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let pad = |text: &str, col: usize| format!("{:<width$}", text, width = widths[col]);

    let mut out = Vec::with_capacity(rows.len() + 1);
    let header: Vec<String> = HEADERS
        .iter()
        .enumerate()
        .map(|(col, h)| pad(h, col).bold().to_string())
        .collect();
    out.push(header.join(COLUMN_GAP).trim_end().to_string());

    for (row, text) in report.rows.iter().zip(&rows) {
        let line = [
            paint_name(row, pad(&text[0], 0)).to_string(),
            paint_state(row, pad(&text[1], 1)).to_string(),
            pad(&text[2], 2),
            pad(&text[3], 3),
        ]
        .join(COLUMN_GAP);
        out.push(line.trim_end().to_string());
    }

    out.join("\n")
}

/// `●<n>` for each non-empty bucket: running, highlighted, failing.
pub fn icon_summary(summary: &IconSummary) -> String {
    let buckets = [
        (summary.running, ICON.green()),
        (summary.highlighted, ICON.yellow()),
        (summary.failing, ICON.red()),
    ];

    buckets
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, icon)| format!("{}{}", icon, count))
        .collect::<Vec<_>>()
        .join(" ")
}
