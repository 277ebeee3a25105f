//! Rendering of raw log chunks into labeled, colored terminal lines.

use std::borrow::Cow;

use colored::{Color, Colorize};

use crate::runtime::{LogChunk, LogStream};

/// Rotating label colors; containers past the end reuse from the start.
pub const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::BrightCyan,
];

pub const SEVERITY_KEYWORDS: [&str; 3] = ["WARNING", "ERROR", "CRITICAL"];

/// Docker's multiplexed log protocol prefixes each frame with 8 bytes:
/// stream type, three zero bytes, then a big-endian payload length.
const FRAME_HEADER_LEN: usize = 8;

pub fn palette_color(slot: usize) -> Color {
    PALETTE[slot % PALETTE.len()]
}

fn frame_header(data: &[u8]) -> Option<usize> {
    match data {
        [kind, 0, 0, 0, a, b, c, d, ..] if *kind <= 2 => {
            Some(u32::from_be_bytes([*a, *b, *c, *d]) as usize)
        }
        _ => None,
    }
}

/// Strip a stream frame header from the start of `line` when one is present.
pub fn strip_frame_header(line: &[u8]) -> &[u8] {
    match frame_header(line) {
        Some(_) => &line[FRAME_HEADER_LEN..],
        None => line,
    }
}

/// Remove every frame header from a chunk that starts with one, using the
/// encoded payload lengths. Chunks without a header are returned as is.
pub fn strip_frames(data: &[u8]) -> Cow<'_, [u8]> {
    if frame_header(data).is_none() {
        return Cow::Borrowed(data);
    }

    let mut out = Vec::with_capacity(data.len());
    let mut rest = data;
    while let Some(len) = frame_header(rest) {
        let payload = &rest[FRAME_HEADER_LEN..];
        let take = len.min(payload.len());
        out.extend_from_slice(&payload[..take]);
        rest = &payload[take..];
    }
    out.extend_from_slice(rest);
    Cow::Owned(out)
}

#[derive(Clone, Debug)]
pub struct LogRenderer {
    label: String,
    color: Color,
    colorize: bool,
}

impl LogRenderer {
    /// `label` should already be padded to the width shared by all streams.
    pub fn new(label: impl Into<String>, slot: usize, colorize: bool) -> Self {
        Self {
            label: label.into(),
            color: palette_color(slot),
            colorize,
        }
    }

    fn indent(&self) -> String {
        " ".repeat(self.label.chars().count() + 1)
    }

    fn paint_label(&self, stream: LogStream) -> String {
        if !self.colorize {
            return self.label.clone();
        }
        match stream {
            LogStream::Stdout => self.label.color(self.color).to_string(),
            LogStream::Stderr => self.label.white().on_red().to_string(),
        }
    }

    fn paint_text(&self, text: &str) -> String {
        if !self.colorize {
            return text.to_string();
        }
        highlight_keywords(text, self.color)
    }

    /// Render one chunk. Continuation lines are indented under the first line's
    /// text so multi-line output stays aligned after the label.
    pub fn render(&self, chunk: &LogChunk) -> Option<String> {
        let data = strip_frames(&chunk.data);
        let text = String::from_utf8_lossy(&data);
        let lines: Vec<String> = text
            .split_terminator('\n')
            .map(|line| {
                let stripped = strip_frame_header(line.as_bytes());
                String::from_utf8_lossy(stripped)
                    .trim_end_matches('\r')
                    .to_string()
            })
            .collect();

        if lines.is_empty() {
            return None;
        }

        let body = lines
            .iter()
            .map(|line| self.paint_text(line))
            .collect::<Vec<_>>()
            .join(&format!("\n{}", self.indent()));

        Some(format!("{} {}", self.paint_label(chunk.stream), body))
    }

    /// Render a stream failure inline with the error highlight.
    pub fn render_error(&self, message: &str) -> String {
        let text = format!("stream error: {}", message);
        if !self.colorize {
            return format!("{} {}", self.label, text);
        }
        format!(
            "{} {}",
            self.label.white().on_red(),
            text.white().on_red()
        )
    }
}

/// Colors `text` with `color`, giving severity keywords a fixed white-on-red
/// highlight.
pub fn highlight_keywords(text: &str, color: Color) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some((at, keyword)) = next_keyword(rest) {
        let (before, after) = rest.split_at(at);
        if !before.is_empty() {
            out.push_str(&before.color(color).to_string());
        }
        out.push_str(&keyword.white().on_red().bold().to_string());
        rest = &after[keyword.len()..];
    }

    if !rest.is_empty() {
        out.push_str(&rest.color(color).to_string());
    }
    out
}

fn next_keyword(text: &str) -> Option<(usize, &'static str)> {
    SEVERITY_KEYWORDS
        .iter()
        .filter_map(|k| text.find(*k).map(|at| (at, *k)))
        .min_by_key(|(at, _)| *at)
}
