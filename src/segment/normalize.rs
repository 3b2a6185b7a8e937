//! Log text normalization.
//!
//! Raw runner logs carry terminal styling and provider workflow commands
//! (`##[group]`, `##[endgroup]`, ...). Both are removed before any matching so
//! identifiers can be searched as plain text. Escape sequences are consumed
//! by a `vte` state machine rather than a pattern, which also covers OSC
//! hyperlinks, cursor movement and other non-SGR sequences.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use vte::{Parser, Perform};

/// Matches provider log markers such as `##[group]` or `##[section]Starting`.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"##\[[^\]]+\]").expect("marker pattern is valid"))
}

/// Matches the ISO-8601 timestamp the runner prefixes to each line.
fn timestamp_regex() -> &'static Regex {
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z ?")
            .expect("timestamp pattern is valid")
    })
}

/// Normalized log, split into lines.
///
/// Line indices are the coordinate system for every range produced by the
/// engine. A single trailing newline does not produce an extra empty line;
/// it is remembered instead so slices that reach the end of the log can
/// reproduce it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLines {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl LogLines {
    /// Split already-clean text into lines without further processing.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };
        Self {
            lines: body.split('\n').map(str::to_string).collect(),
            trailing_newline,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Iterate lines together with their absolute index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().map(String::as_str).enumerate()
    }

    /// Iterate lines starting at `start`, keeping absolute indices.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = (usize, &str)> {
        self.iter().skip(start)
    }

    /// Join the inclusive range `[start, end]` back into text.
    ///
    /// Out-of-range bounds are clamped; an empty or inverted range yields an
    /// empty string.
    pub fn slice(&self, start: usize, end: usize) -> String {
        if self.lines.is_empty() || start > end || start >= self.lines.len() {
            return String::new();
        }
        let last = self.lines.len() - 1;
        let end = end.min(last);
        let mut text = self.lines[start..=end].join("\n");
        if end == last && self.trailing_newline {
            text.push('\n');
        }
        text
    }

    /// Text of every line strictly before `end`.
    pub fn prefix(&self, end: usize) -> String {
        if end == 0 {
            return String::new();
        }
        self.slice(0, end - 1)
    }

    /// Reassemble the whole log.
    pub fn to_text(&self) -> String {
        match self.lines.len() {
            0 => String::new(),
            n => self.slice(0, n - 1),
        }
    }
}

/// Removes terminal control sequences and provider markers from raw logs.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    strip_timestamps: bool,
}

impl Normalizer {
    /// Create a normalizer; `strip_timestamps` also drops line timestamps.
    pub fn new(strip_timestamps: bool) -> Self {
        Self { strip_timestamps }
    }

    /// Normalize a raw log into lines.
    pub fn normalize(&self, raw: &str) -> LogLines {
        let plain = strip_ansi(raw);
        let mut lines = LogLines::from_text(&plain);
        for line in lines.lines.iter_mut() {
            let mut cleaned = strip_log_markers(line).into_owned();
            if self.strip_timestamps {
                cleaned = strip_timestamp(&cleaned).into_owned();
            }
            *line = cleaned;
        }
        lines
    }
}

/// Collects printable output, dropping every escape and control sequence.
struct PlainText {
    out: String,
}

impl Perform for PlainText {
    fn print(&mut self, c: char) {
        self.out.push(c);
    }

    fn execute(&mut self, byte: u8) {
        // Keep line structure and tabs; other C0 controls (CR, BEL, BS) go
        match byte {
            b'\n' => self.out.push('\n'),
            b'\t' => self.out.push('\t'),
            _ => {}
        }
    }
}

/// Strip ANSI escape sequences and control characters.
///
/// Each line gets its own parser, so an unterminated OSC or DCS string
/// cannot swallow the lines after it.
pub fn strip_ansi(raw: &str) -> String {
    if !has_controls(raw) {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for (index, line) in raw.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if has_controls(line) {
            strip_line(line, &mut out);
        } else {
            out.push_str(line);
        }
    }
    out
}

fn has_controls(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_control() && b != b'\n' && b != b'\t')
}

fn strip_line(line: &str, out: &mut String) {
    let mut parser = Parser::new();
    let mut plain = PlainText {
        out: String::with_capacity(line.len()),
    };
    parser.advance(&mut plain, line.as_bytes());
    out.push_str(&plain.out);
}

/// Remove `##[...]` markers from a single line.
pub fn strip_log_markers(line: &str) -> Cow<'_, str> {
    if !line.contains("##[") {
        return Cow::Borrowed(line);
    }
    marker_regex().replace_all(line, "")
}

/// Remove a leading runner timestamp from a single line.
pub fn strip_timestamp(line: &str) -> Cow<'_, str> {
    timestamp_regex().replace(line, "")
}
