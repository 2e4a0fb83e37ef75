use std::ops::Range;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// @module: Scanning SAMI text for <Sync Start=...> timing lines

// @const: SAMI sync tag, ASCII case folding only, ASCII digits only
static SYNC_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i-u)<Sync Start=([0-9]+)>").unwrap()
});

// @const: Any markup tag, non-greedy and confined to one line
static MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<.*?>").unwrap()
});

/// Subtitle class marker used by Korean SAMI files
pub const DEFAULT_CLASS_MARKER: &str = "class=krcc";

// @struct: One timestamp field inside a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingMark {
    // @field: Parsed value in milliseconds
    pub ms: u64,

    // @field: Digits exactly as they appeared
    pub literal: String,

    // @field: Zero-based line number
    pub line_index: usize,

    // @field: Byte range of the digits within the line
    pub span: Range<usize>,
}

// @struct: Search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleOccurrence {
    // @field: Sync time in milliseconds
    pub ms: u64,

    // @field: Line text with markup stripped and trimmed
    pub text: String,
}

impl SubtitleOccurrence {
    /// Format the sync time as HH:MM:SS,mmm
    pub fn format_time(&self) -> String {
        let hours = self.ms / 3_600_000;
        let minutes = (self.ms % 3_600_000) / 60_000;
        let seconds = (self.ms % 60_000) / 1_000;
        let millis = self.ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

/// Iterator over the lines of a text with their terminators attached.
///
/// `\r\n`, `\n` and a lone `\r` all end a line. Concatenating every item gives
/// back the input unchanged.
#[derive(Debug, Clone)]
pub struct LinesInclusive<'a> {
    rest: &'a str,
}

impl<'a> Iterator for LinesInclusive<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let end = match self.rest.find(|c: char| c == '\n' || c == '\r') {
            Some(i) if self.rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => self.rest.len(),
        };

        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(line)
    }
}

/// Split `text` into lines, keeping each line's terminator
pub fn split_lines_inclusive(text: &str) -> LinesInclusive<'_> {
    LinesInclusive { rest: text }
}

/// Remove a trailing `\r\n`, `\n` or `\r`
pub fn trim_line_ending(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

/// Remove every `<...>` tag and trim surrounding whitespace
pub fn strip_markup(line: &str) -> String {
    MARKUP_REGEX.replace_all(line, "").trim().to_string()
}

/// Every sync tag on one line, in order of appearance
pub fn timing_marks_in_line(line: &str, line_index: usize) -> Vec<TimingMark> {
    SYNC_TAG_REGEX
        .captures_iter(line)
        .filter_map(|caps| {
            let digits = caps.get(1)?;
            match digits.as_str().parse::<u64>() {
                Ok(ms) => Some(TimingMark {
                    ms,
                    literal: digits.as_str().to_string(),
                    line_index,
                    span: digits.range(),
                }),
                Err(_) => {
                    warn!(
                        "Ignoring out-of-range sync time '{}' on line {}",
                        digits.as_str(),
                        line_index + 1
                    );
                    None
                }
            }
        })
        .collect()
}

/// Finds subtitle lines by class marker and search text
#[derive(Debug, Clone)]
pub struct SyncLineScanner {
    class_marker: String,
}

impl Default for SyncLineScanner {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_MARKER)
    }
}

impl SyncLineScanner {
    // @creates: Scanner for the given class marker (matched case-insensitively)
    pub fn new(class_marker: &str) -> Self {
        Self {
            class_marker: class_marker.to_lowercase(),
        }
    }

    pub fn class_marker(&self) -> &str {
        &self.class_marker
    }

    /// Lazily yield each subtitle line that carries the class marker, contains
    /// `search_text` verbatim and has a sync tag.
    ///
    /// An empty `search_text` yields nothing. Each call starts a fresh scan.
    pub fn find_occurrences<'a>(&'a self, text: &'a str, search_text: &'a str) -> Occurrences<'a> {
        let text = if search_text.is_empty() { "" } else { text };
        Occurrences {
            lines: split_lines_inclusive(text).enumerate(),
            class_marker: &self.class_marker,
            search_text,
        }
    }

    /// All timing marks in the document
    pub fn timing_marks(text: &str) -> Vec<TimingMark> {
        split_lines_inclusive(text)
            .enumerate()
            .flat_map(|(index, line)| timing_marks_in_line(line, index))
            .collect()
    }
}

/// Lazy search results produced by [`SyncLineScanner::find_occurrences`]
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    lines: std::iter::Enumerate<LinesInclusive<'a>>,
    class_marker: &'a str,
    search_text: &'a str,
}

impl Iterator for Occurrences<'_> {
    type Item = SubtitleOccurrence;

    fn next(&mut self) -> Option<SubtitleOccurrence> {
        for (index, raw_line) in self.lines.by_ref() {
            let line = trim_line_ending(raw_line);

            if !line.to_lowercase().contains(self.class_marker) || !line.contains(self.search_text) {
                continue;
            }

            let Some(mark) = timing_marks_in_line(line, index).into_iter().next() else {
                debug!("Line {} matches but has no sync tag, skipping", index + 1);
                continue;
            };

            let text = strip_markup(line);
            if text.is_empty() {
                continue;
            }

            return Some(SubtitleOccurrence { ms: mark.ms, text });
        }
        None
    }
}
