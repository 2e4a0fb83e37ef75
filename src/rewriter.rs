/*!
 * Line-preserving rewrite of SAMI sync times.
 *
 * Only the digits inside each `<Sync Start=...>` tag change. Everything else,
 * including line terminators and the presence or absence of a final newline,
 * is copied through byte for byte.
 */

use log::debug;

use crate::sync_scanner::{split_lines_inclusive, timing_marks_in_line};

/// Counters describing what a rewrite touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Number of lines in the document
    pub lines: usize,
    /// Number of sync times rewritten
    pub adjusted: usize,
    /// Number of sync times that would have gone negative and were set to 0
    pub clamped: usize,
}

/// Result of a rewrite: the new text plus its report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub report: RewriteReport,
}

/// Applies a constant millisecond offset to every sync tag
pub struct TimestampRewriter;

impl TimestampRewriter {
    /// Shift every sync time in `text` by `offset_ms`, clamping at zero
    pub fn rewrite(text: &str, offset_ms: i64) -> String {
        Self::rewrite_with_report(text, offset_ms).text
    }

    /// Same as [`TimestampRewriter::rewrite`], also counting what changed
    pub fn rewrite_with_report(text: &str, offset_ms: i64) -> Rewrite {
        let mut output = String::with_capacity(text.len() + text.len() / 16);
        let mut report = RewriteReport::default();

        for (index, line) in split_lines_inclusive(text).enumerate() {
            report.lines += 1;

            let marks = timing_marks_in_line(line, index);
            if marks.is_empty() {
                output.push_str(line);
                continue;
            }

            let mut cursor = 0;
            for mark in marks {
                let new_ms = Self::shift(mark.ms, offset_ms);
                if offset_ms < 0 && mark.ms < offset_ms.unsigned_abs() {
                    report.clamped += 1;
                }

                output.push_str(&line[cursor..mark.span.start]);
                output.push_str(&new_ms.to_string());
                cursor = mark.span.end;
                report.adjusted += 1;
            }
            output.push_str(&line[cursor..]);
        }

        debug!(
            "Rewrote {} sync time(s) across {} line(s) with offset {} ms ({} clamped to 0)",
            report.adjusted, report.lines, offset_ms, report.clamped
        );

        Rewrite { text: output, report }
    }

    // @returns: max(0, ms + offset)
    pub fn shift(ms: u64, offset_ms: i64) -> u64 {
        ms.saturating_add_signed(offset_ms)
    }
}
