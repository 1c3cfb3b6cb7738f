//! Span locator: a one-pass scanner over document text.
//!
//! The scanner walks the combined start pattern across the input and, for
//! every candidate span, runs a brace-balanced sub-scan for the matching end
//! token. Everything between recognized constructs is passed through as
//! literal text; a start token with no matching end degrades to literal
//! output instead of failing.

use regex::Regex;

use crate::grammar::{end_pattern, MathMode, GRAMMAR};

/// One step of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent<'a> {
    /// Literal text passed through unchanged.
    Text(&'a str),
    /// An escaped dollar sequence; renders as a single literal `$`.
    EscapedDollar,
    /// A top-level `\ref{...}` or `\eqref{...}`, resolved without the
    /// typesetting engine.
    Reference { raw: &'a str, label: &'a str },
    /// A delimited math span.
    Math(SpanMatch<'a>),
}

/// A located math span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMatch<'a> {
    pub mode: MathMode,
    /// The LaTeX between the delimiters; the delimiter tokens themselves
    /// (and environment keywords) are excluded.
    pub latex: &'a str,
    /// Byte offset of the start delimiter in the scanned text.
    pub start: usize,
    /// Byte offset just past the end delimiter.
    pub end: usize,
}

/// Scan `text` for math spans, references and escaped dollars.
///
/// One pass, consumed once; scanning again means constructing a new scanner.
pub fn scan(text: &str) -> SpanScanner<'_> {
    SpanScanner::new(text)
}

/// Iterator over [`ScanEvent`]s. State is owned by one call and never shared.
#[derive(Debug)]
pub struct SpanScanner<'a> {
    text: &'a str,
    cursor: usize,
    pending: Option<ScanEvent<'a>>,
    done: bool,
}

impl<'a> SpanScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        SpanScanner {
            text,
            cursor: 0,
            pending: None,
            done: false,
        }
    }

    /// Decide what the start-pattern match at `start..end` is and consume it.
    fn classify(&mut self, start: usize, end: usize) -> ScanEvent<'a> {
        let text = self.text;
        let token = &text[start..end];

        if let Some(rule) = GRAMMAR.rule(token) {
            return self.sub_scan(start, end, rule.end, &rule.end_pattern, rule.mode);
        }

        if let Some(name) = token
            .strip_prefix("\\begin{")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            // Environments always lay out as display math; the end token is
            // synthesized from the opener's name.
            let end_token = format!("\\end{{{name}}}");
            let pattern = end_pattern(&end_token);
            return self.sub_scan(start, end, &end_token, &pattern, MathMode::Display);
        }

        if token.starts_with("\\ref{") || token.starts_with("\\eqref{") {
            let label = token
                .find('{')
                .map(|open| &token[open + 1..token.len() - 1])
                .unwrap_or_default();
            self.cursor = end;
            return ScanEvent::Reference { raw: token, label };
        }

        // One or more backslashes followed by a dollar; collapses to a
        // single literal dollar.
        self.cursor = end;
        ScanEvent::EscapedDollar
    }

    /// Search for `end_token` from `content_start`, tracking brace depth.
    /// An end token found inside braces is literal content, not a
    /// terminator; escaped characters are always skipped.
    fn sub_scan(
        &mut self,
        match_start: usize,
        content_start: usize,
        end_token: &str,
        pattern: &Regex,
        mode: MathMode,
    ) -> ScanEvent<'a> {
        let text = self.text;
        let mut depth: i32 = 0;
        let mut at = content_start;

        while let Some(found) = pattern.find_at(text, at) {
            let piece = found.as_str();
            if piece == end_token {
                if depth == 0 {
                    self.cursor = found.end();
                    return ScanEvent::Math(SpanMatch {
                        mode,
                        latex: &text[content_start..found.start()],
                        start: match_start,
                        end: found.end(),
                    });
                }
            } else if piece == "{" {
                depth += 1;
            } else if piece == "}" {
                depth -= 1;
            }
            at = found.end();
        }

        // No true end anywhere: emit the start token as literal text and
        // resume scanning immediately after it.
        tracing::debug!(
            token = &text[match_start..content_start],
            "unmatched math delimiter, passing through"
        );
        self.cursor = content_start;
        ScanEvent::Text(&text[match_start..content_start])
    }
}

impl<'a> Iterator for SpanScanner<'a> {
    type Item = ScanEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        if self.done {
            return None;
        }

        let text = self.text;
        match GRAMMAR.start_pattern().find_at(text, self.cursor) {
            Some(found) => {
                let lead = &text[self.cursor..found.start()];
                let event = self.classify(found.start(), found.end());
                if lead.is_empty() {
                    Some(event)
                } else {
                    self.pending = Some(event);
                    Some(ScanEvent::Text(lead))
                }
            }
            None => {
                self.done = true;
                let rest = &text[self.cursor..];
                self.cursor = text.len();
                if rest.is_empty() {
                    None
                } else {
                    Some(ScanEvent::Text(rest))
                }
            }
        }
    }
}
