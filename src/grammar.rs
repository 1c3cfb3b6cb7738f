//! Delimiter grammar for locating math spans.
//!
//! Compiles, once at startup, the set of recognized start/end delimiter
//! pairs and a single combined start pattern used to find the next candidate
//! span in a document. Start tokens are tried longest-first so a
//! two-character delimiter sharing a prefix with a one-character delimiter
//! is never shadowed.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

/// Layout mode of a located span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Display,
}

/// Inline math delimiter pairs.
pub const INLINE_MATH: &[(&str, &str)] = &[("$", "$"), ("\\(", "\\)")];

/// Display math delimiter pairs.
pub const DISPLAY_MATH: &[(&str, &str)] = &[
    ("$$", "$$"),
    ("\\[", "\\]"),
    ("\\begin{equation}", "\\end{equation}"),
];

/// A compiled delimiter rule: the end token to search for, the mode it
/// selects, and the sub-scan pattern matching that end token, an escaped
/// character, or a bare brace.
#[derive(Debug)]
pub struct DelimiterRule {
    pub end: &'static str,
    pub mode: MathMode,
    pub end_pattern: Regex,
}

/// The compiled grammar: one rule per declared start token plus the combined
/// start pattern. Built once and immutable afterwards.
#[derive(Debug)]
pub struct DelimiterGrammar {
    rules: IndexMap<&'static str, DelimiterRule>,
    start_pattern: Regex,
}

impl DelimiterGrammar {
    fn build() -> Self {
        let mut rules = IndexMap::new();
        for &(start, end) in INLINE_MATH {
            rules.insert(
                start,
                DelimiterRule {
                    end,
                    mode: MathMode::Inline,
                    end_pattern: end_pattern(end),
                },
            );
        }
        for &(start, end) in DISPLAY_MATH {
            rules.insert(
                start,
                DelimiterRule {
                    end,
                    mode: MathMode::Display,
                    end_pattern: end_pattern(end),
                },
            );
        }

        // Longest tokens first, ties broken lexicographically, so "$$" wins
        // over "$" at the same position.
        let mut starts: Vec<&str> = rules.keys().copied().collect();
        starts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut parts: Vec<String> = Vec::new();
        parts.push(
            starts
                .iter()
                .map(|start| pattern_quote(start))
                .collect::<Vec<_>>()
                .join("|"),
        );
        // Environment openers, escaped dollars, reference commands.
        parts.push(r"\\begin\{[^}]*\}".to_string());
        parts.push(r"\\*\\\$".to_string());
        parts.push(r"\\(?:eq)?ref\{[^}]*\}".to_string());

        let start_pattern =
            Regex::new(&parts.join("|")).expect("combined start pattern is valid");

        DelimiterGrammar {
            rules,
            start_pattern,
        }
    }

    /// The combined pattern matching any span opener, environment opener,
    /// escaped dollar or reference command.
    pub fn start_pattern(&self) -> &Regex {
        &self.start_pattern
    }

    /// Look up the rule for a declared start token.
    pub fn rule(&self, start_token: &str) -> Option<&DelimiterRule> {
        self.rules.get(start_token)
    }
}

lazy_static! {
    /// Grammar shared by every scan.
    pub static ref GRAMMAR: DelimiterGrammar = DelimiterGrammar::build();
}

/// Escape a literal token for safe use inside a pattern.
pub fn pattern_quote(token: &str) -> String {
    let mut quoted = String::with_capacity(token.len() * 2);
    for c in token.chars() {
        if matches!(
            c,
            '^' | '$' | '(' | ')' | '{' | '}' | '+' | '*' | '?' | '-' | '|' | '[' | ']' | ':'
                | '\\'
        ) {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}

/// Build the sub-scan pattern for an end token: the token itself, a
/// backslash-escaped character (always skipped), or a bare brace.
pub fn end_pattern(end: &str) -> Regex {
    Regex::new(&format!(r"{}|\\.|[{{}}]", pattern_quote(end)))
        .expect("end delimiter pattern is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_quote_escapes_metacharacters() {
        assert_eq!(pattern_quote("$$"), "\\$\\$");
        assert_eq!(pattern_quote("\\["), "\\\\\\[");
        assert_eq!(pattern_quote("\\begin{equation}"), "\\\\begin\\{equation\\}");
        assert_eq!(pattern_quote("abc"), "abc");
    }

    #[test]
    fn test_display_token_wins_over_inline_prefix() {
        let m = GRAMMAR.start_pattern().find("$$x$$").unwrap();
        assert_eq!(m.as_str(), "$$");
        assert_eq!(m.start(), 0);
    }

    #[test]
    fn test_start_pattern_finds_earliest_candidate() {
        let m = GRAMMAR.start_pattern().find("a \\[x\\] and $y$").unwrap();
        assert_eq!(m.as_str(), "\\[");
        assert_eq!(m.start(), 2);
    }

    #[test]
    fn test_equation_environment_is_a_declared_rule() {
        let m = GRAMMAR
            .start_pattern()
            .find("\\begin{equation}x\\end{equation}")
            .unwrap();
        assert_eq!(m.as_str(), "\\begin{equation}");
        let rule = GRAMMAR.rule(m.as_str()).unwrap();
        assert_eq!(rule.mode, MathMode::Display);
        assert_eq!(rule.end, "\\end{equation}");
    }

    #[test]
    fn test_generic_environment_opener_matches() {
        let m = GRAMMAR.start_pattern().find("\\begin{aligned}").unwrap();
        assert_eq!(m.as_str(), "\\begin{aligned}");
        assert!(GRAMMAR.rule(m.as_str()).is_none());
    }

    #[test]
    fn test_escaped_dollar_matches_whole_escape() {
        let m = GRAMMAR.start_pattern().find("price \\$5").unwrap();
        assert_eq!(m.as_str(), "\\$");
    }

    #[test]
    fn test_reference_forms_match() {
        let m = GRAMMAR.start_pattern().find("see \\ref{fig:one}").unwrap();
        assert_eq!(m.as_str(), "\\ref{fig:one}");
        let m = GRAMMAR.start_pattern().find("see \\eqref{eq2}").unwrap();
        assert_eq!(m.as_str(), "\\eqref{eq2}");
    }

    #[test]
    fn test_end_pattern_alternatives() {
        let pattern = end_pattern("$");
        let pieces: Vec<&str> = pattern.find_iter(r"a \$ {b} $").map(|m| m.as_str()).collect();
        assert_eq!(pieces, vec![r"\$", "{", "}", "$"]);
    }
}
