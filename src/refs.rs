//! Figure cross-reference resolution.
//!
//! The typesetting engine knows nothing about the host document's figure
//! numbering, so references that survive into a math span are wrapped in a
//! sentinel marker before rendering and substituted back out of the engine's
//! output afterwards. The marker is a long random-looking token that cannot
//! plausibly collide with genuine document content.

use std::borrow::Cow;

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Figure numbers by label, supplied by the host document model.
pub type FigureNumbers = FxHashMap<String, usize>;

/// Marker pair carried through the engine around a reference label.
pub const REF_MARKER: &str = "==REF==yzskvUeunVc==";
pub const REF_MARKER_END: &str = "==ENDREF==";

lazy_static! {
    static ref REF_COMMAND: Regex =
        Regex::new(r"\\(eq)?ref\{([^}]*)\}").expect("reference command pattern is valid");
    static ref REF_PLACEHOLDER: Regex = Regex::new(&format!(
        "{}(.*?){}",
        regex::escape(REF_MARKER),
        regex::escape(REF_MARKER_END)
    ))
    .expect("placeholder pattern is valid");
    // The engine narrates the wrapping \text{...} as "start text, ..., end
    // text,"; the spoken substitution swallows that scaffolding too.
    static ref SPOKEN_REF_PLACEHOLDER: Regex = Regex::new(&format!(
        "start text, {}(.*?){}, end text,",
        regex::escape(REF_MARKER),
        regex::escape(REF_MARKER_END)
    ))
    .expect("spoken placeholder pattern is valid");
}

/// Wrap every `\ref`/`\eqref` still present in a math span with the
/// placeholder marker, so the engine carries the label through as text.
pub fn wrap_reference_commands(latex: &str) -> Cow<'_, str> {
    REF_COMMAND.replace_all(latex, |caps: &Captures<'_>| {
        format!("\\text{{{REF_MARKER}{}{REF_MARKER_END}}}", &caps[2])
    })
}

/// Resolve a label to its formatted figure string, or `if_missing` when the
/// label has no known number. `formatted` selects the emphasized markup used
/// in visual output over the plain text used in spoken output.
pub fn format_reference(
    label: &str,
    if_missing: &str,
    figures: &FigureNumbers,
    formatted: bool,
) -> String {
    if !label.is_empty() {
        // Figures numbered 0 are unnumbered; they resolve as unknown.
        if let Some(&number) = figures.get(label).filter(|&&n| n != 0) {
            let figure = format!("Figure&nbsp;{number}");
            return if formatted {
                format!("<strong class=\"text-theme figure-reference\">{figure}</strong>")
            } else {
                figure
            };
        }
    }
    if_missing.to_string()
}

/// Substitute every placeholder in rendered visual markup.
pub fn resolve_placeholders(text: &str, figures: &FigureNumbers, formatted: bool) -> String {
    REF_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let label = &caps[1];
            format_reference(label, &format!("unknown reference {label}"), figures, formatted)
        })
        .into_owned()
}

/// Substitute every placeholder in a spoken description, including the
/// narration scaffolding around it.
pub fn resolve_spoken_placeholders(text: &str, figures: &FigureNumbers) -> String {
    SPOKEN_REF_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let label = &caps[1];
            format_reference(label, &format!("unknown reference {label}"), figures, false)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figures() -> FigureNumbers {
        let mut figures = FigureNumbers::default();
        figures.insert("fig:one".to_string(), 1);
        figures.insert("fig:two".to_string(), 2);
        figures
    }

    #[test]
    fn test_wrap_reference_commands() {
        let wrapped = wrap_reference_commands("x = \\ref{fig:one}");
        assert_eq!(
            wrapped,
            format!("x = \\text{{{REF_MARKER}fig:one{REF_MARKER_END}}}")
        );
    }

    #[test]
    fn test_wrap_handles_eqref() {
        let wrapped = wrap_reference_commands("\\eqref{eq:a} + \\ref{eq:b}");
        assert_eq!(
            wrapped,
            format!(
                "\\text{{{REF_MARKER}eq:a{REF_MARKER_END}}} + \\text{{{REF_MARKER}eq:b{REF_MARKER_END}}}"
            )
        );
    }

    #[test]
    fn test_wrap_leaves_plain_latex_borrowed() {
        assert!(matches!(
            wrap_reference_commands("x + y"),
            Cow::Borrowed("x + y")
        ));
    }

    #[test]
    fn test_format_known_reference() {
        assert_eq!(
            format_reference("fig:two", "missing", &figures(), true),
            "<strong class=\"text-theme figure-reference\">Figure&nbsp;2</strong>"
        );
        assert_eq!(
            format_reference("fig:two", "missing", &figures(), false),
            "Figure&nbsp;2"
        );
    }

    #[test]
    fn test_format_unknown_reference_uses_fallback() {
        assert_eq!(
            format_reference("nope", "unknown reference nope", &figures(), true),
            "unknown reference nope"
        );
    }

    #[test]
    fn test_unnumbered_figure_resolves_as_unknown() {
        let mut figures = figures();
        figures.insert("fig:zero".to_string(), 0);
        assert_eq!(
            format_reference("fig:zero", "unknown reference fig:zero", &figures, true),
            "unknown reference fig:zero"
        );
    }

    #[test]
    fn test_resolve_placeholders_in_markup() {
        let markup = format!("<span>{REF_MARKER}fig:one{REF_MARKER_END}</span>");
        assert_eq!(
            resolve_placeholders(&markup, &figures(), true),
            "<span><strong class=\"text-theme figure-reference\">Figure&nbsp;1</strong></span>"
        );
    }

    #[test]
    fn test_resolve_unknown_placeholder() {
        let markup = format!("{REF_MARKER}mystery{REF_MARKER_END}");
        assert_eq!(
            resolve_placeholders(&markup, &figures(), true),
            "unknown reference mystery"
        );
    }

    #[test]
    fn test_resolve_spoken_placeholders_swallows_scaffolding() {
        let spoken = format!("x, equals, start text, {REF_MARKER}fig:two{REF_MARKER_END}, end text,");
        assert_eq!(
            resolve_spoken_placeholders(&spoken, &figures()),
            "x, equals, Figure&nbsp;2"
        );
    }
}
