//! Span renderer: turns located math spans into accessible markup.
//!
//! Each span is entity-decoded, rewritten for legacy syntax, rendered twice
//! by the external engine (visual markup plus a spoken description), has its
//! figure references substituted, and is patched for a known engine defect
//! before the accessibility content is spliced in. Every engine failure is
//! caught at its call site; nothing here propagates an error to the caller.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::engine::{EngineOptions, MathEngine};
use crate::grammar::MathMode;
use crate::macros::{select_bindings, BooleanNotation};
use crate::refs::{
    format_reference, resolve_placeholders, resolve_spoken_placeholders, wrap_reference_commands,
    FigureNumbers,
};
use crate::scanner::{scan, ScanEvent};

/// Per-document rendering preferences, as supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Boolean operator dialect; unset falls back to logic notation.
    pub boolean_notation: Option<BooleanNotation>,
    /// Whether boolean-algebra macros apply at all for this deployment.
    pub boolean_macros: bool,
    /// Development aid: expose the spoken description as hover text.
    pub screen_reader_hover_text: bool,
    /// Splice structured markup instead of the hidden spoken label.
    pub prefer_mathml: bool,
}

lazy_static! {
    // Placeholder boxes for interactive cloze content dropped into math,
    // e.g. [drop-zone] or [drop-zone|i-2 w-40 h-20].
    static ref DROP_ZONE: Regex =
        Regex::new(r"\[drop-zone(\|(i-\d+?)?(w-\d+?)?(h-\d+?)?)?\]")
            .expect("drop zone pattern is valid");
    static ref WHITESPACE_RUNS: Regex =
        Regex::new(r"\s\s+").expect("whitespace pattern is valid");
}

/// Rewrite legacy syntax the engine no longer accepts.
fn munge(latex: &str) -> String {
    latex
        .replace("eqnarray", "aligned")
        .replace("\\newline", "\\\\")
}

/// Renders every math span in a document, leaving other content untouched.
pub struct MathRenderer<'e> {
    engine: &'e dyn MathEngine,
    options: RenderOptions,
    figures: FigureNumbers,
}

impl<'e> MathRenderer<'e> {
    pub fn new(engine: &'e dyn MathEngine) -> Self {
        MathRenderer {
            engine,
            options: RenderOptions::default(),
            figures: FigureNumbers::default(),
        }
    }

    /// Set rendering preferences.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Supply the host document's figure numbering.
    pub fn with_figure_numbers(mut self, figures: FigureNumbers) -> Self {
        self.figures = figures;
        self
    }

    /// Replace every math span in `html` with rendered markup. Literal
    /// content passes through unchanged; escaped dollars become literal
    /// dollars and top-level references resolve without the engine.
    pub fn render_document(&self, html: &str) -> String {
        let mut output = String::with_capacity(html.len());
        for event in scan(html) {
            match event {
                ScanEvent::Text(text) => output.push_str(text),
                ScanEvent::EscapedDollar => output.push('$'),
                ScanEvent::Reference { raw, label } => {
                    output.push_str(&format_reference(
                        label,
                        &format!("unknown reference {raw}"),
                        &self.figures,
                        true,
                    ));
                }
                ScanEvent::Math(span) => {
                    output.push_str(&self.render_span(span.latex, span.mode));
                }
            }
        }
        output
    }

    /// Render one located span into its inline replacement markup.
    pub fn render_span(&self, latex: &str, mode: MathMode) -> String {
        // The surrounding document may have entity-encoded the source.
        let decoded = html_escape::decode_html_entities(latex);
        let munged = munge(&decoded);
        let wrapped = wrap_reference_commands(&munged);

        let bindings = select_bindings(self.options.boolean_notation, self.options.boolean_macros);
        let engine_options = EngineOptions {
            display_mode: mode == MathMode::Display,
            macros: bindings,
            throw_on_error: false,
            strict: false,
            color_is_text_color: true,
        };

        let mut markup = self.engine.render_visual(&wrapped, &engine_options);
        markup = resolve_placeholders(&markup, &self.figures, true);

        let spoken = match self
            .engine
            .render_accessible_description(&wrapped, &engine_options)
        {
            Ok(description) => {
                // Trailing comma/full stop for a pause in speech.
                let pause = if engine_options.display_mode { ". &nbsp;" } else { "," };
                Some(resolve_spoken_placeholders(
                    &format!("{description}{pause}"),
                    &self.figures,
                ))
            }
            Err(error) => {
                tracing::warn!(%error, "accessible description failed, dropping the enhancement");
                None
            }
        };

        // The engine styles phantom elements fully transparent but leaves
        // them visible to assistive technology; hide them explicitly.
        markup = markup.replace("color:transparent;", "color:transparent;visibility:hidden;");

        match spoken.as_deref() {
            Some(description) if !self.options.prefer_mathml => {
                markup = markup.replacen(
                    "<span class=\"katex\">",
                    &format!(
                        "<span class=\"katex\"><span class=\"visually-hidden\" aria-label=\"{description}\" role=\"text\"></span>"
                    ),
                    1,
                );
            }
            _ => {
                // No spoken description, or structured output preferred:
                // splice the engine's MathML-style markup in instead.
                let narratable = DROP_ZONE.replace_all(&wrapped, "clickable drop zone");
                let structured = self
                    .engine
                    .render_structured_markup(&narratable, &engine_options)
                    .replacen("class=\"katex\"", "class=\"katex-mathml\"", 1);
                markup = markup.replacen(
                    "<span class=\"katex\">",
                    &format!("<span class=\"katex\">{structured}"),
                    1,
                );
            }
        }

        if self.options.screen_reader_hover_text {
            let title = match spoken.as_deref() {
                Some(description) => {
                    let flat = WHITESPACE_RUNS
                        .replace_all(&description.replace(',', ""), " ")
                        .into_owned();
                    format!("Screenreader text: {flat}")
                }
                None => "Accessible with a screenreader that supports MathML".to_string(),
            };
            markup = markup.replacen(
                "<span class=\"katex-html\"",
                &format!("<span class=\"katex-html\" title=\"{title}\""),
                1,
            );
        }

        markup
    }
}

/// Render every math span in `html` in one call.
pub fn render_document_math(
    html: &str,
    engine: &dyn MathEngine,
    options: RenderOptions,
    figure_numbers: FigureNumbers,
) -> String {
    MathRenderer::new(engine)
        .with_options(options)
        .with_figure_numbers(figure_numbers)
        .render_document(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_munge_rewrites_legacy_syntax() {
        assert_eq!(
            munge("\\begin{eqnarray}a\\end{eqnarray}"),
            "\\begin{aligned}a\\end{aligned}"
        );
        assert_eq!(munge("a\\newline b"), "a\\\\ b");
        assert_eq!(munge("x + y"), "x + y");
    }

    #[test]
    fn test_drop_zone_pattern_variants() {
        assert!(DROP_ZONE.is_match("[drop-zone]"));
        assert!(DROP_ZONE.is_match("[drop-zone|i-2w-40h-20]"));
        assert!(DROP_ZONE.is_match("[drop-zone|w-50]"));
        assert!(!DROP_ZONE.is_match("[dropzone]"));
    }
}
