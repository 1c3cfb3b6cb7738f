//! Mathspan: locate embedded LaTeX math spans and render them accessibly.
//!
//! The crate scans mixed prose/markup documents for delimited mathematical
//! spans (`$...$`, `\(...\)`, `$$...$$`, `\[...\]`,
//! `\begin{NAME}...\end{NAME}`), renders each through an external
//! KaTeX-compatible engine, and assembles replacement markup carrying both
//! the visual output and a screen-reader-friendly description. Content
//! outside math spans passes through unchanged; unmatched delimiters and
//! unknown figure references degrade to readable text instead of failing.
//!
//! The typesetting engine itself is a collaborator behind the
//! [`MathEngine`] trait; this crate owns span location, macro table
//! selection, figure cross-reference resolution and the accessibility
//! splicing around it.
//!
//! ```no_run
//! use mathspan::{render_document_math, FigureNumbers, MathEngine, RenderOptions};
//!
//! fn render(engine: &dyn MathEngine, page: &str) -> String {
//!     render_document_math(page, engine, RenderOptions::default(), FigureNumbers::default())
//! }
//! ```

pub mod engine;
pub mod grammar;
pub mod macros;
pub mod refs;
pub mod render;
pub mod scanner;

// Re-export commonly used items
pub use engine::{EngineError, EngineOptions, MathEngine};
pub use grammar::{DelimiterGrammar, DelimiterRule, MathMode, GRAMMAR};
pub use macros::{select_bindings, BooleanNotation, MacroBindings, MacroDef};
pub use refs::FigureNumbers;
pub use render::{render_document_math, MathRenderer, RenderOptions};
pub use scanner::{scan, ScanEvent, SpanMatch, SpanScanner};
