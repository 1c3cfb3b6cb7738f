//! External typesetting engine interface.
//!
//! The crate owns no typesetting logic of its own. Implementations wrap a
//! KaTeX-compatible renderer; all three capabilities are synchronous and
//! side-effect-free from this crate's perspective.

use std::fmt;

use crate::macros::MacroBindings;

/// Options handed to the engine for every render call.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions<'m> {
    /// Display (block) vs inline layout.
    pub display_mode: bool,
    /// Macro substitutions applied before layout.
    pub macros: &'m MacroBindings,
    /// Whether malformed input may raise. Always false here: the engine must
    /// degrade in place instead.
    pub throw_on_error: bool,
    /// Reject constructs outside strict LaTeX.
    pub strict: bool,
    /// Treat `\color` as text color rather than group color.
    pub color_is_text_color: bool,
}

/// The external math typesetting engine.
pub trait MathEngine {
    /// Produce visual markup. Must return *some* string even for malformed
    /// input; never fails.
    fn render_visual(&self, latex: &str, options: &EngineOptions<'_>) -> String;

    /// Produce a spoken-form description for assistive technology. May fail
    /// on malformed or unsupported input; callers catch and degrade.
    fn render_accessible_description(
        &self,
        latex: &str,
        options: &EngineOptions<'_>,
    ) -> Result<String, EngineError>;

    /// Produce the alternate structured accessibility markup (MathML-style),
    /// usable in place of the hidden-text-label approach.
    fn render_structured_markup(&self, latex: &str, options: &EngineOptions<'_>) -> String;
}

/// Error from the engine's fallible capabilities.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// The input uses constructs the capability does not support.
    Unsupported { message: String },
    /// The capability failed while rendering.
    Render { message: String },
}

impl EngineError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        EngineError::Unsupported {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        EngineError::Render {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unsupported { message } => {
                write!(f, "Unsupported input: {}", message)
            }
            EngineError::Render { message } => write!(f, "Render error: {}", message),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::unsupported("\\foo is not a command");
        assert!(err.to_string().contains("Unsupported input"));
        assert!(err.to_string().contains("\\foo"));

        let err = EngineError::render("engine panicked");
        assert!(err.to_string().contains("Render error"));
    }
}
