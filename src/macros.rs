//! Fixed macro substitution tables.
//!
//! Three prebuilt dictionaries are compiled into the binary: the shared base
//! set and two boolean-algebra overlays, one per notation dialect. Each is
//! flattened once into the form the typesetting engine expects; nothing is
//! mutated per request.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// A macro body: a literal replacement or a parameterized template with its
/// arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroDef {
    Literal(&'static str),
    Template(&'static str, u8),
}

/// Mathematics, chemistry and set-theory macros shared by every deployment.
pub static BASE_MACROS: phf::Map<&'static str, MacroDef> = phf_map! {
    // Mathematics:
    "quantity" => MacroDef::Template("{#1}\\,{\\rm{#2}}", 2),
    "valuedef" => MacroDef::Template("{#1}={\\quantity{#2}{#3}}", 3),
    "vtr" => MacroDef::Template("{\\underline{\\boldsymbol{#1}}}", 1),
    "eqalign" => MacroDef::Template("\\begin{aligned}#1\\end{aligned}", 1),
    "d" => MacroDef::Literal("\\mathrm{d}"),
    "vari" => MacroDef::Template("#1", 1),
    "s" => MacroDef::Template("_{\\sf{#1}}", 1),
    "half" => MacroDef::Template("\\frac{1}{2}", 0),
    "third" => MacroDef::Template("\\frac{1}{3}", 0),
    "quarter" => MacroDef::Template("\\frac{1}{4}", 0),
    "eighth" => MacroDef::Template("\\frac{1}{8}", 0),
    "e" => MacroDef::Template("\\textrm{e}", 0),
    "units" => MacroDef::Template("\\rm{#1}", 1),
    // Chemistry; the source is entity-decoded before rendering, so the bare
    // code point is enough here.
    "standardstate" => MacroDef::Template("\u{29B5}", 0),
    // Set theory:
    "N" => MacroDef::Literal("\\mathbb{N}"),
    "Z" => MacroDef::Literal("\\mathbb{Z}"),
    "Q" => MacroDef::Literal("\\mathbb{Q}"),
    "R" => MacroDef::Literal("\\mathbb{R}"),
    "C" => MacroDef::Literal("\\mathbb{C}"),
};

/// Boolean algebra in symbolic-logic notation. The capitalized names are
/// canonical; the lowercase forms are legacy aliases.
pub static LOGIC_MACROS: phf::Map<&'static str, MacroDef> = phf_map! {
    "true" => MacroDef::Literal("\\mathbf{T}"),
    "false" => MacroDef::Literal("\\mathbf{F}"),
    "and" => MacroDef::Template("{#1} \\land {#2}", 2),
    "or" => MacroDef::Template("{#1} \\lor {#2}", 2),
    "not" => MacroDef::Template("\\lnot{#1}", 1),
    "bracketnot" => MacroDef::Template("\\lnot{(#1)}", 1),
    "xor" => MacroDef::Template("{#1} \\veebar {#2}", 2),
    // Equals rather than the more correct \equiv, which renders poorly at
    // small sizes.
    "equivalent" => MacroDef::Literal("="),
    "True" => MacroDef::Literal("\\mathbf{T}"),
    "False" => MacroDef::Literal("\\mathbf{F}"),
    "And" => MacroDef::Template("{#1} \\land {#2}", 2),
    "Or" => MacroDef::Template("{#1} \\lor {#2}", 2),
    "Not" => MacroDef::Template("\\lnot{#1}", 1),
    "BracketNot" => MacroDef::Template("\\lnot{(#1)}", 1),
    "Xor" => MacroDef::Template("{#1} \\veebar {#2}", 2),
    "Equivalent" => MacroDef::Literal("="),
};

/// Boolean algebra in engineering notation. `bracketnot` is identical to
/// `not` in this dialect.
pub static ENGINEERING_MACROS: phf::Map<&'static str, MacroDef> = phf_map! {
    "true" => MacroDef::Literal("1"),
    "false" => MacroDef::Literal("0"),
    "and" => MacroDef::Template("{#1} \\cdot {#2}", 2),
    "or" => MacroDef::Template("{#1} + {#2}", 2),
    "not" => MacroDef::Template("\\overline{#1}", 1),
    "bracketnot" => MacroDef::Template("\\overline{#1}", 1),
    "xor" => MacroDef::Template("{#1} \\oplus {#2}", 2),
    "equivalent" => MacroDef::Literal("="),
    "True" => MacroDef::Literal("1"),
    "False" => MacroDef::Literal("0"),
    "And" => MacroDef::Template("{#1} \\cdot {#2}", 2),
    "Or" => MacroDef::Template("{#1} + {#2}", 2),
    "Not" => MacroDef::Template("\\overline{#1}", 1),
    "BracketNot" => MacroDef::Template("\\overline{#1}", 1),
    "Xor" => MacroDef::Template("{#1} \\oplus {#2}", 2),
    "Equivalent" => MacroDef::Literal("="),
};

/// Which symbol set represents boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanNotation {
    /// Symbolic-logic notation: `\land`, `\lor`, `\lnot`.
    Math,
    /// Engineering notation: dot, plus, overline.
    Eng,
}

/// Flattened substitution bindings in the form the engine expects: command
/// escape prefixed to each name, arity dropped (the engine infers parameters
/// from the `#n` tokens in the body).
pub type MacroBindings = IndexMap<String, String>;

fn flatten(tables: &[&phf::Map<&'static str, MacroDef>]) -> MacroBindings {
    let mut bindings = MacroBindings::default();
    for table in tables {
        for (name, def) in table.entries() {
            let body = match *def {
                MacroDef::Literal(body) => body,
                MacroDef::Template(body, _) => body,
            };
            bindings.insert(format!("\\{name}"), body.to_string());
        }
    }
    bindings
}

lazy_static! {
    /// Base table only.
    pub static ref BASE_BINDINGS: MacroBindings = flatten(&[&BASE_MACROS]);
    /// Base plus symbolic-logic boolean notation.
    pub static ref LOGIC_BINDINGS: MacroBindings =
        flatten(&[&BASE_MACROS, &LOGIC_MACROS]);
    /// Base plus engineering boolean notation.
    pub static ref ENGINEERING_BINDINGS: MacroBindings =
        flatten(&[&BASE_MACROS, &ENGINEERING_MACROS]);
}

/// Select the bindings for a deployment. `boolean_macros` gates the overlays
/// entirely; with it set, an unset or unknown dialect falls back to the
/// logic notation.
pub fn select_bindings(
    notation: Option<BooleanNotation>,
    boolean_macros: bool,
) -> &'static MacroBindings {
    if !boolean_macros {
        return &BASE_BINDINGS;
    }
    match notation {
        Some(BooleanNotation::Eng) => &ENGINEERING_BINDINGS,
        _ => &LOGIC_BINDINGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_bindings_have_escaped_names() {
        assert_eq!(
            BASE_BINDINGS.get("\\quantity").map(String::as_str),
            Some("{#1}\\,{\\rm{#2}}")
        );
        assert_eq!(
            BASE_BINDINGS.get("\\d").map(String::as_str),
            Some("\\mathrm{d}")
        );
    }

    #[test]
    fn test_domain_flag_gates_boolean_macros() {
        let bindings = select_bindings(Some(BooleanNotation::Eng), false);
        assert!(bindings.get("\\and").is_none());
        assert!(bindings.get("\\quantity").is_some());
    }

    #[test]
    fn test_engineering_dialect_selected() {
        let bindings = select_bindings(Some(BooleanNotation::Eng), true);
        assert_eq!(
            bindings.get("\\and").map(String::as_str),
            Some("{#1} \\cdot {#2}")
        );
        assert_eq!(bindings.get("\\true").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_math_dialect_selected() {
        let bindings = select_bindings(Some(BooleanNotation::Math), true);
        assert_eq!(
            bindings.get("\\and").map(String::as_str),
            Some("{#1} \\land {#2}")
        );
        assert_eq!(
            bindings.get("\\True").map(String::as_str),
            Some("\\mathbf{T}")
        );
    }

    #[test]
    fn test_unset_dialect_falls_back_to_logic_notation() {
        let bindings = select_bindings(None, true);
        assert_eq!(
            bindings.get("\\xor").map(String::as_str),
            Some("{#1} \\veebar {#2}")
        );
    }

    #[test]
    fn test_overlays_keep_the_base_table() {
        for bindings in [&*LOGIC_BINDINGS, &*ENGINEERING_BINDINGS] {
            assert!(bindings.get("\\half").is_some());
            assert!(bindings.get("\\N").is_some());
        }
    }
}
