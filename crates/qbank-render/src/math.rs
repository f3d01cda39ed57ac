//! LaTeX math to plain Unicode text.
//!
//! Display math (`$$...$$`) is handled before inline math (`$...$`). Inside
//! an expression, fractions and roots are linearized, known commands become
//! their Unicode symbol, and super/subscripts are parenthesized.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const SYMBOLS: &[(&str, &str)] = &[
    ("pm", "±"),
    ("mp", "∓"),
    ("times", "×"),
    ("div", "÷"),
    ("cdot", "·"),
    ("Delta", "Δ"),
    ("delta", "δ"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("theta", "θ"),
    ("pi", "π"),
    ("sigma", "σ"),
    ("omega", "ω"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("epsilon", "ε"),
    ("sum", "Σ"),
    ("prod", "Π"),
    ("int", "∫"),
    ("infty", "∞"),
    ("le", "≤"),
    ("leq", "≤"),
    ("ge", "≥"),
    ("geq", "≥"),
    ("ne", "≠"),
    ("neq", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("subset", "⊂"),
    ("supset", "⊃"),
    ("in", "∈"),
    ("notin", "∉"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("emptyset", "∅"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("leftrightarrow", "↔"),
    ("uparrow", "↑"),
    ("downarrow", "↓"),
];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("static regex"))
        }
    };
}

static_regex!(display_math, r"\$\$([^$]+)\$\$");
static_regex!(inline_math, r"\$([^$]+)\$");
static_regex!(frac, r"\\frac\{([^}]+)\}\{([^}]+)\}");
static_regex!(sqrt, r"\\sqrt\{([^}]+)\}");
static_regex!(command, r"\\([a-zA-Z]+)");
static_regex!(superscript_group, r"\^\{([^}]+)\}");
static_regex!(superscript_char, r"\^([a-zA-Z0-9])");
static_regex!(subscript_group, r"_\{([^}]+)\}");
static_regex!(subscript_char, r"_([a-zA-Z0-9])");
static_regex!(braces, r"[{}]");

fn symbol(name: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, symbol)| *symbol)
}

/// Convert one math expression (without its `$` delimiters).
pub fn convert_expression(expr: &str) -> String {
    let s = frac().replace_all(expr, "($1)/($2)");
    let s = sqrt().replace_all(&s, "√($1)");
    let s = command().replace_all(&s, |caps: &Captures| {
        symbol(&caps[1]).map_or_else(|| caps[1].to_string(), str::to_string)
    });
    let s = superscript_group().replace_all(&s, "^($1)");
    let s = superscript_char().replace_all(&s, "^($1)");
    let s = subscript_group().replace_all(&s, "_($1)");
    let s = subscript_char().replace_all(&s, "_($1)");
    braces().replace_all(&s, "").into_owned()
}

/// Convert every `$$...$$` and `$...$` span in `text`.
///
/// Display math is placed on its own line.
pub fn convert_math(text: &str) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    let s = display_math().replace_all(text, |caps: &Captures| {
        format!("\n{}\n", convert_expression(&caps[1]))
    });
    inline_math()
        .replace_all(&s, |caps: &Captures| convert_expression(&caps[1]))
        .into_owned()
}
