//! Small text transformations shared by the renderers.

use std::sync::OnceLock;

use regex::Regex;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn inline_code() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("static regex"))
}

fn bold() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex"))
}

/// Turn Markdown `` `code` `` spans into `<code>` elements.
///
/// Expects already-escaped input.
pub fn code_spans_to_html(s: &str) -> String {
    inline_code().replace_all(s, "<code>$1</code>").into_owned()
}

/// Turn Markdown `**bold**` runs into `<b>` elements.
///
/// Expects already-escaped input.
pub fn bold_to_html(s: &str) -> String {
    bold().replace_all(s, "<b>$1</b>").into_owned()
}

/// Replace Romanian diacritics with their ASCII base letters.
///
/// Used when no Unicode-capable font is available for the print document.
pub fn transliterate(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'Ă' | 'Â' => 'A',
            'î' => 'i',
            'Î' => 'I',
            'ș' | 'ş' => 's',
            'Ș' | 'Ş' => 'S',
            'ț' | 'ţ' => 't',
            'Ț' | 'Ţ' => 'T',
            other => other,
        })
        .collect()
}
