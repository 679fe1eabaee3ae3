//! Name normalization for matching task names against diagram labels.
//!
//! Host task names and diagram labels are typed by different people, so
//! accents and letter case are ignored: "Tarefa Ação" matches "tarefa acao".
//! Matching stays exact on the normalized form.

use unicode_normalization::UnicodeNormalization;

/// NFD, drop combining diacritical marks (U+0300..=U+036F), lowercase, trim
/// the way `String.prototype.trim` does.
pub fn normalize_name(name: &str) -> String {
    let stripped = strip_marks(name);
    // Lowercasing can reintroduce decomposable characters (e.g. U+0130), so
    // strip once more to keep the function idempotent.
    strip_marks(&stripped.to_lowercase())
        .trim_matches(is_js_whitespace)
        .to_string()
}

fn strip_marks(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_diacritic(*c)).collect()
}

/// ECMAScript WhiteSpace + LineTerminator: Unicode White_Space plus U+FEFF,
/// minus U+0085 which JS does not trim.
fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
