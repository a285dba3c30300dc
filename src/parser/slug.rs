use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

/// Derive a URL-safe routing key from free text.
///
/// Accents are folded (`"Mérida"` → `"merida"`), whitespace becomes `-`,
/// anything outside `[a-z0-9_-]` is dropped. Returns an empty string when
/// nothing survives.
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let hyphenated = WHITESPACE_RE.replace_all(folded.trim(), "-");
    let cleaned = NON_WORD_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHENS_RE.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

/// `slugify`, or `fallback` when the text reduces to nothing.
pub fn slugify_or(text: &str, fallback: impl FnOnce() -> String) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(slug: &str) -> bool {
        slug.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
            && !slug.starts_with('-')
            && !slug.ends_with('-')
            && !slug.contains("--")
    }

    #[test]
    fn simple_title() {
        assert_eq!(slugify("Villa Azul"), "villa-azul");
        assert_eq!(slugify("Casa del Mar"), "casa-del-mar");
    }

    #[test]
    fn accents_folded() {
        assert_eq!(slugify("Casa Mérida Centro"), "casa-merida-centro");
        assert_eq!(slugify("Ático en Chicxulub Puerto"), "atico-en-chicxulub-puerto");
        assert_eq!(slugify("Niño"), "nino");
    }

    #[test]
    fn punctuation_and_runs() {
        assert_eq!(slugify("  Villa   Azul!! "), "villa-azul");
        assert_eq!(slugify("Casa - Mar"), "casa-mar");
        assert_eq!(slugify("¡Oferta! - Loft"), "oferta-loft");
        assert_eq!(slugify("Lote #12 / Sisal"), "lote-12-sisal");
    }

    #[test]
    fn empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("¿?¡! — ★"), "");
    }

    #[test]
    fn fallback_used_only_when_empty() {
        assert_eq!(slugify_or("", || "property-7".into()), "property-7");
        assert_eq!(slugify_or("★", || "property-7".into()), "property-7");
        assert_eq!(slugify_or("Sisal", || "property-7".into()), "sisal");
    }

    #[test]
    fn alphabet_and_determinism() {
        let inputs = [
            "Villa Azul",
            "- leading and trailing -",
            "Ñandú   Ñoño",
            "Precio: 1.200.000 €",
            "日本の家",
            "tab\tand\nnewline",
            "under_score Casa",
            "---",
        ];
        for input in inputs {
            let slug = slugify(input);
            assert!(is_clean(&slug), "{:?} -> {:?}", input, slug);
            assert_eq!(slug, slugify(input));
        }
    }
}
