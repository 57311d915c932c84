//! Accent- and case-insensitive text folding for search.

use unicode_normalization::UnicodeNormalization;

/// Combining Diacritical Marks block.
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, decompose (NFD) and drop combining diacritics.
///
/// `normalize(normalize(s)) == normalize(s)` for every `s`.
pub fn normalize(s: &str) -> String {
    s.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_case_and_accents() {
        assert_eq!(normalize("Éxodo"), "exodo");
        assert_eq!(normalize("Nehemías"), "nehemias");
        assert_eq!(normalize("Nahúm"), "nahum");
        assert_eq!(normalize("AÑO"), "ano");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Éxodo", "1 Crónicas 12", "İstanbul", "", "ǅemal", "Ḿ"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(normalize("genesis 1"), "genesis 1");
    }
}
