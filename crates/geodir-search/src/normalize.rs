//! Case and diacritic insensitive text normalization.

use unicode_normalization::UnicodeNormalization;

/// Strip diacritics, lower-case and trim.
///
/// Text is decomposed (NFD) and combining marks in U+0300..U+036F are
/// dropped, so "Épicure" and "epicure" normalize identically.
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.to_lowercase().trim().to_string()
}

/// Normalize a query and split it on runs of whitespace.
///
/// Empty tokens are dropped; blank input yields no tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    normalize(query)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[inline]
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("Épicure Ingénierie"), "epicure ingenierie");
        assert_eq!(normalize("Ithéa Conseil"), "ithea conseil");
        assert_eq!(normalize("Collectivités"), "collectivites");
        assert_eq!(normalize("Nuage Café"), "nuage cafe");
        assert_eq!(normalize("ÇA"), "ca");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  Jean \t"), "jean");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn tokenize_splits_on_whitespace_runs() {
        assert_eq!(tokenize("  Jean   Épi\tcure "), vec!["jean", "epi", "cure"]);
    }

    #[test]
    fn tokenize_keeps_punctuation() {
        assert_eq!(tokenize("Sud-Ouest, 2024"), vec!["sud-ouest,", "2024"]);
    }
}
