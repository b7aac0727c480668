//! Text cleanup applied to any input or gazetteer entry before comparison.

/// Words that appear as optional suffixes in source data ("Quezon City",
/// "Municipality of Biñan") and carry no matching signal on their own.
const SUFFIX_WORDS: [&str; 3] = ["city", "municipality", "province"];

/// Normalize free-text place input for comparison.
///
/// Lowercases, strips everything except ASCII letters, digits, whitespace,
/// and hyphens, collapses whitespace runs, and removes the standalone words
/// "city", "municipality", and "province" (word-boundary removal, not
/// substring removal). Idempotent: `normalize(normalize(s)) == normalize(s)`.
///
/// Diacritics are not folded at runtime; the gazetteer supplies stripped
/// variants (e.g. both "biñan" and "binan") instead.
#[must_use]
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !SUFFIX_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Makati  "), "makati");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(normalize("san   juan\tdel  monte"), "san juan del monte");
    }

    #[test]
    fn strips_punctuation_but_keeps_hyphens() {
        assert_eq!(normalize("Kalookan (North)"), "kalookan north");
        assert_eq!(normalize("Ba-yan"), "ba-yan");
    }

    #[test]
    fn removes_standalone_suffix_words() {
        assert_eq!(normalize("Quezon City"), "quezon");
        assert_eq!(normalize("Municipality of Pateros"), "of pateros");
        assert_eq!(normalize("Province of Cavite"), "of cavite");
    }

    #[test]
    fn does_not_remove_suffix_substrings() {
        // "citystate" contains "city" but is not a standalone word.
        assert_eq!(normalize("citystate"), "citystate");
        assert_eq!(normalize("intercity"), "intercity");
    }

    #[test]
    fn empty_and_whitespace_only_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t  "), "");
        assert_eq!(normalize("City"), "");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let samples = [
            "Quezon City",
            "  DAVAO   city ",
            "Biñan",
            "municipality of san-pedro",
            "...",
            "",
            "Las Piñas City!!!",
            "metro   manila province",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
