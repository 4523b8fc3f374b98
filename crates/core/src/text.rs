use deunicode::deunicode_char;

/// Transliterates non-ASCII letters to ASCII (`á` to `a`, `Ł` to `L`,
/// `ß` to `ss`). Punctuation, digits and unmapped characters pass through.
pub fn fold_diacritics(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match deunicode_char(ch) {
            Some(folded) if !ch.is_ascii() && ch.is_alphabetic() => out.push_str(folded),
            _ => out.push(ch),
        }
    }
    out
}

pub fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased, diacritic-free form used for keyword matching.
pub fn match_key(input: &str) -> String {
    fold_diacritics(input).to_lowercase()
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Like [`contains_any`] but only matches whole words, so `hora` does not
/// fire on `ahora`.
pub fn contains_word(haystack: &str, words: &[&str]) -> bool {
    haystack
        .split(|ch: char| !ch.is_alphanumeric())
        .any(|token| words.contains(&token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_spanish_accents_and_enye() {
        assert_eq!(fold_diacritics("María Núñez"), "Maria Nunez");
        assert_eq!(fold_diacritics("Habitación güemes"), "Habitacion guemes");
        assert_eq!(match_key("¿Qué HABITACIÓN?"), "¿que habitacion?");
    }

    #[test]
    fn folds_letters_beyond_latin_1() {
        let folded = fold_diacritics("Łukasz Šimek Dvořák Kőrösi Čapek");
        assert_eq!(folded, "Lukasz Simek Dvorak Korosi Capek");
        assert!(folded.is_ascii());
        assert_eq!(fold_diacritics("Straße"), "Strasse");
    }

    #[test]
    fn word_matching_ignores_substrings() {
        assert!(contains_word("¿a que hora abre?", &["hora"]));
        assert!(!contains_word("ahora quiero desayunar", &["hora"]));
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        assert_eq!(normalize_whitespace("  Juan \t  Pérez \n"), "Juan Pérez");
    }
}
