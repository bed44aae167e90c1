// src/index/key.rs

//! Lookup key normalization for project names.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Derive the normalized lookup key for a project name.
///
/// Lower-cases, strips diacritics, and drops everything that is not an ASCII
/// letter or digit. A name with no alphanumeric characters at all falls back
/// to its whitespace-stripped lowercase form so it still gets a non-empty key.
pub fn project_key(name: &str) -> String {
    let folded = deburr(name).to_lowercase();
    let key: String = folded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if key.is_empty() {
        folded.split_whitespace().collect()
    } else {
        key
    }
}

/// Strip diacritics by NFD-decomposing and dropping combining marks.
fn deburr(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(project_key("Fidenza"), "fidenza");
    }

    #[test]
    fn test_punctuation_and_spaces_dropped() {
        assert_eq!(project_key("Ringers #2"), "ringers2");
        assert_eq!(project_key("The Eternal Pump"), "theeternalpump");
    }

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(project_key("Café Américain"), "cafeamericain");
        assert_eq!(project_key("Über Läsionen"), "uberlasionen");
    }

    #[test]
    fn test_no_alphanumeric_falls_back() {
        assert_eq!(project_key("!!!"), "!!!");
        assert_eq!(project_key("¯\\_ (ツ) _/¯"), "¯\\_(ツ)_/¯");
    }

    #[test]
    fn test_fallback_strips_whitespace_and_lowercases() {
        // Non-Latin names keep their characters, minus whitespace.
        assert_eq!(project_key("不 确 定"), "不确定");
    }
}
