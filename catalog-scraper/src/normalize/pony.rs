//! Pony/junior class detection: `detect_pony_classes`.

const PONY_KEYWORDS: &[&str] = &["pony", "ponies", "junior", "u12", "u14", "u16", "under 18"];

/// Case-insensitive keyword scan for pony/junior indicators.
pub fn detect_pony_classes(text: &str) -> bool {
    let lower = text.to_lowercase();
    PONY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pony_keyword() {
        assert!(detect_pony_classes("Pony Show Jumping Class 4"));
    }

    #[test]
    fn detects_junior_keyword() {
        assert!(detect_pony_classes("Junior Dressage Test"));
    }

    #[test]
    fn no_match_for_adult_class() {
        assert!(!detect_pony_classes("Senior Open Championship"));
    }
}
