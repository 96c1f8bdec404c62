//! Event classifier: the only place classification lives.

use crate::normalize::discipline::{
    infer_discipline, is_competition_category, normalise_discipline, TRAINING, VENUE_HIRE,
};

const TRAINING_KEYWORDS: &[&str] = &["training", "clinic", "lesson", "masterclass", "camp"];
const HIRE_KEYWORDS: &[&str] = &["venue hire", "arena hire"];

fn contains_keyword(haystack: &str, keywords: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}

/// `classify(name, discipline_hint?, description?) -> (canonical_discipline, is_competition)`
///
/// Table-driven and pure: the first rule that fires wins, in order.
pub fn classify(
    name: &str,
    discipline_hint: Option<&str>,
    description: Option<&str>,
) -> (Option<&'static str>, bool) {
    let combined_text = match description {
        Some(desc) => format!("{name} {desc}"),
        None => name.to_string(),
    };

    if contains_keyword(&combined_text, HIRE_KEYWORDS) {
        return (Some(VENUE_HIRE), false);
    }
    if contains_keyword(&combined_text, TRAINING_KEYWORDS) {
        return (Some(TRAINING), false);
    }

    if let Some(hint) = discipline_hint {
        if let Some((canonical, is_competition)) = normalise_discipline(hint) {
            return (Some(canonical), is_competition);
        }
    }

    if let Some(canonical) = infer_discipline(name).filter(|c| is_competition_category(c)) {
        return (Some(canonical), true);
    }
    if let Some(desc) = description {
        if let Some(canonical) = infer_discipline(desc).filter(|c| is_competition_category(c)) {
            return (Some(canonical), true);
        }
    }

    (None, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_keyword_overrides_discipline_hint() {
        let (discipline, is_competition) = classify(
            "Maddy Moffet Jump Polework Training Clinic",
            Some("Show Jumping"),
            None,
        );
        assert_eq!(discipline, Some(TRAINING));
        assert!(!is_competition);
    }

    #[test]
    fn discipline_hint_is_trusted() {
        let (discipline, is_competition) = classify("Spring Show", Some("showjump"), None);
        assert_eq!(discipline, Some("Show Jumping"));
        assert!(is_competition);
    }

    #[test]
    fn venue_hire_keyword_wins_over_hint() {
        let (discipline, is_competition) = classify("Arena Hire Morning Session", Some("dressage"), None);
        assert_eq!(discipline, Some(VENUE_HIRE));
        assert!(!is_competition);
    }

    #[test]
    fn unknown_event_is_presumed_competition() {
        let (discipline, is_competition) = classify("Mystery Event", None, None);
        assert_eq!(discipline, None);
        assert!(is_competition);
    }

    #[test]
    fn infers_from_description_when_name_has_no_signal() {
        let (discipline, is_competition) =
            classify("Spring Gathering", None, Some("An afternoon of gymkhana games"));
        assert_eq!(discipline, Some("Gymkhana"));
        assert!(is_competition);
    }

    #[test]
    fn inferred_non_competition_category_does_not_short_circuit_as_competition() {
        let (discipline, is_competition) =
            classify("Arena Block Booking", None, Some("Facility hire for the weekend."));
        assert_eq!(discipline, None);
        assert!(is_competition);
    }

    #[test]
    fn classify_is_pure() {
        let a = classify("Spring Show", Some("showjump"), None);
        let b = classify("Spring Show", Some("showjump"), None);
        assert_eq!(a, b);
    }
}
