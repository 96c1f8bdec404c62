//! Discipline canonicalization and free-text inference.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The twelve competition categories, two non-competition categories, and
/// the catch-all, in canonical spelling.
pub const SHOW_JUMPING: &str = "Show Jumping";
pub const DRESSAGE: &str = "Dressage";
pub const EVENTING: &str = "Eventing";
pub const CROSS_COUNTRY: &str = "Cross Country";
pub const COMBINED_TRAINING: &str = "Combined Training";
pub const SHOWING: &str = "Showing";
pub const HUNTER_TRIAL: &str = "Hunter Trial";
pub const PONY_CLUB: &str = "Pony Club";
pub const NSEA: &str = "NSEA";
pub const AGRICULTURAL_SHOW: &str = "Agricultural Show";
pub const ENDURANCE: &str = "Endurance";
pub const GYMKHANA: &str = "Gymkhana";
pub const VENUE_HIRE: &str = "Venue Hire";
pub const TRAINING: &str = "Training";
pub const OTHER: &str = "Other";

const NON_COMPETITION: &[&str] = &[VENUE_HIRE, TRAINING];

static RAW_SPELLINGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (canonical, spellings) in [
        (
            SHOW_JUMPING,
            vec!["show jumping", "showjumping", "showjump", "sj", "jumping"],
        ),
        (DRESSAGE, vec!["dressage", "bd dressage", "unaffiliated dressage"]),
        (EVENTING, vec!["eventing", "horse trials", "one day event", "ode"]),
        (
            CROSS_COUNTRY,
            vec!["cross country", "xc", "cross-country", "hunter trials xc"],
        ),
        (
            COMBINED_TRAINING,
            vec!["combined training", "ct", "combined"],
        ),
        (SHOWING, vec!["showing", "in hand showing", "ridden showing"]),
        (HUNTER_TRIAL, vec!["hunter trial", "hunter trials"]),
        (PONY_CLUB, vec!["pony club", "pc rally", "pony club camp"]),
        (NSEA, vec!["nsea", "schools equestrian"]),
        (
            AGRICULTURAL_SHOW,
            vec!["agricultural show", "county show", "ag show"],
        ),
        (ENDURANCE, vec!["endurance", "ride and tie"]),
        (GYMKHANA, vec!["gymkhana", "mounted games"]),
        (
            VENUE_HIRE,
            vec!["venue hire", "arena hire", "facility hire"],
        ),
        (
            TRAINING,
            vec!["training", "clinic", "lesson", "masterclass", "camp"],
        ),
    ] {
        for spelling in spellings {
            m.insert(spelling, canonical);
        }
    }
    m
});

/// Maps a raw free-form discipline string to a canonical category plus the
/// is-competition flag implied by that category. `None` if the raw value is
/// not recognized.
pub fn normalise_discipline(raw: &str) -> Option<(&'static str, bool)> {
    let key = raw.trim().to_lowercase();
    RAW_SPELLINGS
        .get(key.as_str())
        .map(|&canonical| (canonical, !NON_COMPETITION.contains(&canonical)))
}

/// Regex-free keyword inference used only as a hint inside the classifier;
/// scans for a recognized spelling appearing as a substring of free text.
pub fn infer_discipline(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    RAW_SPELLINGS
        .iter()
        .find(|(spelling, _)| lower.contains(**spelling))
        .map(|(_, canonical)| *canonical)
}

/// True when `canonical` is one of the competition categories, i.e. not
/// `Training` or `Venue Hire`.
pub fn is_competition_category(canonical: &str) -> bool {
    !NON_COMPETITION.contains(&canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_spelling_resolves() {
        assert_eq!(normalise_discipline("showjump"), Some((SHOW_JUMPING, true)));
    }

    #[test]
    fn unknown_spelling_is_none() {
        assert_eq!(normalise_discipline("underwater basket weaving"), None);
    }

    #[test]
    fn training_is_non_competition() {
        assert_eq!(normalise_discipline("clinic"), Some((TRAINING, false)));
    }

    #[test]
    fn venue_hire_is_non_competition() {
        assert_eq!(normalise_discipline("arena hire"), Some((VENUE_HIRE, false)));
    }

    #[test]
    fn infer_finds_keyword_in_sentence() {
        assert_eq!(infer_discipline("Join us for a fun gymkhana this Sunday"), Some(GYMKHANA));
    }

    #[test]
    fn normalise_is_case_insensitive() {
        assert_eq!(normalise_discipline("Show Jumping"), Some((SHOW_JUMPING, true)));
    }

    #[test]
    fn non_competition_categories_are_not_competition() {
        assert!(!is_competition_category(TRAINING));
        assert!(!is_competition_category(VENUE_HIRE));
        assert!(is_competition_category(SHOW_JUMPING));
    }
}
