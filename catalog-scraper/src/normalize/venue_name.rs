//! Venue-name canonicalization: `normalise_venue_name`.
//!
//! Applied at every ingest point. Total and deterministic: identical input
//! always produces identical output, including on a second pass over an
//! already-canonical name.

use once_cell::sync::Lazy;
use regex::Regex;

pub const TBC: &str = "Tbc";

const SUFFIX_VOCABULARY: &[&str] = &[
    "Equestrian Centre",
    "Equestrian",
    "Equine Centre",
    "Equine",
    "Riding Centre",
    "Riding School",
    "Riding Club",
    "Showground",
    "Event Centre",
    "Farm",
    "Stables",
    "Ltd",
];

const ORPHAN_PREPOSITIONS: &[&str] = &["of", "at", "in", "on", "&", "and"];

static SHOW_NUMBERING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(\d+\)\s*-\s*").unwrap());
static EVENT_DESCRIPTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\((Festival|Championship|Show|Event|Finals?)\)\s*$").unwrap());
static TRAILING_ABBREVIATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+-\s+[A-Za-z]{1,6}$").unwrap());
static URL_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+://").unwrap());
static PLUS_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[23456789CFGHJMPQRVWX]{4,8}\+[23456789CFGHJMPQRVWX]{2,3}$").unwrap());

use crate::normalize::postcode::normalise_postcode;

fn looks_like_junk(trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.len() > 100 {
        return true;
    }
    if URL_LIKE.is_match(trimmed) {
        return true;
    }
    if PLUS_CODE.is_match(trimmed) {
        return true;
    }
    if normalise_postcode(trimmed).is_some() && trimmed.split_whitespace().count() <= 2 {
        return true;
    }
    false
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            if word.len() <= 3 && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
                word.to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_embedded_postcode(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if i + 1 < words.len() {
            let pair = format!("{} {}", words[i], words[i + 1]);
            if normalise_postcode(&pair).is_some() {
                i += 2;
                continue;
            }
        }
        if normalise_postcode(words[i]).is_some() {
            i += 1;
            continue;
        }
        out.push(words[i]);
        i += 1;
    }
    out.join(" ")
}

fn strip_trailing_limited(name: &str) -> String {
    let trimmed = name.trim_end();
    if let Some(stripped) = trimmed.strip_suffix("Limited") {
        stripped.trim_end().to_string()
    } else {
        trimmed.to_string()
    }
}

fn strip_suffixes(name: &str) -> String {
    let mut current = name.to_string();
    for _ in 0..2 {
        let before = current.clone();
        for suffix in SUFFIX_VOCABULARY {
            let candidate = format!(" {suffix}");
            if current.ends_with(candidate.as_str()) {
                current.truncate(current.len() - candidate.len());
            } else if current == *suffix {
                current.clear();
            }
        }
        current = current.trim_end().to_string();
        if current == before {
            break;
        }
    }
    current
}

fn strip_orphan_edges(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    while let Some(last) = words.last() {
        if ORPHAN_PREPOSITIONS.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

fn truncate_on_commas(name: &str) -> String {
    let comma_count = name.matches(',').count();
    if comma_count >= 2 {
        name.split(',').next().unwrap_or(name).trim().to_string()
    } else if comma_count == 1 && name.len() > 50 {
        name.split(',').next().unwrap_or(name).trim().to_string()
    } else {
        name.to_string()
    }
}

/// Canonicalizes a raw venue name. Stop at the first junk guard that fires,
/// returning the sentinel `"Tbc"`; otherwise run the full pipeline.
pub fn normalise_venue_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if looks_like_junk(trimmed) {
        return TBC.to_string();
    }

    let mut name = SHOW_NUMBERING.replace(trimmed, "").into_owned();
    name = EVENT_DESCRIPTOR.replace(&name, "").into_owned();
    name = title_case(name.trim());
    name = strip_embedded_postcode(&name);
    name = strip_trailing_limited(&name);
    name = TRAILING_ABBREVIATION.replace(&name, "").into_owned();
    name = strip_suffixes(&name);
    name = strip_orphan_edges(&name);
    name = truncate_on_commas(&name);

    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        TBC.to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_junk() {
        assert_eq!(normalise_venue_name("http://example.com/event/123"), TBC);
    }

    #[test]
    fn bare_postcode_is_junk() {
        assert_eq!(normalise_venue_name("CV12 9JA"), TBC);
    }

    #[test]
    fn empty_is_junk() {
        assert_eq!(normalise_venue_name("   "), TBC);
    }

    #[test]
    fn strips_show_numbering_and_descriptor() {
        let out = normalise_venue_name("(12) - Arena UK (Festival)");
        assert_eq!(out, "Arena UK");
    }

    #[test]
    fn strips_suffix_vocabulary() {
        assert_eq!(normalise_venue_name("Abbey Equestrian Centre"), "Abbey");
    }

    #[test]
    fn strips_trailing_limited() {
        assert_eq!(normalise_venue_name("Hartpury Events Limited"), "Hartpury Events");
    }

    #[test]
    fn keeps_short_qualified_name_with_comma() {
        assert_eq!(normalise_venue_name("Higher Farm, Cheshire"), "Higher Farm, Cheshire");
    }

    #[test]
    fn truncates_long_single_comma_name() {
        let padding = "X".repeat(60);
        let input = format!("Riverside Grounds, {padding}");
        assert_eq!(normalise_venue_name(&input), "Riverside Grounds");
    }

    #[test]
    fn truncates_on_multiple_commas() {
        assert_eq!(
            normalise_venue_name("Oakfield Park, Near Thirsk, North Yorkshire"),
            "Oakfield Park"
        );
    }

    #[test]
    fn is_idempotent() {
        let once = normalise_venue_name("Abbey Equestrian Centre Ltd");
        let twice = normalise_venue_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn too_long_is_junk() {
        let long_name = "A".repeat(101);
        assert_eq!(normalise_venue_name(&long_name), TBC);
    }
}
