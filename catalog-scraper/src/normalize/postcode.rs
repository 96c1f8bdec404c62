//! UK postcode canonicalization: `normalise_postcode`.

/// Canonicalizes a raw postcode string to `OUTWARD INWARD`, uppercase,
/// single space. Returns `None` for anything that doesn't look like a UK
/// postcode rather than guessing.
pub fn normalise_postcode(raw: &str) -> Option<String> {
    let stripped: String = raw
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if stripped.len() < 5 || stripped.len() > 7 {
        return None;
    }

    let chars: Vec<char> = stripped.chars().collect();
    let (outward_chars, inward_chars) = chars.split_at(chars.len() - 3);
    let inward: String = inward_chars.iter().collect();
    if !is_inward(&inward) {
        return None;
    }

    let outward: String = outward_chars.iter().collect();
    if !is_recognized_outward(&outward) {
        return None;
    }

    Some(format!("{outward} {inward}"))
}

fn is_inward(inward: &str) -> bool {
    let chars: Vec<char> = inward.chars().collect();
    chars.len() == 3
        && chars[0].is_ascii_digit()
        && chars[1].is_ascii_alphabetic()
        && chars[2].is_ascii_alphabetic()
}

/// Recognized UK outward-code shapes (`A9`, `A99`, `A9A`, `AA9`, `AA99`,
/// `AA9A`) where `L` is a letter and `D` is a digit.
fn is_recognized_outward(outward: &str) -> bool {
    let shape: String = outward
        .chars()
        .map(|c| if c.is_ascii_digit() { 'D' } else { 'L' })
        .collect();
    matches!(shape.as_str(), "LD" | "LDD" | "LDL" | "LLD" | "LLDD" | "LLDL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_lowercase_no_space() {
        assert_eq!(normalise_postcode("cv129ja"), Some("CV12 9JA".to_string()));
    }

    #[test]
    fn canonicalized_input_is_idempotent() {
        let canonical = normalise_postcode("sw1a 1aa").unwrap();
        assert_eq!(normalise_postcode(&canonical), Some(canonical));
    }

    #[test]
    fn rejects_too_short() {
        assert_eq!(normalise_postcode("ab1"), None);
    }

    #[test]
    fn rejects_bad_inward_shape() {
        assert_eq!(normalise_postcode("SW1A AAA"), None);
    }

    #[test]
    fn strips_trailing_punctuation() {
        assert_eq!(normalise_postcode("CV12 9JA."), Some("CV12 9JA".to_string()));
    }

    #[test]
    fn single_letter_outward() {
        assert_eq!(normalise_postcode("W1A1AA"), Some("W1A 1AA".to_string()));
    }
}
