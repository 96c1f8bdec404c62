//! URL sanitization: `sanitize_url`.

/// Parses `raw` as a URL and returns it unchanged only if the scheme is
/// `http` or `https`; otherwise returns nothing.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(raw).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(raw.to_string()),
        _ => None,
    }
}
