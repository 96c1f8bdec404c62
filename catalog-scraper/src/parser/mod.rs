pub mod generic;
pub mod parsers;
pub mod registry;

use async_trait::async_trait;
use catalog_core::{ExtractedEvent, Result};

/// Context passed to a parser invocation: currently just the configured
/// HTTP client, kept as a struct so new cross-cutting fields (a cache, a
/// feature flag) can be threaded in without changing every parser's
/// signature.
pub struct ParseContext<'a> {
    pub http: &'a reqwest::Client,
}

/// Strategy that turns one source fetch into a list of `ExtractedEvent`s.
///
/// Purely extractive: implementations MUST NOT filter by date, decide
/// `is_competition`, canonicalize venues or disciplines, touch the
/// database, or call the classifier. All discovered events are emitted,
/// past or future.
#[async_trait]
pub trait VenueParser: Send + Sync {
    async fn fetch_and_parse(&self, source_url: &str, ctx: &ParseContext<'_>) -> Result<Vec<ExtractedEvent>>;
}

pub use registry::ParserRegistry;
