//! Illustrative parser exercising the registry. British Showjumping serves
//! a JSON events feed; the extraction body here is intentionally thin.

use crate::parser::{ParseContext, VenueParser};
use async_trait::async_trait;
use catalog_core::{CatalogError, ExtractedEvent, Result};
use serde::Deserialize;

pub struct BritishShowjumpingParser;

#[derive(Deserialize)]
struct FeedEvent {
    title: String,
    start_date: String,
    venue: String,
    postcode: Option<String>,
    discipline: Option<String>,
}

#[async_trait]
impl VenueParser for BritishShowjumpingParser {
    async fn fetch_and_parse(&self, source_url: &str, ctx: &ParseContext<'_>) -> Result<Vec<ExtractedEvent>> {
        let response = crate::retry::send_with_retry(|| ctx.http.get(source_url)).await?;
        let feed: Vec<FeedEvent> = response.json().await.map_err(CatalogError::Http)?;

        Ok(feed
            .into_iter()
            .map(|event| ExtractedEvent {
                name: event.title,
                date_start: event.start_date,
                venue_name: event.venue,
                venue_postcode: event.postcode,
                discipline: event.discipline,
                ..Default::default()
            })
            .collect())
    }
}
