//! Illustrative parser exercising the registry. British Dressage serves an
//! HTML listings page; the extraction body here is intentionally thin.

use crate::parser::{ParseContext, VenueParser};
use async_trait::async_trait;
use catalog_core::{CatalogError, ExtractedEvent, Result};

pub struct BritishDressageParser;

#[async_trait]
impl VenueParser for BritishDressageParser {
    async fn fetch_and_parse(&self, source_url: &str, ctx: &ParseContext<'_>) -> Result<Vec<ExtractedEvent>> {
        let _html = crate::retry::send_with_retry(|| ctx.http.get(source_url))
            .await?
            .text()
            .await
            .map_err(CatalogError::Http)?;

        // Real HTML extraction is out of scope for the illustrative parser;
        // the registry contract is what's under test here.
        Ok(Vec::new())
    }
}
