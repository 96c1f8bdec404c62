//! Generic fallback parser: invoked when the requested key is unknown.
//! Fetches the page, feeds the HTML to an external structured-extraction
//! service, and coerces the response into `ExtractedEvent`s.

use crate::parser::{ParseContext, VenueParser};
use async_trait::async_trait;
use catalog_core::{CatalogError, ExtractedEvent, Result};
use serde::Deserialize;

pub struct GenericParser {
    extractor_url: Option<String>,
    extractor_model: Option<String>,
}

impl GenericParser {
    pub fn new(extractor_url: Option<String>, extractor_model: Option<String>) -> Self {
        Self {
            extractor_url,
            extractor_model,
        }
    }
}

#[derive(Deserialize)]
struct ExtractorRecord {
    name: Option<String>,
    date_start: Option<String>,
    date_end: Option<String>,
    venue_name: Option<String>,
    venue_postcode: Option<String>,
    discipline: Option<String>,
    url: Option<String>,
    description: Option<String>,
}

impl ExtractorRecord {
    fn into_extracted_event(self) -> Option<ExtractedEvent> {
        let name = self.name?;
        let date_start = self.date_start?;
        let venue_name = self.venue_name?;
        if name.is_empty() || date_start.is_empty() || venue_name.is_empty() {
            return None;
        }
        Some(ExtractedEvent {
            name,
            date_start,
            date_end: self.date_end,
            venue_name,
            venue_postcode: self.venue_postcode,
            discipline: self.discipline,
            url: self.url,
            description: self.description,
            ..Default::default()
        })
    }
}

#[async_trait]
impl VenueParser for GenericParser {
    async fn fetch_and_parse(&self, source_url: &str, ctx: &ParseContext<'_>) -> Result<Vec<ExtractedEvent>> {
        let Some(extractor_url) = &self.extractor_url else {
            tracing::warn!(source_url, "no generic extractor configured, returning zero events");
            return Ok(Vec::new());
        };

        let html = crate::retry::send_with_retry(|| ctx.http.get(source_url))
            .await?
            .text()
            .await
            .map_err(CatalogError::Http)?;

        let body = serde_json::json!({
            "html": html,
            "model": self.extractor_model,
        });
        let response = crate::retry::send_with_retry(|| ctx.http.post(extractor_url).json(&body)).await?;
        let records: Vec<ExtractorRecord> = response.json().await.map_err(CatalogError::Http)?;

        Ok(records.into_iter().filter_map(ExtractorRecord::into_extracted_event).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_record_missing_required_field() {
        let record = ExtractorRecord {
            name: Some("Spring Show".into()),
            date_start: None,
            date_end: None,
            venue_name: Some("Arena UK".into()),
            venue_postcode: None,
            discipline: None,
            url: None,
            description: None,
        };
        assert!(record.into_extracted_event().is_none());
    }

    #[test]
    fn keeps_record_with_all_required_fields() {
        let record = ExtractorRecord {
            name: Some("Spring Show".into()),
            date_start: Some("2026-04-01".into()),
            date_end: None,
            venue_name: Some("Arena UK".into()),
            venue_postcode: None,
            discipline: None,
            url: None,
            description: None,
        };
        assert!(record.into_extracted_event().is_some());
    }
}
