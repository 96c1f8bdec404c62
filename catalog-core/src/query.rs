//! Read surface an external API layer would bind to (§4.10/§4.10a). No HTTP
//! framing lives here; `CatalogQuery` is the seam a web layer calls into,
//! grounded in the teacher's `Storage` trait and its GraphQL-facing batch
//! methods (`get_events_by_date_range`, `get_all_venues`).

use crate::common::error::Result;
use crate::domain::{Competition, Scan, Venue};
use crate::storage::{CompetitionFilter, Storage};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CatalogQuery: Storage {
    async fn query_competitions(&self, filter: &CompetitionFilter) -> Result<Vec<Competition>> {
        self.list_competitions(filter).await
    }

    async fn scan_history(&self, source_id: Uuid, limit: usize) -> Result<Vec<Scan>> {
        self.list_scans_for_source(source_id, limit).await
    }

    async fn venue_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        self.get_venue_by_id(id).await
    }
}

impl<T: Storage + ?Sized> CatalogQuery for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::Source;
    use chrono::Utc;

    #[tokio::test]
    async fn query_competitions_delegates_to_storage() {
        let storage = MemoryStorage::new();
        let source = Source {
            id: Uuid::new_v4(),
            key: "test".into(),
            display_name: "Test".into(),
            url: "https://example.com".into(),
            enabled: true,
            created_at: Utc::now(),
        };
        storage.upsert_source(&source).await.unwrap();

        let competitions = storage.query_competitions(&CompetitionFilter::default()).await.unwrap();
        assert!(competitions.is_empty());
    }

    #[tokio::test]
    async fn venue_by_id_returns_none_for_unknown() {
        let storage = MemoryStorage::new();
        let result = storage.venue_by_id(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }
}
