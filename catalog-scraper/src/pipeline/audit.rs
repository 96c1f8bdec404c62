//! Discipline audit pass (§4.11): re-applies discipline canonicalization to
//! every already-classified competition and records any drift. Catches rows
//! classified under an older, narrower `RAW_SPELLINGS` table.

use crate::normalize::normalise_discipline;
use crate::observability::metrics::record_discipline_audit_fixups;
use catalog_core::{DisciplineAuditEntry, Result, Storage};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Re-derives each competition's discipline from its stored raw value and
/// corrects any drift. Returns the number of rows fixed. Runs only after
/// scheduler-triggered scans, not manual ones.
pub async fn run_discipline_audit(storage: &dyn Storage, scan_id: Uuid) -> Result<u64> {
    let competitions = storage.list_competitions_with_discipline().await?;
    let mut fixups = 0u64;

    for competition in competitions {
        let Some(raw) = &competition.discipline else {
            continue;
        };
        let Some((canonical, is_competition)) = normalise_discipline(raw) else {
            continue;
        };

        if competition.discipline.as_deref() == Some(canonical) && competition.is_competition == is_competition {
            continue;
        }

        storage
            .update_competition_discipline(competition.id, Some(canonical), is_competition)
            .await?;

        storage
            .insert_discipline_audit_entry(&DisciplineAuditEntry {
                id: Uuid::new_v4(),
                scan_id,
                competition_id: competition.id,
                old_discipline: competition.discipline.clone(),
                new_discipline: Some(canonical.to_string()),
                fixed_at: Utc::now(),
            })
            .await?;

        fixups += 1;
    }

    if fixups > 0 {
        info!(fixups, "discipline audit corrected stale rows");
    }
    record_discipline_audit_fixups(fixups);
    Ok(fixups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::storage::MemoryStorage;
    use catalog_core::{Competition, Source, Venue};
    use chrono::NaiveDate;

    async fn seeded_competition(storage: &MemoryStorage, discipline: &str) -> Competition {
        let source = Source {
            id: Uuid::new_v4(),
            key: "test".into(),
            display_name: "Test".into(),
            url: "https://example.com".into(),
            enabled: true,
            created_at: Utc::now(),
        };
        storage.upsert_source(&source).await.unwrap();
        let venue = Venue::new("Arena UK");
        storage.insert_venue(&venue).await.unwrap();

        let competition = Competition {
            id: Uuid::new_v4(),
            source_id: source.id,
            name: "Spring Clinic".into(),
            date_start: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            date_end: None,
            venue_id: venue.id,
            is_competition: true,
            discipline: Some(discipline.to_string()),
            has_pony_classes: false,
            url: None,
            classes: vec![],
            description: None,
            raw_extract: None,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        };
        storage.upsert_competition(&competition).await.unwrap();
        competition
    }

    #[tokio::test]
    async fn fixes_stale_is_competition_flag() {
        let storage = MemoryStorage::new();
        seeded_competition(&storage, "clinic").await;

        let fixups = run_discipline_audit(&storage, Uuid::new_v4()).await.unwrap();
        assert_eq!(fixups, 1);

        let entries = storage.list_competitions_with_discipline().await.unwrap();
        assert_eq!(entries[0].discipline.as_deref(), Some("Training"));
        assert!(!entries[0].is_competition);
    }

    #[tokio::test]
    async fn already_canonical_rows_are_left_alone() {
        let storage = MemoryStorage::new();
        seeded_competition(&storage, "Training").await;

        let fixups = run_discipline_audit(&storage, Uuid::new_v4()).await.unwrap();
        assert_eq!(fixups, 0);
    }

    #[tokio::test]
    async fn unrecognized_raw_value_is_skipped() {
        let storage = MemoryStorage::new();
        seeded_competition(&storage, "underwater basket weaving").await;

        let fixups = run_discipline_audit(&storage, Uuid::new_v4()).await.unwrap();
        assert_eq!(fixups, 0);
    }
}
