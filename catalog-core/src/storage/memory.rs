use crate::common::error::{CatalogError, Result};
use crate::domain::*;
use crate::geo::great_circle_distance_miles;
use crate::storage::traits::{CompetitionFilter, Storage};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    sources: HashMap<Uuid, Source>,
    venues: HashMap<Uuid, Venue>,
    aliases: HashMap<String, Uuid>,
    competitions: HashMap<Uuid, Competition>,
    scans: HashMap<Uuid, Scan>,
    audit_entries: Vec<DisciplineAuditEntry>,
}

/// In-memory `Storage` implementation for tests. Not used in production;
/// `SqliteStorage` is the real backend.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory storage mutex poisoned")
    }
}

fn dedup_key(source_id: Uuid, name: &str, date_start: NaiveDate, venue_id: Uuid) -> (Uuid, String, NaiveDate, Uuid) {
    (source_id, name.to_string(), date_start, venue_id)
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upsert_source(&self, source: &Source) -> Result<()> {
        self.lock().sources.insert(source.id, source.clone());
        Ok(())
    }

    async fn get_source_by_key(&self, key: &str) -> Result<Option<Source>> {
        Ok(self.lock().sources.values().find(|s| s.key == key).cloned())
    }

    async fn list_enabled_sources(&self) -> Result<Vec<Source>> {
        Ok(self.lock().sources.values().filter(|s| s.enabled).cloned().collect())
    }

    async fn list_all_sources(&self) -> Result<Vec<Source>> {
        Ok(self.lock().sources.values().cloned().collect())
    }

    async fn upsert_venue_seed(&self, venue: &Venue) -> Result<()> {
        let mut tables = self.lock();
        let exists = tables.venues.values().any(|v| v.canonical_name == venue.canonical_name);
        if !exists {
            tables.venues.insert(venue.id, venue.clone());
        }
        Ok(())
    }

    async fn insert_venue(&self, venue: &Venue) -> Result<()> {
        let mut tables = self.lock();
        let exists = tables.venues.values().any(|v| v.canonical_name == venue.canonical_name);
        if exists {
            return Err(CatalogError::DuplicateVenueName(venue.canonical_name.clone()));
        }
        tables.venues.insert(venue.id, venue.clone());
        Ok(())
    }

    async fn get_venue_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        Ok(self.lock().venues.get(&id).cloned())
    }

    async fn get_venue_by_canonical_name(&self, name: &str) -> Result<Option<Venue>> {
        Ok(self.lock().venues.values().find(|v| v.canonical_name == name).cloned())
    }

    async fn list_all_venues(&self) -> Result<Vec<Venue>> {
        Ok(self.lock().venues.values().cloned().collect())
    }

    async fn update_venue_location(
        &self,
        venue_id: Uuid,
        postcode: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        distance_miles: Option<f64>,
    ) -> Result<()> {
        let mut tables = self.lock();
        if let Some(venue) = tables.venues.get_mut(&venue_id) {
            venue.postcode = postcode.map(str::to_string);
            venue.latitude = latitude;
            venue.longitude = longitude;
            venue.distance_miles = distance_miles;
        }
        Ok(())
    }

    async fn recompute_all_distances(&self, home_lat: f64, home_lon: f64) -> Result<()> {
        let mut tables = self.lock();
        for venue in tables.venues.values_mut() {
            if let (Some(lat), Some(lon)) = (venue.latitude, venue.longitude) {
                venue.distance_miles = Some(great_circle_distance_miles(home_lat, home_lon, lat, lon));
            }
        }
        Ok(())
    }

    async fn upsert_alias(&self, alias: &VenueAlias) -> Result<()> {
        self.lock().aliases.insert(alias.alias_name.clone(), alias.venue_id);
        Ok(())
    }

    async fn list_all_aliases(&self) -> Result<Vec<VenueAlias>> {
        Ok(self
            .lock()
            .aliases
            .iter()
            .map(|(alias_name, venue_id)| VenueAlias {
                alias_name: alias_name.clone(),
                venue_id: *venue_id,
            })
            .collect())
    }

    async fn upsert_competition(&self, competition: &Competition) -> Result<bool> {
        let mut tables = self.lock();
        let key = dedup_key(
            competition.source_id,
            &competition.name,
            competition.date_start,
            competition.venue_id,
        );
        let existing_id = tables.competitions.values().find(|c| {
            dedup_key(c.source_id, &c.name, c.date_start, c.venue_id) == key
        }).map(|c| c.id);

        match existing_id {
            Some(id) => {
                let mut updated = competition.clone();
                updated.id = id;
                updated.first_seen_at = tables.competitions[&id].first_seen_at;
                tables.competitions.insert(id, updated);
                Ok(false)
            }
            None => {
                tables.competitions.insert(competition.id, competition.clone());
                Ok(true)
            }
        }
    }

    async fn get_competition(
        &self,
        source_id: Uuid,
        name: &str,
        date_start: NaiveDate,
        venue_id: Uuid,
    ) -> Result<Option<Competition>> {
        let key = dedup_key(source_id, name, date_start, venue_id);
        Ok(self
            .lock()
            .competitions
            .values()
            .find(|c| dedup_key(c.source_id, &c.name, c.date_start, c.venue_id) == key)
            .cloned())
    }

    async fn list_competitions(&self, filter: &CompetitionFilter) -> Result<Vec<Competition>> {
        let tables = self.lock();
        let wants_competition = filter.is_competition.unwrap_or(true);
        let mut out: Vec<Competition> = tables
            .competitions
            .values()
            .filter(|c| c.is_competition == wants_competition)
            .filter(|c| filter.date_from.map_or(true, |d| c.date_start >= d))
            .filter(|c| filter.date_to.map_or(true, |d| c.date_start <= d))
            .filter(|c| {
                filter
                    .discipline
                    .as_ref()
                    .map_or(true, |want| c.discipline.as_deref() == Some(want.as_str()))
            })
            .filter(|c| filter.has_pony_classes.map_or(true, |want| c.has_pony_classes == want))
            .filter(|c| {
                filter.venue_name_contains.as_ref().map_or(true, |needle| {
                    tables
                        .venues
                        .get(&c.venue_id)
                        .map(|v| v.canonical_name.to_lowercase().contains(&needle.to_lowercase()))
                        .unwrap_or(false)
                })
            })
            .filter(|c| {
                filter.max_distance_miles.map_or(true, |max| {
                    tables
                        .venues
                        .get(&c.venue_id)
                        .and_then(|v| v.distance_miles)
                        .map(|d| d <= max)
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect();
        out.sort_by_key(|c| c.date_start);
        if filter.limit > 0 {
            let start = filter.offset.min(out.len());
            let end = (filter.offset + filter.limit).min(out.len());
            out = out[start..end].to_vec();
        }
        Ok(out)
    }

    async fn list_competitions_with_discipline(&self) -> Result<Vec<Competition>> {
        Ok(self
            .lock()
            .competitions
            .values()
            .filter(|c| c.discipline.is_some())
            .cloned()
            .collect())
    }

    async fn update_competition_discipline(
        &self,
        competition_id: Uuid,
        discipline: Option<&str>,
        is_competition: bool,
    ) -> Result<()> {
        let mut tables = self.lock();
        if let Some(competition) = tables.competitions.get_mut(&competition_id) {
            competition.discipline = discipline.map(str::to_string);
            competition.is_competition = is_competition;
            Ok(())
        } else {
            Err(CatalogError::MissingField(format!(
                "no competition with id {competition_id}"
            )))
        }
    }

    async fn insert_scan(&self, scan: &Scan) -> Result<()> {
        self.lock().scans.insert(scan.id, scan.clone());
        Ok(())
    }

    async fn update_scan(&self, scan: &Scan) -> Result<()> {
        self.lock().scans.insert(scan.id, scan.clone());
        Ok(())
    }

    async fn list_scans_for_source(&self, source_id: Uuid, limit: usize) -> Result<Vec<Scan>> {
        let mut scans: Vec<Scan> = self
            .lock()
            .scans
            .values()
            .filter(|s| s.source_id == source_id)
            .cloned()
            .collect();
        scans.sort_by_key(|s| std::cmp::Reverse(s.started_at));
        scans.truncate(limit);
        Ok(scans)
    }

    async fn has_running_scan(&self, source_id: Uuid) -> Result<bool> {
        Ok(self
            .lock()
            .scans
            .values()
            .any(|s| s.source_id == source_id && matches!(s.status, ScanStatus::Running)))
    }

    async fn insert_discipline_audit_entry(&self, entry: &DisciplineAuditEntry) -> Result<()> {
        self.lock().audit_entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn venue(name: &str) -> Venue {
        Venue::new(name)
    }

    #[tokio::test]
    async fn upsert_competition_dedups_on_key() {
        let storage = MemoryStorage::new();
        let source_id = Uuid::new_v4();
        let v = venue("Test Showground");
        storage.insert_venue(&v).await.unwrap();

        let mut competition = Competition {
            id: Uuid::new_v4(),
            source_id,
            name: "Spring Show".into(),
            date_start: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            date_end: None,
            venue_id: v.id,
            is_competition: true,
            discipline: None,
            has_pony_classes: false,
            url: None,
            classes: vec![],
            description: None,
            raw_extract: None,
            first_seen_at: Utc::now(),
            last_seen_at: Utc::now(),
        };

        assert!(storage.upsert_competition(&competition).await.unwrap());
        competition.discipline = Some("dressage".into());
        assert!(!storage.upsert_competition(&competition).await.unwrap());

        let all = storage.list_competitions_with_discipline().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].discipline.as_deref(), Some("dressage"));
    }

    #[tokio::test]
    async fn has_running_scan_reflects_status() {
        let storage = MemoryStorage::new();
        let source_id = Uuid::new_v4();
        let scan = Scan::started(source_id);
        storage.insert_scan(&scan).await.unwrap();
        assert!(storage.has_running_scan(source_id).await.unwrap());

        let mut finished = scan.clone();
        finished.status = ScanStatus::Completed;
        finished.finished_at = Some(Utc::now());
        storage.update_scan(&finished).await.unwrap();
        assert!(!storage.has_running_scan(source_id).await.unwrap());
    }
}
