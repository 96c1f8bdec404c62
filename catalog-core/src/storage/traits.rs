use crate::common::error::Result;
use crate::domain::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// Filter for the read surface an external query API binds to. All fields
/// are optional; `None` means "no restriction on this dimension".
#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub discipline: Option<String>,
    pub venue_name_contains: Option<String>,
    pub has_pony_classes: Option<bool>,
    pub max_distance_miles: Option<f64>,
    /// `None` means "use the caller's default of `true`".
    pub is_competition: Option<bool>,
    pub limit: usize,
    pub offset: usize,
}

/// Persistence contract for the catalog. One implementation is a relational
/// store backed by libSQL/SQLite (`SqliteStorage`); another is an in-memory
/// store used by tests that don't need real I/O.
///
/// The per-scan transaction boundary is per event, not per scan: callers
/// commit one event's upsert before moving to the next, bounding the blast
/// radius of a mid-scan failure to at most one event.
#[async_trait]
#[allow(dead_code)]
pub trait Storage: Send + Sync {
    // --- sources ---
    async fn upsert_source(&self, source: &Source) -> Result<()>;
    async fn get_source_by_key(&self, key: &str) -> Result<Option<Source>>;
    async fn list_enabled_sources(&self) -> Result<Vec<Source>>;
    async fn list_all_sources(&self) -> Result<Vec<Source>>;

    // --- venues ---
    /// Inserts a venue by canonical name if one doesn't already exist.
    /// Used by startup seeding; running it twice is a no-op the second time.
    async fn upsert_venue_seed(&self, venue: &Venue) -> Result<()>;
    async fn insert_venue(&self, venue: &Venue) -> Result<()>;
    async fn get_venue_by_id(&self, id: Uuid) -> Result<Option<Venue>>;
    async fn get_venue_by_canonical_name(&self, name: &str) -> Result<Option<Venue>>;
    async fn list_all_venues(&self) -> Result<Vec<Venue>>;
    /// Sets postcode/coordinates/distance on a venue; a no-op if the venue
    /// already carries identical values.
    async fn update_venue_location(
        &self,
        venue_id: Uuid,
        postcode: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        distance_miles: Option<f64>,
    ) -> Result<()>;
    /// Recomputes `distance_miles` on every venue with coordinates, given
    /// the home location's coordinates. Backs "update home postcode".
    async fn recompute_all_distances(&self, home_lat: f64, home_lon: f64) -> Result<()>;

    // --- venue aliases ---
    async fn upsert_alias(&self, alias: &VenueAlias) -> Result<()>;
    async fn list_all_aliases(&self) -> Result<Vec<VenueAlias>>;

    // --- competitions ---
    /// Upserts on the dedup key `(source_id, name, date_start, venue_id)`.
    /// Returns `true` if a new row was inserted, `false` if an existing row
    /// was refreshed.
    async fn upsert_competition(&self, competition: &Competition) -> Result<bool>;
    async fn get_competition(
        &self,
        source_id: Uuid,
        name: &str,
        date_start: NaiveDate,
        venue_id: Uuid,
    ) -> Result<Option<Competition>>;
    async fn list_competitions(&self, filter: &CompetitionFilter) -> Result<Vec<Competition>>;
    /// All competitions with a non-null discipline, for the audit pass.
    async fn list_competitions_with_discipline(&self) -> Result<Vec<Competition>>;
    async fn update_competition_discipline(
        &self,
        competition_id: Uuid,
        discipline: Option<&str>,
        is_competition: bool,
    ) -> Result<()>;

    // --- scans ---
    async fn insert_scan(&self, scan: &Scan) -> Result<()>;
    async fn update_scan(&self, scan: &Scan) -> Result<()>;
    async fn list_scans_for_source(&self, source_id: Uuid, limit: usize) -> Result<Vec<Scan>>;
    /// Backs the scheduler's one-scan-per-source-at-a-time guard.
    async fn has_running_scan(&self, source_id: Uuid) -> Result<bool>;

    // --- discipline audit ---
    async fn insert_discipline_audit_entry(&self, entry: &DisciplineAuditEntry) -> Result<()>;
}
