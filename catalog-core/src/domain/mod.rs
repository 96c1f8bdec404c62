use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One upstream website or feed with a registered parser.
///
/// Seeded from a compiled-in definition list at startup; never created at
/// runtime by the pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub id: Uuid,
    pub key: String,
    pub display_name: String,
    pub url: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// A physical location with a canonical name and, when known, a postcode
/// and coordinates.
///
/// `postcode`/`latitude`/`longitude` are set once a confident value is
/// obtained and are otherwise left alone; `distance_miles` is derived and
/// recomputed whenever coordinates change or the configured home postcode
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venue {
    pub id: Uuid,
    pub canonical_name: String,
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub distance_miles: Option<f64>,
}

impl Venue {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            canonical_name: canonical_name.into(),
            postcode: None,
            latitude: None,
            longitude: None,
            distance_miles: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// A non-canonical name that maps to a venue. Both seed-derived and
/// runtime-learned aliases live in the same table; lookup is always by
/// exact match on the normalized alias string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueAlias {
    pub alias_name: String,
    pub venue_id: Uuid,
}

/// The persisted, classified, venue-resolved competition row.
///
/// Venue-derived attributes (name, postcode, coordinates, distance) are
/// read through `venue_id`, never duplicated onto this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Competition {
    pub id: Uuid,
    pub source_id: Uuid,
    pub name: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub venue_id: Uuid,
    pub is_competition: bool,
    pub discipline: Option<String>,
    pub has_pony_classes: bool,
    pub url: Option<String>,
    pub classes: Vec<String>,
    pub description: Option<String>,
    pub raw_extract: Option<serde_json::Value>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ScanStatus::Pending),
            "running" => Some(ScanStatus::Running),
            "completed" => Some(ScanStatus::Completed),
            "failed" => Some(ScanStatus::Failed),
            _ => None,
        }
    }
}

/// An insert-only audit record of one orchestrator invocation against one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scan {
    pub id: Uuid,
    pub source_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: ScanStatus,
    pub events_found: i64,
    pub events_upserted: i64,
    pub competition_count: i64,
    pub training_count: i64,
    pub error: Option<String>,
}

impl Scan {
    pub fn started(source_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            started_at: Utc::now(),
            finished_at: None,
            status: ScanStatus::Running,
            events_found: 0,
            events_upserted: 0,
            competition_count: 0,
            training_count: 0,
            error: None,
        }
    }
}

/// One fixup applied by the post-scan discipline audit. Grounded in the
/// teacher's `ProcessRecord` audit-trail row: the audit pass needs a
/// durable record of what it changed, not just a log line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisciplineAuditEntry {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub competition_id: Uuid,
    pub old_discipline: Option<String>,
    pub new_discipline: Option<String>,
    pub fixed_at: DateTime<Utc>,
}

/// The raw, un-classified wire record produced by a parser. Purely
/// extractive: parsers populate this and nothing else. Classification,
/// venue resolution, and geocoding all happen downstream in the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedEvent {
    pub name: String,
    pub date_start: String,
    pub date_end: Option<String>,
    pub venue_name: String,
    pub venue_postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub discipline: Option<String>,
    pub has_pony_classes: Option<bool>,
    pub classes: Option<Vec<String>>,
    pub url: Option<String>,
    pub description: Option<String>,
}
