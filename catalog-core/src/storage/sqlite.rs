use crate::common::error::{CatalogError, Result};
use crate::domain::*;
use crate::storage::traits::{CompetitionFilter, Storage};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Database};
use uuid::Uuid;

fn db_err(context: &str, e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Database {
        message: format!("{context}: {e}"),
    }
}

/// Relational storage backed by libSQL. Works against either a local
/// SQLite file or a remote Turso-compatible endpoint, depending on how
/// the `Database` handle was built.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute_batch(include_str!("../../migrations/001_schema.sql"))
            .await
            .map_err(|e| db_err("failed to apply schema migration", e))?;
        conn.execute_batch(include_str!("../../migrations/002_indexes_and_pragmas.sql"))
            .await
            .map_err(|e| db_err("failed to apply index migration", e))?;
        Ok(())
    }

    async fn connection(&self) -> Result<libsql::Connection> {
        self.db
            .connect()
            .map_err(|e| db_err("failed to open connection", e))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| db_err("stored date was not ISO-8601", e))
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| db_err("stored timestamp was not RFC3339", e))
}

fn row_to_venue(row: &libsql::Row) -> Result<Venue> {
    Ok(Venue {
        id: Uuid::parse_str(&row.get::<String>(0).map_err(|e| db_err("venue.id", e))?)
            .map_err(|e| db_err("venue.id uuid", e))?,
        canonical_name: row.get(1).map_err(|e| db_err("venue.canonical_name", e))?,
        postcode: row.get(2).map_err(|e| db_err("venue.postcode", e))?,
        latitude: row.get(3).map_err(|e| db_err("venue.latitude", e))?,
        longitude: row.get(4).map_err(|e| db_err("venue.longitude", e))?,
        distance_miles: row.get(5).map_err(|e| db_err("venue.distance_miles", e))?,
    })
}

fn row_to_competition(row: &libsql::Row) -> Result<Competition> {
    let classes_raw: String = row.get(10).map_err(|e| db_err("competition.classes", e))?;
    let raw_extract_raw: Option<String> =
        row.get(11).map_err(|e| db_err("competition.raw_extract", e))?;
    Ok(Competition {
        id: Uuid::parse_str(&row.get::<String>(0).map_err(|e| db_err("competition.id", e))?)
            .map_err(|e| db_err("competition.id uuid", e))?,
        source_id: Uuid::parse_str(
            &row.get::<String>(1)
                .map_err(|e| db_err("competition.source_id", e))?,
        )
        .map_err(|e| db_err("competition.source_id uuid", e))?,
        name: row.get(2).map_err(|e| db_err("competition.name", e))?,
        date_start: parse_date(&row.get::<String>(3).map_err(|e| db_err("competition.date_start", e))?)?,
        date_end: match row.get::<Option<String>>(4).map_err(|e| db_err("competition.date_end", e))? {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        },
        venue_id: Uuid::parse_str(
            &row.get::<String>(5)
                .map_err(|e| db_err("competition.venue_id", e))?,
        )
        .map_err(|e| db_err("competition.venue_id uuid", e))?,
        is_competition: row.get::<i64>(6).map_err(|e| db_err("competition.is_competition", e))? != 0,
        discipline: row.get(7).map_err(|e| db_err("competition.discipline", e))?,
        has_pony_classes: row
            .get::<i64>(8)
            .map_err(|e| db_err("competition.has_pony_classes", e))?
            != 0,
        url: row.get(9).map_err(|e| db_err("competition.url", e))?,
        classes: serde_json::from_str(&classes_raw).map_err(CatalogError::Json)?,
        description: row.get(12).map_err(|e| db_err("competition.description", e))?,
        raw_extract: match raw_extract_raw {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(CatalogError::Json)?),
            None => None,
        },
        first_seen_at: parse_datetime(
            &row.get::<String>(13)
                .map_err(|e| db_err("competition.first_seen_at", e))?,
        )?,
        last_seen_at: parse_datetime(
            &row.get::<String>(14)
                .map_err(|e| db_err("competition.last_seen_at", e))?,
        )?,
    })
}

const COMPETITION_COLUMNS: &str = "id, source_id, name, date_start, date_end, venue_id, \
     is_competition, discipline, has_pony_classes, url, classes, raw_extract, description, \
     first_seen_at, last_seen_at";

#[async_trait]
impl Storage for SqliteStorage {
    async fn upsert_source(&self, source: &Source) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO sources (id, key, display_name, url, enabled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key) DO UPDATE SET
               display_name = excluded.display_name,
               url = excluded.url,
               enabled = excluded.enabled",
            params![
                source.id.to_string(),
                source.key.clone(),
                source.display_name.clone(),
                source.url.clone(),
                source.enabled as i64,
                source.created_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| db_err("upsert_source", e))?;
        Ok(())
    }

    async fn get_source_by_key(&self, key: &str) -> Result<Option<Source>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, key, display_name, url, enabled, created_at FROM sources WHERE key = ?1",
                params![key],
            )
            .await
            .map_err(|e| db_err("get_source_by_key", e))?;
        match rows.next().await.map_err(|e| db_err("get_source_by_key row", e))? {
            Some(row) => Ok(Some(Source {
                id: Uuid::parse_str(&row.get::<String>(0).map_err(|e| db_err("source.id", e))?)
                    .map_err(|e| db_err("source.id uuid", e))?,
                key: row.get(1).map_err(|e| db_err("source.key", e))?,
                display_name: row.get(2).map_err(|e| db_err("source.display_name", e))?,
                url: row.get(3).map_err(|e| db_err("source.url", e))?,
                enabled: row.get::<i64>(4).map_err(|e| db_err("source.enabled", e))? != 0,
                created_at: parse_datetime(
                    &row.get::<String>(5).map_err(|e| db_err("source.created_at", e))?,
                )?,
            })),
            None => Ok(None),
        }
    }

    async fn list_enabled_sources(&self) -> Result<Vec<Source>> {
        let all = self.list_all_sources().await?;
        Ok(all.into_iter().filter(|s| s.enabled).collect())
    }

    async fn list_all_sources(&self) -> Result<Vec<Source>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, key, display_name, url, enabled, created_at FROM sources ORDER BY key",
                (),
            )
            .await
            .map_err(|e| db_err("list_all_sources", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| db_err("list_all_sources row", e))? {
            out.push(Source {
                id: Uuid::parse_str(&row.get::<String>(0).map_err(|e| db_err("source.id", e))?)
                    .map_err(|e| db_err("source.id uuid", e))?,
                key: row.get(1).map_err(|e| db_err("source.key", e))?,
                display_name: row.get(2).map_err(|e| db_err("source.display_name", e))?,
                url: row.get(3).map_err(|e| db_err("source.url", e))?,
                enabled: row.get::<i64>(4).map_err(|e| db_err("source.enabled", e))? != 0,
                created_at: parse_datetime(
                    &row.get::<String>(5).map_err(|e| db_err("source.created_at", e))?,
                )?,
            });
        }
        Ok(out)
    }

    async fn upsert_venue_seed(&self, venue: &Venue) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO venues (id, canonical_name, postcode, latitude, longitude, distance_miles)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(canonical_name) DO NOTHING",
            params![
                venue.id.to_string(),
                venue.canonical_name.clone(),
                venue.postcode.clone(),
                venue.latitude,
                venue.longitude,
                venue.distance_miles,
            ],
        )
        .await
        .map_err(|e| db_err("upsert_venue_seed", e))?;
        Ok(())
    }

    async fn insert_venue(&self, venue: &Venue) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO venues (id, canonical_name, postcode, latitude, longitude, distance_miles)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                venue.id.to_string(),
                venue.canonical_name.clone(),
                venue.postcode.clone(),
                venue.latitude,
                venue.longitude,
                venue.distance_miles,
            ],
        )
        .await
        .map_err(|e| {
            if e.to_string().to_lowercase().contains("unique constraint") {
                CatalogError::DuplicateVenueName(venue.canonical_name.clone())
            } else {
                db_err("insert_venue", e)
            }
        })?;
        Ok(())
    }

    async fn get_venue_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, canonical_name, postcode, latitude, longitude, distance_miles \
                 FROM venues WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| db_err("get_venue_by_id", e))?;
        match rows.next().await.map_err(|e| db_err("get_venue_by_id row", e))? {
            Some(row) => Ok(Some(row_to_venue(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_venue_by_canonical_name(&self, name: &str) -> Result<Option<Venue>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, canonical_name, postcode, latitude, longitude, distance_miles \
                 FROM venues WHERE canonical_name = ?1",
                params![name],
            )
            .await
            .map_err(|e| db_err("get_venue_by_canonical_name", e))?;
        match rows.next().await.map_err(|e| db_err("get_venue_by_canonical_name row", e))? {
            Some(row) => Ok(Some(row_to_venue(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all_venues(&self) -> Result<Vec<Venue>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, canonical_name, postcode, latitude, longitude, distance_miles \
                 FROM venues ORDER BY canonical_name",
                (),
            )
            .await
            .map_err(|e| db_err("list_all_venues", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| db_err("list_all_venues row", e))? {
            out.push(row_to_venue(&row)?);
        }
        Ok(out)
    }

    async fn update_venue_location(
        &self,
        venue_id: Uuid,
        postcode: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        distance_miles: Option<f64>,
    ) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "UPDATE venues SET postcode = ?2, latitude = ?3, longitude = ?4, distance_miles = ?5 \
             WHERE id = ?1",
            params![venue_id.to_string(), postcode, latitude, longitude, distance_miles],
        )
        .await
        .map_err(|e| db_err("update_venue_location", e))?;
        Ok(())
    }

    async fn recompute_all_distances(&self, home_lat: f64, home_lon: f64) -> Result<()> {
        let venues = self.list_all_venues().await?;
        for venue in venues {
            if let (Some(lat), Some(lon)) = (venue.latitude, venue.longitude) {
                let distance = crate::geo::great_circle_distance_miles(home_lat, home_lon, lat, lon);
                self.update_venue_location(
                    venue.id,
                    venue.postcode.as_deref(),
                    venue.latitude,
                    venue.longitude,
                    Some(distance),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn upsert_alias(&self, alias: &VenueAlias) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO venue_aliases (alias_name, venue_id) VALUES (?1, ?2)
             ON CONFLICT(alias_name) DO UPDATE SET venue_id = excluded.venue_id",
            params![alias.alias_name.clone(), alias.venue_id.to_string()],
        )
        .await
        .map_err(|e| db_err("upsert_alias", e))?;
        Ok(())
    }

    async fn list_all_aliases(&self) -> Result<Vec<VenueAlias>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query("SELECT alias_name, venue_id FROM venue_aliases", ())
            .await
            .map_err(|e| db_err("list_all_aliases", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| db_err("list_all_aliases row", e))? {
            out.push(VenueAlias {
                alias_name: row.get(0).map_err(|e| db_err("alias.alias_name", e))?,
                venue_id: Uuid::parse_str(&row.get::<String>(1).map_err(|e| db_err("alias.venue_id", e))?)
                    .map_err(|e| db_err("alias.venue_id uuid", e))?,
            });
        }
        Ok(out)
    }

    async fn upsert_competition(&self, competition: &Competition) -> Result<bool> {
        let existing = self
            .get_competition(
                competition.source_id,
                &competition.name,
                competition.date_start,
                competition.venue_id,
            )
            .await?;
        let is_new = existing.is_none();
        let first_seen_at = existing
            .map(|c| c.first_seen_at)
            .unwrap_or(competition.first_seen_at);

        let conn = self.connection().await?;
        let classes_json = serde_json::to_string(&competition.classes).map_err(CatalogError::Json)?;
        let raw_extract_json = competition
            .raw_extract
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(CatalogError::Json)?;

        conn.execute(
            &format!(
                "INSERT INTO competitions ({COMPETITION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT(source_id, name, date_start, venue_id) DO UPDATE SET
                   date_end = excluded.date_end,
                   is_competition = excluded.is_competition,
                   discipline = excluded.discipline,
                   has_pony_classes = excluded.has_pony_classes,
                   url = excluded.url,
                   classes = excluded.classes,
                   raw_extract = excluded.raw_extract,
                   description = excluded.description,
                   last_seen_at = excluded.last_seen_at"
            ),
            params![
                competition.id.to_string(),
                competition.source_id.to_string(),
                competition.name.clone(),
                competition.date_start.to_string(),
                competition.date_end.map(|d| d.to_string()),
                competition.venue_id.to_string(),
                competition.is_competition as i64,
                competition.discipline.clone(),
                competition.has_pony_classes as i64,
                competition.url.clone(),
                classes_json,
                raw_extract_json,
                competition.description.clone(),
                first_seen_at.to_rfc3339(),
                competition.last_seen_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| db_err("upsert_competition", e))?;

        Ok(is_new)
    }

    async fn get_competition(
        &self,
        source_id: Uuid,
        name: &str,
        date_start: NaiveDate,
        venue_id: Uuid,
    ) -> Result<Option<Competition>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COMPETITION_COLUMNS} FROM competitions \
                     WHERE source_id = ?1 AND name = ?2 AND date_start = ?3 AND venue_id = ?4"
                ),
                params![
                    source_id.to_string(),
                    name,
                    date_start.to_string(),
                    venue_id.to_string(),
                ],
            )
            .await
            .map_err(|e| db_err("get_competition", e))?;
        match rows.next().await.map_err(|e| db_err("get_competition row", e))? {
            Some(row) => Ok(Some(row_to_competition(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_competitions(&self, filter: &CompetitionFilter) -> Result<Vec<Competition>> {
        let conn = self.connection().await?;
        let mut sql = format!("SELECT {COMPETITION_COLUMNS} FROM competitions c WHERE 1 = 1");
        let mut values: Vec<libsql::Value> = Vec::new();

        let wants_competition = filter.is_competition.unwrap_or(true);
        values.push(libsql::Value::Integer(wants_competition as i64));
        sql.push_str(&format!(" AND c.is_competition = ?{}", values.len()));

        if let Some(from) = filter.date_from {
            values.push(libsql::Value::Text(from.to_string()));
            sql.push_str(&format!(" AND c.date_start >= ?{}", values.len()));
        }
        if let Some(to) = filter.date_to {
            values.push(libsql::Value::Text(to.to_string()));
            sql.push_str(&format!(" AND c.date_start <= ?{}", values.len()));
        }
        if let Some(discipline) = &filter.discipline {
            values.push(libsql::Value::Text(discipline.clone()));
            sql.push_str(&format!(" AND c.discipline = ?{}", values.len()));
        }
        if let Some(pony) = filter.has_pony_classes {
            values.push(libsql::Value::Integer(pony as i64));
            sql.push_str(&format!(" AND c.has_pony_classes = ?{}", values.len()));
        }
        if let Some(needle) = &filter.venue_name_contains {
            values.push(libsql::Value::Text(format!("%{needle}%")));
            sql.push_str(&format!(
                " AND c.venue_id IN (SELECT id FROM venues WHERE canonical_name LIKE ?{})",
                values.len()
            ));
        }
        if let Some(max_distance) = filter.max_distance_miles {
            values.push(libsql::Value::Real(max_distance));
            sql.push_str(&format!(
                " AND c.venue_id IN (SELECT id FROM venues WHERE distance_miles IS NOT NULL AND distance_miles <= ?{})",
                values.len()
            ));
        }
        sql.push_str(" ORDER BY c.date_start ASC");
        if filter.limit > 0 {
            values.push(libsql::Value::Integer(filter.limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", values.len()));
            values.push(libsql::Value::Integer(filter.offset as i64));
            sql.push_str(&format!(" OFFSET ?{}", values.len()));
        }

        let mut rows = conn
            .query(&sql, values)
            .await
            .map_err(|e| db_err("list_competitions", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| db_err("list_competitions row", e))? {
            out.push(row_to_competition(&row)?);
        }
        Ok(out)
    }

    async fn list_competitions_with_discipline(&self) -> Result<Vec<Competition>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE discipline IS NOT NULL"
                ),
                (),
            )
            .await
            .map_err(|e| db_err("list_competitions_with_discipline", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("list_competitions_with_discipline row", e))?
        {
            out.push(row_to_competition(&row)?);
        }
        Ok(out)
    }

    async fn update_competition_discipline(
        &self,
        competition_id: Uuid,
        discipline: Option<&str>,
        is_competition: bool,
    ) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "UPDATE competitions SET discipline = ?2, is_competition = ?3 WHERE id = ?1",
            params![competition_id.to_string(), discipline, is_competition as i64],
        )
        .await
        .map_err(|e| db_err("update_competition_discipline", e))?;
        Ok(())
    }

    async fn insert_scan(&self, scan: &Scan) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO scans (id, source_id, started_at, finished_at, status, events_found, \
             events_upserted, competition_count, training_count, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                scan.id.to_string(),
                scan.source_id.to_string(),
                scan.started_at.to_rfc3339(),
                scan.finished_at.map(|d| d.to_rfc3339()),
                scan.status.as_str(),
                scan.events_found,
                scan.events_upserted,
                scan.competition_count,
                scan.training_count,
                scan.error.clone(),
            ],
        )
        .await
        .map_err(|e| db_err("insert_scan", e))?;
        Ok(())
    }

    async fn update_scan(&self, scan: &Scan) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "UPDATE scans SET finished_at = ?2, status = ?3, events_found = ?4, \
             events_upserted = ?5, competition_count = ?6, training_count = ?7, error = ?8 \
             WHERE id = ?1",
            params![
                scan.id.to_string(),
                scan.finished_at.map(|d| d.to_rfc3339()),
                scan.status.as_str(),
                scan.events_found,
                scan.events_upserted,
                scan.competition_count,
                scan.training_count,
                scan.error.clone(),
            ],
        )
        .await
        .map_err(|e| db_err("update_scan", e))?;
        Ok(())
    }

    async fn list_scans_for_source(&self, source_id: Uuid, limit: usize) -> Result<Vec<Scan>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT id, source_id, started_at, finished_at, status, events_found, \
                 events_upserted, competition_count, training_count, error \
                 FROM scans WHERE source_id = ?1 ORDER BY started_at DESC LIMIT ?2",
                params![source_id.to_string(), limit as i64],
            )
            .await
            .map_err(|e| db_err("list_scans_for_source", e))?;
        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| db_err("list_scans_for_source row", e))?
        {
            out.push(Scan {
                id: Uuid::parse_str(&row.get::<String>(0).map_err(|e| db_err("scan.id", e))?)
                    .map_err(|e| db_err("scan.id uuid", e))?,
                source_id: Uuid::parse_str(
                    &row.get::<String>(1).map_err(|e| db_err("scan.source_id", e))?,
                )
                .map_err(|e| db_err("scan.source_id uuid", e))?,
                started_at: parse_datetime(
                    &row.get::<String>(2).map_err(|e| db_err("scan.started_at", e))?,
                )?,
                finished_at: match row
                    .get::<Option<String>>(3)
                    .map_err(|e| db_err("scan.finished_at", e))?
                {
                    Some(raw) => Some(parse_datetime(&raw)?),
                    None => None,
                },
                status: ScanStatus::parse(&row.get::<String>(4).map_err(|e| db_err("scan.status", e))?)
                    .ok_or_else(|| db_err("scan.status", "unrecognized status"))?,
                events_found: row.get(5).map_err(|e| db_err("scan.events_found", e))?,
                events_upserted: row.get(6).map_err(|e| db_err("scan.events_upserted", e))?,
                competition_count: row.get(7).map_err(|e| db_err("scan.competition_count", e))?,
                training_count: row.get(8).map_err(|e| db_err("scan.training_count", e))?,
                error: row.get(9).map_err(|e| db_err("scan.error", e))?,
            });
        }
        Ok(out)
    }

    async fn has_running_scan(&self, source_id: Uuid) -> Result<bool> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM scans WHERE source_id = ?1 AND status = 'running'",
                params![source_id.to_string()],
            )
            .await
            .map_err(|e| db_err("has_running_scan", e))?;
        let count: i64 = match rows.next().await.map_err(|e| db_err("has_running_scan row", e))? {
            Some(row) => row.get(0).map_err(|e| db_err("has_running_scan count", e))?,
            None => 0,
        };
        Ok(count > 0)
    }

    async fn insert_discipline_audit_entry(&self, entry: &DisciplineAuditEntry) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO discipline_audit_entries \
             (id, scan_id, competition_id, old_discipline, new_discipline, fixed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id.to_string(),
                entry.scan_id.to_string(),
                entry.competition_id.to_string(),
                entry.old_discipline.clone(),
                entry.new_discipline.clone(),
                entry.fixed_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| db_err("insert_discipline_audit_entry", e))?;
        Ok(())
    }
}
