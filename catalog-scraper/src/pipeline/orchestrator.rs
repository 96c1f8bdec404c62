//! Scan orchestrator (§4.6): the heart of the system. A single invocation
//! scans one source, driving dispatch → extract → per-event
//! normalize/classify/resolve-venue/geocode/upsert.

use crate::classify::classify;
use crate::geocode::{Coordinates, GeocodeClient, Geocoder};
use crate::normalize::{detect_pony_classes, normalise_discipline, normalise_postcode, normalise_venue_name, parse_event_date, sanitize_url, TBC};
use crate::observability::metrics;
use crate::parser::{ParseContext, ParserRegistry};
use crate::venues::VenueMatcher;
use catalog_core::{CatalogError, Competition, ExtractedEvent, Result, Scan, ScanStatus, Source, Storage};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

pub struct ScanOutcome {
    pub scan: Scan,
}

#[derive(Clone)]
pub struct Orchestrator {
    pub storage: Arc<dyn Storage>,
    pub parsers: Arc<ParserRegistry>,
    pub http: reqwest::Client,
    pub rate_limiter: crate::rate_limit::HostRateLimiter,
    pub geocode_primary: Arc<dyn GeocodeClient>,
    pub geocode_fallback: Arc<dyn GeocodeClient>,
    pub home_postcode: String,
    pub home_coordinates: Option<Coordinates>,
    pub ambiguous_venue_names: HashSet<String>,
    pub scan_timeout: Duration,
}

impl Orchestrator {
    /// Runs one scan of `source`. `triggered_by_scheduler` gates whether
    /// the discipline audit runs afterward (§4.11: manual scans skip it).
    pub async fn run_scan(&self, source: &Source, triggered_by_scheduler: bool) -> Result<ScanOutcome> {
        if self.storage.has_running_scan(source.id).await? {
            warn!(source = %source.key, "scan already in flight, suppressing new invocation");
            return Err(CatalogError::Api {
                message: format!("scan already running for source {}", source.key),
            });
        }

        let mut scan = Scan::started(source.id);
        self.storage.insert_scan(&scan).await?;
        metrics::record_scan_started();

        let started = Instant::now();
        let result = tokio::time::timeout(self.scan_timeout, self.run_scan_body(source, &mut scan)).await;

        match result {
            Ok(Ok(())) => {
                scan.status = ScanStatus::Completed;
            }
            Ok(Err(e)) => {
                scan.status = ScanStatus::Failed;
                scan.error = Some(e.to_string());
            }
            Err(_) => {
                scan.status = ScanStatus::Failed;
                scan.error = Some("timeout".to_string());
            }
        }
        scan.finished_at = Some(Utc::now());
        self.storage.update_scan(&scan).await?;

        let duration_secs = started.elapsed().as_secs_f64();
        match scan.status {
            ScanStatus::Completed => {
                metrics::record_scan_completed(duration_secs, scan.events_found, scan.events_upserted);
                info!(source = %source.key, events_found = scan.events_found, events_upserted = scan.events_upserted, "scan completed");
            }
            ScanStatus::Failed => {
                metrics::record_scan_failed();
                warn!(source = %source.key, error = ?scan.error, "scan failed");
            }
            _ => {}
        }

        if triggered_by_scheduler && scan.status == ScanStatus::Completed {
            let fixups = crate::pipeline::audit::run_discipline_audit(self.storage.as_ref(), scan.id).await?;
            if fixups > 0 {
                info!(source = %source.key, fixups, "discipline audit applied fixups");
            }
        }

        Ok(ScanOutcome { scan })
    }

    async fn run_scan_body(&self, source: &Source, scan: &mut Scan) -> Result<()> {
        self.rate_limiter.acquire(&source.url).await;

        let parser = self.parsers.get(&source.key);
        let ctx = ParseContext { http: &self.http };
        let extracted_events = parser.fetch_and_parse(&source.url, &ctx).await?;
        scan.events_found = extracted_events.len() as i64;

        if extracted_events.is_empty() {
            warn!(source = %source.key, "parser returned zero events");
        }

        let matcher = VenueMatcher::build(self.storage.as_ref(), self.ambiguous_venue_names.clone()).await?;
        let geocoder = Geocoder {
            primary: self.geocode_primary.clone(),
            fallback: self.geocode_fallback.clone(),
            home_postcode: self.home_postcode.clone(),
            home_coordinates: self.home_coordinates,
        };

        let mut upserted = 0i64;
        let mut competition_count = 0i64;
        let mut training_count = 0i64;

        for event in &extracted_events {
            match self
                .process_one_event(source, event, &matcher, &geocoder)
                .await
            {
                Ok(Some(is_competition)) => {
                    upserted += 1;
                    if is_competition {
                        competition_count += 1;
                    } else {
                        training_count += 1;
                    }
                }
                Ok(None) => {
                    // Skipped at a normalization guard that doesn't fail the scan.
                }
                Err(e) => return Err(e),
            }
        }

        scan.events_upserted = upserted;
        scan.competition_count = competition_count;
        scan.training_count = training_count;
        Ok(())
    }

    /// Returns `Some(is_competition)` if the event was upserted, `None` if
    /// it was skipped at a per-event guard (not an orchestrator failure).
    async fn process_one_event(
        &self,
        source: &Source,
        event: &ExtractedEvent,
        matcher: &VenueMatcher,
        geocoder: &Geocoder,
    ) -> Result<Option<bool>> {
        let Some(date_start) = parse_event_date(&event.date_start) else {
            warn!(source = %source.key, date = %event.date_start, "unparseable date, skipping event");
            return Ok(None);
        };

        let canonical_venue_name = normalise_venue_name(&event.venue_name);
        let canonical_postcode = event.venue_postcode.as_deref().and_then(normalise_postcode);

        let (discipline, is_competition) = classify(&event.name, event.discipline.as_deref(), event.description.as_deref());
        record_classifier_metric(discipline, event.discipline.as_deref());

        let venue_id = matcher
            .resolve(self.storage.as_ref(), &canonical_venue_name, canonical_postcode.as_deref())
            .await?;

        if let Some(venue) = self.storage.get_venue_by_id(venue_id).await? {
            geocoder.resolve(self.storage.as_ref(), &venue, event).await?;
        }

        let url = event.url.as_deref().and_then(sanitize_url);
        let date_end = event.date_end.as_deref().and_then(parse_event_date);

        let has_pony_classes = event.has_pony_classes.unwrap_or_else(|| {
            let classes_text = event.classes.as_deref().unwrap_or_default().join(" ");
            detect_pony_classes(&event.name) || detect_pony_classes(&classes_text)
        });

        let now = Utc::now();
        let competition = Competition {
            id: Uuid::new_v4(),
            source_id: source.id,
            name: event.name.clone(),
            date_start,
            date_end,
            venue_id,
            is_competition,
            discipline: discipline.map(str::to_string),
            has_pony_classes,
            url,
            classes: event.classes.clone().unwrap_or_default(),
            description: event.description.clone(),
            raw_extract: serde_json::to_value(event).ok(),
            first_seen_at: now,
            last_seen_at: now,
        };

        self.storage.upsert_competition(&competition).await?;
        Ok(Some(is_competition))
    }
}

fn record_classifier_metric(discipline: Option<&str>, raw_hint: Option<&str>) {
    let name = match discipline {
        Some(crate::normalize::discipline::TRAINING) => metrics::MetricName::ClassifierTraining,
        Some(crate::normalize::discipline::VENUE_HIRE) => metrics::MetricName::ClassifierVenueHire,
        Some(_) if raw_hint.and_then(normalise_discipline).is_some() => metrics::MetricName::ClassifierHintTrusted,
        Some(_) => metrics::MetricName::ClassifierInferred,
        None => metrics::MetricName::ClassifierUnknown,
    };
    metrics::increment(name);
}
