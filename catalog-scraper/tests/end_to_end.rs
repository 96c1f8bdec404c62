//! End-to-end scenarios driving the full orchestrator against `MemoryStorage`,
//! exercising the pipeline the way a scheduled scan would: seed, parse,
//! classify, resolve venue, geocode, upsert.

use async_trait::async_trait;
use catalog_core::storage::{CompetitionFilter, MemoryStorage};
use catalog_core::{ExtractedEvent, Result, Source, Storage};
use catalog_scraper::geocode::{Coordinates, GeocodeClient, StubGeocodeClient};
use catalog_scraper::parser::registry::{build_default_registry, ParserRegistry};
use catalog_scraper::parser::{ParseContext, VenueParser};
use catalog_scraper::rate_limit::HostRateLimiter;
use catalog_scraper::sources::seed_sources;
use catalog_scraper::venues::seed::{seed_venues, AMBIGUOUS_VENUE_NAMES};
use catalog_scraper::Orchestrator;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct FixedParser(Vec<ExtractedEvent>);

#[async_trait]
impl VenueParser for FixedParser {
    async fn fetch_and_parse(&self, _source_url: &str, _ctx: &ParseContext<'_>) -> Result<Vec<ExtractedEvent>> {
        Ok(self.0.clone())
    }
}

async fn orchestrator_for(storage: Arc<MemoryStorage>, events: Vec<ExtractedEvent>) -> (Orchestrator, Source) {
    seed_sources(storage.as_ref()).await.unwrap();
    seed_venues(storage.as_ref()).await.unwrap();

    let source = storage.list_enabled_sources().await.unwrap().remove(0);

    let generic: Arc<dyn VenueParser> = Arc::new(FixedParser(vec![]));
    let mut registry = ParserRegistry::new(generic);
    registry.register(source.key.clone(), Arc::new(FixedParser(events)));

    let ambiguous: HashSet<String> = AMBIGUOUS_VENUE_NAMES.iter().map(|s| s.to_string()).collect();
    let primary: Arc<dyn GeocodeClient> = Arc::new(StubGeocodeClient::default());
    let fallback: Arc<dyn GeocodeClient> = Arc::new(StubGeocodeClient::default());

    let orchestrator = Orchestrator {
        storage: storage.clone(),
        parsers: Arc::new(registry),
        http: reqwest::Client::new(),
        rate_limiter: HostRateLimiter::new(1000),
        geocode_primary: primary,
        geocode_fallback: fallback,
        home_postcode: "SW1A 1AA".into(),
        home_coordinates: None,
        ambiguous_venue_names: ambiguous,
        scan_timeout: Duration::from_secs(5),
    };

    (orchestrator, source)
}

#[tokio::test]
async fn seeded_sources_and_venues_are_idempotent() {
    let storage = Arc::new(MemoryStorage::new());
    seed_sources(storage.as_ref()).await.unwrap();
    seed_sources(storage.as_ref()).await.unwrap();
    seed_venues(storage.as_ref()).await.unwrap();
    seed_venues(storage.as_ref()).await.unwrap();

    let sources = storage.list_all_sources().await.unwrap();
    let venues = storage.list_all_venues().await.unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(venues.len(), 3);
}

#[tokio::test]
async fn venue_alias_collapses_across_events() {
    let storage = Arc::new(MemoryStorage::new());
    let events = vec![
        ExtractedEvent {
            name: "Spring Hartpury Show".into(),
            date_start: "2026-05-01".into(),
            venue_name: "Hartpury".into(),
            ..Default::default()
        },
        ExtractedEvent {
            name: "Hartpury Summer Classic".into(),
            date_start: "2026-07-01".into(),
            venue_name: "Hartpury College".into(),
            ..Default::default()
        },
    ];
    let (orchestrator, source) = orchestrator_for(storage.clone(), events).await;
    let outcome = orchestrator.run_scan(&source, false).await.unwrap();
    assert_eq!(outcome.scan.events_upserted, 2);

    let competitions = storage
        .list_competitions(&CompetitionFilter {
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(competitions.len(), 2);
    assert_eq!(competitions[0].venue_id, competitions[1].venue_id);

    let venues = storage.list_all_venues().await.unwrap();
    assert_eq!(venues.len(), 3, "no new venue should have been created");
}

#[tokio::test]
async fn postcode_variants_normalize_to_the_same_shape() {
    let storage = Arc::new(MemoryStorage::new());
    let events = vec![ExtractedEvent {
        name: "Midlands Qualifier".into(),
        date_start: "2026-06-15".into(),
        venue_name: "New Ground Equestrian".into(),
        venue_postcode: Some("le14  2rp".into()),
        ..Default::default()
    }];
    let (orchestrator, source) = orchestrator_for(storage.clone(), events).await;
    orchestrator.run_scan(&source, false).await.unwrap();

    let venues = storage.list_all_venues().await.unwrap();
    let created = venues
        .iter()
        .find(|v| v.canonical_name == "New Ground Equestrian")
        .expect("venue should have been created");
    assert_eq!(created.postcode.as_deref(), Some("LE14 2RP"));
}

#[tokio::test]
async fn junk_venue_guard_produces_tbc_not_a_url() {
    let storage = Arc::new(MemoryStorage::new());
    let events = vec![ExtractedEvent {
        name: "Mystery Clinic".into(),
        date_start: "2026-03-10".into(),
        venue_name: "https://booking.example.com/event?id=42".into(),
        ..Default::default()
    }];
    let (orchestrator, source) = orchestrator_for(storage.clone(), events).await;
    orchestrator.run_scan(&source, false).await.unwrap();

    let venues = storage.list_all_venues().await.unwrap();
    assert!(venues.iter().any(|v| v.canonical_name == catalog_scraper::normalize::TBC));
}

#[tokio::test]
async fn past_events_are_not_dropped() {
    let storage = Arc::new(MemoryStorage::new());
    let events = vec![ExtractedEvent {
        name: "Last Year's Championship".into(),
        date_start: "2020-01-01".into(),
        venue_name: "Arena UK".into(),
        ..Default::default()
    }];
    let (orchestrator, source) = orchestrator_for(storage.clone(), events).await;
    let outcome = orchestrator.run_scan(&source, false).await.unwrap();
    assert_eq!(outcome.scan.events_upserted, 1);
}

#[tokio::test]
async fn rescanning_the_same_event_does_not_duplicate_rows() {
    let storage = Arc::new(MemoryStorage::new());
    let event = ExtractedEvent {
        name: "County Dressage Championships".into(),
        date_start: "2026-09-01".into(),
        venue_name: "Arena UK".into(),
        discipline: Some("dressage".into()),
        ..Default::default()
    };
    let (orchestrator, source) = orchestrator_for(storage.clone(), vec![event.clone()]).await;
    orchestrator.run_scan(&source, false).await.unwrap();

    let generic: Arc<dyn VenueParser> = Arc::new(FixedParser(vec![]));
    let mut registry = ParserRegistry::new(generic);
    registry.register(source.key.clone(), Arc::new(FixedParser(vec![event])));
    let orchestrator_again = Orchestrator {
        parsers: Arc::new(registry),
        ..orchestrator
    };
    orchestrator_again.run_scan(&source, false).await.unwrap();

    let competitions = storage
        .list_competitions(&CompetitionFilter {
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(competitions.len(), 1);
    assert!(competitions[0].first_seen_at <= competitions[0].last_seen_at);
}

#[tokio::test]
async fn default_registry_falls_back_to_generic_for_unknown_source() {
    let registry = build_default_registry(None, None);
    let ctx_http = reqwest::Client::new();
    let ctx = ParseContext { http: &ctx_http };
    let parser = registry.get("completely-unknown-source");
    let events = parser.fetch_and_parse("https://example.com", &ctx).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn distance_is_computed_when_home_coordinates_are_known() {
    let storage = Arc::new(MemoryStorage::new());
    let events = vec![ExtractedEvent {
        name: "Arena UK Qualifier".into(),
        date_start: "2026-04-12".into(),
        venue_name: "Arena UK".into(),
        ..Default::default()
    }];
    let (mut orchestrator, source) = orchestrator_for(storage.clone(), events).await;
    orchestrator.home_coordinates = Some(Coordinates {
        latitude: 51.5014,
        longitude: -0.1419,
    });
    orchestrator.run_scan(&source, false).await.unwrap();

    let venues = storage.list_all_venues().await.unwrap();
    let arena = venues.iter().find(|v| v.canonical_name == "Arena UK").unwrap();
    assert!(arena.distance_miles.is_some());
}
