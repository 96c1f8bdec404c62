use catalog_scraper::config::Config;
use catalog_scraper::geocode::{recompute_distances_for_new_home, GeocodeClient, ReqwestGeocodeClient};
use catalog_scraper::observability::{logging, metrics};
use catalog_scraper::parser::registry::build_default_registry;
use catalog_scraper::scheduler::{Scheduler, Trigger};
use catalog_scraper::sources::seed_sources;
use catalog_scraper::venues::seed::{seed_venues, AMBIGUOUS_VENUE_NAMES};
use catalog_scraper::Orchestrator;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "catalog-scraper", about = "Ingest and normalization pipeline for the equestrian competition catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the scheduler daemon: a daily scan of every enabled source.
    Serve,
    /// Runs a single manual scan and exits. Skips the discipline audit.
    Scan {
        /// Source key to scan. Omit to scan every enabled source.
        #[arg(long)]
        source: Option<String>,
    },
    /// Geocodes a new home postcode and recomputes every venue's distance.
    UpdateHomePostcode {
        postcode: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init_logging(&config.log_level);
    metrics::install_recorder();

    let storage = Arc::new(catalog_core::DatabaseManager::connect().await?);
    seed_sources(storage.as_ref()).await?;
    seed_venues(storage.as_ref()).await?;

    let ambiguous_venue_names: HashSet<String> = AMBIGUOUS_VENUE_NAMES.iter().map(|s| s.to_string()).collect();

    let rate_limiter = catalog_scraper::rate_limit::HostRateLimiter::new(config.http_rate_per_host);
    let geocode_primary: Arc<dyn GeocodeClient> = Arc::new(ReqwestGeocodeClient::new(
        config.geocoder_primary_url.clone(),
        rate_limiter.clone(),
    ));
    let geocode_fallback: Arc<dyn GeocodeClient> = Arc::new(ReqwestGeocodeClient::new(
        config.geocoder_fallback_url.clone(),
        rate_limiter.clone(),
    ));

    let home_coordinates = geocode_primary
        .lookup_postcode(&config.home_postcode)
        .await
        .ok()
        .flatten();

    let registry = build_default_registry(config.generic_extractor_url.clone(), config.generic_extractor_model.clone());

    let orchestrator = Orchestrator {
        storage: storage.clone(),
        parsers: Arc::new(registry),
        http: reqwest::Client::new(),
        rate_limiter,
        geocode_primary,
        geocode_fallback,
        home_postcode: config.home_postcode.clone(),
        home_coordinates,
        ambiguous_venue_names,
        scan_timeout: config.scan_timeout,
    };

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => run_daemon(storage, orchestrator, &config).await?,
        Command::Scan { source } => run_manual_scan(storage.as_ref(), &orchestrator, source).await?,
        Command::UpdateHomePostcode { postcode } => update_home_postcode(storage.as_ref(), &orchestrator, &postcode).await?,
    }

    Ok(())
}

async fn run_daemon(
    storage: Arc<catalog_core::SqliteStorage>,
    orchestrator: Orchestrator,
    config: &Config,
) -> anyhow::Result<()> {
    let scheduler = Scheduler::new(storage, orchestrator, &config.scan_schedule, config.scan_concurrency)?;
    let (_tx, rx) = mpsc::channel::<Trigger>(16);

    info!(schedule = %config.scan_schedule, "scheduler starting");
    scheduler.run(rx, shutdown_signal()).await;
    info!("scheduler stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install ctrl-c handler, shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}

async fn run_manual_scan(storage: &dyn catalog_core::Storage, orchestrator: &Orchestrator, source_key: Option<String>) -> anyhow::Result<()> {
    let sources = match source_key {
        Some(key) => {
            let source = storage
                .get_source_by_key(&key)
                .await?
                .ok_or_else(|| anyhow::anyhow!("unknown source key: {key}"))?;
            vec![source]
        }
        None => storage.list_enabled_sources().await?,
    };

    for source in sources {
        let outcome = orchestrator.run_scan(&source, false).await?;
        info!(source = %source.key, status = ?outcome.scan.status, events = outcome.scan.events_upserted, "manual scan finished");
    }
    Ok(())
}

async fn update_home_postcode(storage: &dyn catalog_core::Storage, orchestrator: &Orchestrator, postcode: &str) -> anyhow::Result<()> {
    let coordinates = orchestrator
        .geocode_primary
        .lookup_postcode(postcode)
        .await
        .map_err(|e| anyhow::anyhow!("failed to geocode new home postcode: {e}"))?
        .ok_or_else(|| anyhow::anyhow!("postcode {postcode} not found"))?;

    recompute_distances_for_new_home(storage, coordinates).await?;

    info!(postcode, "home postcode updated, distances recomputed");
    Ok(())
}
