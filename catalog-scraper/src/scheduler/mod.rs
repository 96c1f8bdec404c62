//! Daily scan scheduler (§4.9): fires a scan of every enabled source at a
//! configured local time, plus accepts on-demand triggers for one source or
//! all of them. A bounded worker pool caps concurrent scans; a source
//! already mid-scan is skipped rather than queued twice.

use crate::pipeline::Orchestrator;
use catalog_core::{Result, Source, Storage};
use chrono::{Local, NaiveTime, Timelike};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

/// An on-demand scan request. `None` means "every enabled source".
pub struct Trigger {
    pub source_id: Option<Uuid>,
}

pub struct Scheduler {
    storage: Arc<dyn Storage>,
    orchestrator: Orchestrator,
    scan_schedule: NaiveTime,
    concurrency: usize,
}

impl Scheduler {
    pub fn new(storage: Arc<dyn Storage>, orchestrator: Orchestrator, scan_schedule: &str, concurrency: usize) -> Result<Self> {
        let scan_schedule = parse_schedule(scan_schedule)?;
        Ok(Self {
            storage,
            orchestrator,
            scan_schedule,
            concurrency: concurrency.max(1),
        })
    }

    /// Runs the scheduler loop until `shutdown` resolves, then gives any
    /// in-flight scans a 10 second grace period before returning.
    pub async fn run(&self, mut triggers: mpsc::Receiver<Trigger>, shutdown: impl std::future::Future<Output = ()>) {
        tokio::pin!(shutdown);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = tokio::task::JoinSet::new();

        loop {
            let sleep_duration = duration_until(self.scan_schedule);
            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.dispatch_all(&semaphore, &mut tasks).await;
                }
                Some(trigger) = triggers.recv() => {
                    self.dispatch_trigger(trigger, &semaphore, &mut tasks).await;
                }
                _ = &mut shutdown => {
                    info!("scheduler received shutdown signal, draining in-flight scans");
                    break;
                }
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_result(result);
                }
            }
        }

        let grace = tokio::time::sleep(Duration::from_secs(10));
        tokio::pin!(grace);
        loop {
            tokio::select! {
                _ = &mut grace => {
                    warn!("shutdown grace period elapsed with scans still running");
                    break;
                }
                maybe_result = tasks.join_next() => {
                    match maybe_result {
                        Some(result) => log_task_result(result),
                        None => break,
                    }
                }
            }
        }
    }

    async fn dispatch_all(&self, semaphore: &Arc<Semaphore>, tasks: &mut tokio::task::JoinSet<()>) {
        let sources = match self.storage.list_enabled_sources().await {
            Ok(sources) => sources,
            Err(e) => {
                error!(error = %e, "failed to list enabled sources for scheduled scan");
                return;
            }
        };
        for source in sources {
            self.spawn_scan(source, true, semaphore.clone(), tasks).await;
        }
    }

    async fn dispatch_trigger(&self, trigger: Trigger, semaphore: &Arc<Semaphore>, tasks: &mut tokio::task::JoinSet<()>) {
        let sources = match trigger.source_id {
            Some(id) => self.sources_matching_id(id).await,
            None => self.storage.list_enabled_sources().await.unwrap_or_default(),
        };
        for source in sources {
            self.spawn_scan(source, false, semaphore.clone(), tasks).await;
        }
    }

    async fn sources_matching_id(&self, id: Uuid) -> Vec<Source> {
        self.storage
            .list_all_sources()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|s| s.id == id)
            .collect()
    }

    async fn spawn_scan(&self, source: Source, triggered_by_scheduler: bool, semaphore: Arc<Semaphore>, tasks: &mut tokio::task::JoinSet<()>) {
        if self.storage.has_running_scan(source.id).await.unwrap_or(false) {
            warn!(source = %source.key, "skipping scan, one already in flight");
            return;
        }
        let orchestrator = self.orchestrator.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("scheduler semaphore closed");
            if let Err(e) = orchestrator.run_scan(&source, triggered_by_scheduler).await {
                error!(source = %source.key, error = %e, "scan invocation failed");
            }
        });
    }
}

fn log_task_result(result: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "scan task panicked");
    }
}

fn parse_schedule(raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| catalog_core::CatalogError::MissingField(format!("invalid SCAN_SCHEDULE value: {raw}")))
}

/// Seconds until the next occurrence of `target` local time, at least 1s
/// away so a schedule set to the current minute doesn't fire twice.
fn duration_until(target: NaiveTime) -> Duration {
    let now = Local::now().time();
    let now_secs = now.num_seconds_from_midnight() as i64;
    let target_secs = target.num_seconds_from_midnight() as i64;
    let mut delta = target_secs - now_secs;
    if delta <= 0 {
        delta += 24 * 3600;
    }
    Duration::from_secs(delta as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm_schedule() {
        let parsed = parse_schedule("03:00").unwrap();
        assert_eq!(parsed.hour(), 3);
        assert_eq!(parsed.minute(), 0);
    }

    #[test]
    fn rejects_malformed_schedule() {
        assert!(parse_schedule("not-a-time").is_err());
    }

    #[test]
    fn duration_until_is_never_zero_or_negative() {
        let now = Local::now().time();
        let duration = duration_until(now);
        assert!(duration.as_secs() >= 23 * 3600);
    }
}
