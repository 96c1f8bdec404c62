//! Prometheus-style metrics catalog. A `MetricName` enum eliminates magic
//! strings at call sites and maps to snake_case Prometheus names via
//! `Display`, grounded in the teacher's `observability/metrics.rs`.

use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::fmt;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Installs the process-wide Prometheus recorder exactly once. Safe to
/// call from multiple entry points (CLI subcommands, tests).
pub fn install_recorder() {
    INSTALLED.get_or_init(|| {
        let _ = PrometheusBuilder::new().install();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ScansStarted,
    ScansCompleted,
    ScansFailed,
    ScanDurationSeconds,
    ScanEventsFound,
    ScanEventsUpserted,

    ClassifierTraining,
    ClassifierVenueHire,
    ClassifierHintTrusted,
    ClassifierInferred,
    ClassifierUnknown,

    MatcherExactAlias,
    MatcherPrefixMatch,
    MatcherPostcodeMatch,
    MatcherCreated,

    GeocoderParserProvided,
    GeocoderPrimaryHit,
    GeocoderFallbackHit,
    GeocoderFreeformHit,
    GeocoderMiss,

    RateLimiterWaits,

    DisciplineAuditFixups,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricName::ScansStarted => "catalog_scans_started_total",
            MetricName::ScansCompleted => "catalog_scans_completed_total",
            MetricName::ScansFailed => "catalog_scans_failed_total",
            MetricName::ScanDurationSeconds => "catalog_scan_duration_seconds",
            MetricName::ScanEventsFound => "catalog_scan_events_found",
            MetricName::ScanEventsUpserted => "catalog_scan_events_upserted",

            MetricName::ClassifierTraining => "catalog_classifier_training_total",
            MetricName::ClassifierVenueHire => "catalog_classifier_venue_hire_total",
            MetricName::ClassifierHintTrusted => "catalog_classifier_hint_trusted_total",
            MetricName::ClassifierInferred => "catalog_classifier_inferred_total",
            MetricName::ClassifierUnknown => "catalog_classifier_unknown_total",

            MetricName::MatcherExactAlias => "catalog_matcher_exact_alias_total",
            MetricName::MatcherPrefixMatch => "catalog_matcher_prefix_match_total",
            MetricName::MatcherPostcodeMatch => "catalog_matcher_postcode_match_total",
            MetricName::MatcherCreated => "catalog_matcher_created_total",

            MetricName::GeocoderParserProvided => "catalog_geocoder_parser_provided_total",
            MetricName::GeocoderPrimaryHit => "catalog_geocoder_primary_hit_total",
            MetricName::GeocoderFallbackHit => "catalog_geocoder_fallback_hit_total",
            MetricName::GeocoderFreeformHit => "catalog_geocoder_freeform_hit_total",
            MetricName::GeocoderMiss => "catalog_geocoder_miss_total",

            MetricName::RateLimiterWaits => "catalog_rate_limiter_waits_total",

            MetricName::DisciplineAuditFixups => "catalog_discipline_audit_fixups_total",
        };
        write!(f, "{name}")
    }
}

/// Increments any counter-shaped metric by name. Used by call sites that
/// pick the metric dynamically (the classifier, the matcher) rather than
/// always incrementing a fixed one.
pub fn increment(name: MetricName) {
    metrics::counter!(name.to_string()).increment(1);
}

pub fn record_scan_started() {
    metrics::counter!(MetricName::ScansStarted.to_string()).increment(1);
}

pub fn record_scan_completed(duration_secs: f64, events_found: i64, events_upserted: i64) {
    metrics::counter!(MetricName::ScansCompleted.to_string()).increment(1);
    metrics::histogram!(MetricName::ScanDurationSeconds.to_string()).record(duration_secs);
    metrics::gauge!(MetricName::ScanEventsFound.to_string()).set(events_found as f64);
    metrics::gauge!(MetricName::ScanEventsUpserted.to_string()).set(events_upserted as f64);
}

pub fn record_scan_failed() {
    metrics::counter!(MetricName::ScansFailed.to_string()).increment(1);
}

pub fn record_rate_limit_wait(host: &str) {
    metrics::counter!(MetricName::RateLimiterWaits.to_string(), "host" => host.to_string()).increment(1);
}

pub fn record_discipline_audit_fixups(count: u64) {
    metrics::counter!(MetricName::DisciplineAuditFixups.to_string()).increment(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_snake_case_prometheus_style() {
        assert_eq!(MetricName::ScansStarted.to_string(), "catalog_scans_started_total");
        assert_eq!(MetricName::GeocoderMiss.to_string(), "catalog_geocoder_miss_total");
    }
}
