pub mod client;

pub use client::{Coordinates, GeocodeClient, ReqwestGeocodeClient, StubGeocodeClient};

use catalog_core::geo::{great_circle_distance_miles, in_uk_bounding_box};
use catalog_core::{ExtractedEvent, Result, Storage, Venue};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves coordinates for a venue via the cascade in §4.4, writing a
/// successful result back to the venue and recomputing `distance_miles`.
/// Failures are silent: the venue is left coordinate-less and retried on
/// the next scan. Rate limiting and 429/5xx retry live on the concrete
/// `ReqwestGeocodeClient` behind `primary`/`fallback`, since the trait
/// object here doesn't know which calls are even real HTTP (`StubGeocodeClient`
/// needs neither).
#[derive(Clone)]
pub struct Geocoder {
    pub primary: Arc<dyn GeocodeClient>,
    pub fallback: Arc<dyn GeocodeClient>,
    pub home_postcode: String,
    pub home_coordinates: Option<Coordinates>,
}

impl Geocoder {
    pub async fn resolve(
        &self,
        storage: &dyn Storage,
        venue: &Venue,
        extracted: &ExtractedEvent,
    ) -> Result<()> {
        if venue.has_coordinates() {
            return Ok(());
        }

        let coordinates = self.cascade(venue, extracted).await;
        let Some(coordinates) = coordinates else {
            return Ok(());
        };

        let distance = self
            .home_coordinates
            .map(|home| great_circle_distance_miles(home.latitude, home.longitude, coordinates.latitude, coordinates.longitude));

        storage
            .update_venue_location(
                venue.id,
                venue.postcode.as_deref(),
                Some(coordinates.latitude),
                Some(coordinates.longitude),
                distance,
            )
            .await
    }

    async fn cascade(&self, venue: &Venue, extracted: &ExtractedEvent) -> Option<Coordinates> {
        use crate::observability::metrics::{increment, MetricName};

        if let (Some(latitude), Some(longitude)) = (extracted.latitude, extracted.longitude) {
            if in_uk_bounding_box(latitude, longitude) {
                increment(MetricName::GeocoderParserProvided);
                return Some(Coordinates { latitude, longitude });
            }
        }

        if let Some(postcode) = &venue.postcode {
            if let Some(coords) = self.try_lookup(self.primary.as_ref(), postcode).await {
                increment(MetricName::GeocoderPrimaryHit);
                return Some(coords);
            }
            if let Some(coords) = self.try_lookup(self.fallback.as_ref(), postcode).await {
                increment(MetricName::GeocoderFallbackHit);
                return Some(coords);
            }
        }

        match self.try_freeform(self.fallback.as_ref(), &venue.canonical_name).await {
            Some(coords) => {
                increment(MetricName::GeocoderFreeformHit);
                Some(coords)
            }
            None => {
                increment(MetricName::GeocoderMiss);
                None
            }
        }
    }

    async fn try_lookup(&self, client: &dyn GeocodeClient, postcode: &str) -> Option<Coordinates> {
        match client.lookup_postcode(postcode).await {
            Ok(Some(coords)) if in_uk_bounding_box(coords.latitude, coords.longitude) => Some(coords),
            Ok(Some(_)) => {
                debug!(postcode, "geocoder returned out-of-box coordinates, dropping");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(postcode, error = %e, "geocoder lookup failed, treating as miss");
                None
            }
        }
    }

    async fn try_freeform(&self, client: &dyn GeocodeClient, query: &str) -> Option<Coordinates> {
        match client.lookup_freeform(query).await {
            Ok(Some(coords)) if in_uk_bounding_box(coords.latitude, coords.longitude) => Some(coords),
            Ok(_) => None,
            Err(e) => {
                warn!(query, error = %e, "freeform geocoder lookup failed, treating as miss");
                None
            }
        }
    }
}

/// Recomputes `distance_miles` on every venue with coordinates, backing
/// the "update home postcode" operation.
pub async fn recompute_distances_for_new_home(
    storage: &dyn Storage,
    home_coordinates: Coordinates,
) -> Result<()> {
    storage
        .recompute_all_distances(home_coordinates.latitude, home_coordinates.longitude)
        .await
}
