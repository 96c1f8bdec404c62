//! `GeocodeClient` port: the seam that lets the cascade run in tests
//! without network access, grounded in the teacher's `HttpClientPort` /
//! `ReqwestHttp` split.

use crate::rate_limit::HostRateLimiter;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait GeocodeClient: Send + Sync {
    /// Looks up coordinates for a canonical postcode. `Ok(None)` means the
    /// lookup succeeded but found nothing; `Err` means the call itself
    /// failed (timeout, 5xx) and should be treated as a miss upstream.
    async fn lookup_postcode(&self, postcode: &str) -> Result<Option<Coordinates>, String>;

    /// Free-form geocoder fallback, covering Crown Dependencies and
    /// ambiguous cases a postcode lookup can't resolve.
    async fn lookup_freeform(&self, query: &str) -> Result<Option<Coordinates>, String>;
}

pub struct ReqwestGeocodeClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: HostRateLimiter,
}

impl ReqwestGeocodeClient {
    pub fn new(base_url: impl Into<String>, rate_limiter: HostRateLimiter) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            rate_limiter,
        }
    }

    /// Rate-limits and sends a GET to `url`, retrying on 429/5xx up to the
    /// shared retry budget. A fresh token is drawn on every attempt, not
    /// just the first, so a backoff loop against a struggling host doesn't
    /// also hammer it.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response, String> {
        crate::retry::with_retry(
            || async {
                self.rate_limiter.acquire(url).await;
                let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
                if resp.status().is_server_error() || resp.status().as_u16() == 429 {
                    return Err(format!("geocoder returned {}", resp.status()));
                }
                Ok(resp)
            },
            |e: &String| e.starts_with("geocoder returned"),
        )
        .await
    }
}

#[async_trait]
impl GeocodeClient for ReqwestGeocodeClient {
    async fn lookup_postcode(&self, postcode: &str) -> Result<Option<Coordinates>, String> {
        let url = format!("{}/{}", self.base_url, postcode.replace(' ', ""));
        let resp = self.get_with_retry(&url).await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let body: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
        let latitude = body.pointer("/result/latitude").and_then(|v| v.as_f64());
        let longitude = body.pointer("/result/longitude").and_then(|v| v.as_f64());
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some(Coordinates { latitude, longitude })),
            _ => Ok(None),
        }
    }

    async fn lookup_freeform(&self, query: &str) -> Result<Option<Coordinates>, String> {
        let url = format!("{}?q={}", self.base_url, urlencoding_lite(query));
        let resp = self.get_with_retry(&url).await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let body: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
        let latitude = body.pointer("/latitude").and_then(|v| v.as_f64());
        let longitude = body.pointer("/longitude").and_then(|v| v.as_f64());
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some(Coordinates { latitude, longitude })),
            _ => Ok(None),
        }
    }
}

fn urlencoding_lite(raw: &str) -> String {
    raw.replace(' ', "%20")
}

/// In-memory stub used by tests: a fixed table of postcode/query to
/// coordinates, with no network access.
#[derive(Default)]
pub struct StubGeocodeClient {
    pub postcodes: std::collections::HashMap<String, Coordinates>,
    pub freeform: std::collections::HashMap<String, Coordinates>,
}

#[async_trait]
impl GeocodeClient for StubGeocodeClient {
    async fn lookup_postcode(&self, postcode: &str) -> Result<Option<Coordinates>, String> {
        Ok(self.postcodes.get(postcode).copied())
    }

    async fn lookup_freeform(&self, query: &str) -> Result<Option<Coordinates>, String> {
        Ok(self.freeform.get(query).copied())
    }
}
