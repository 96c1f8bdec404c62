//! Per-upstream-host token-bucket rate limiting (§5): exceeding the bucket
//! suspends the caller rather than failing the request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use reqwest::Url;
use tokio::sync::Mutex;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

struct Inner {
    capacity_per_sec: f64,
    buckets: Mutex<HashMap<String, Bucket>>,
}

/// One limiter shared across every outbound call in a process — parser
/// fetches and geocoder lookups alike; each upstream host gets its own
/// independent bucket, keyed by host name.
#[derive(Clone)]
pub struct HostRateLimiter {
    inner: Arc<Inner>,
}

impl HostRateLimiter {
    pub fn new(requests_per_sec: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity_per_sec: requests_per_sec as f64,
                buckets: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Suspends until a token is available for `url`'s host.
    pub async fn acquire(&self, url: &str) {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        loop {
            let wait = {
                let mut buckets = self.inner.buckets.lock().await;
                let now = Instant::now();
                let bucket = buckets.entry(host.clone()).or_insert_with(|| Bucket {
                    tokens: self.inner.capacity_per_sec,
                    last_refill: now,
                });

                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.inner.capacity_per_sec)
                    .min(self.inner.capacity_per_sec);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - bucket.tokens;
                    Some(Duration::from_secs_f64(deficit / self.inner.capacity_per_sec))
                }
            };

            match wait {
                None => return,
                Some(duration) => {
                    crate::observability::metrics::record_rate_limit_wait(&host);
                    tokio::time::sleep(duration.max(Duration::from_millis(1))).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_immediate() {
        let limiter = HostRateLimiter::new(4);
        let start = Instant::now();
        limiter.acquire("https://example.com/events").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn distinct_hosts_have_independent_buckets() {
        let limiter = HostRateLimiter::new(1);
        limiter.acquire("https://a.example.com/events").await;
        let start = Instant::now();
        limiter.acquire("https://b.example.com/events").await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
