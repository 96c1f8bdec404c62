//! Retry-with-jitter for upstream HTTP calls (§7): 429/5xx responses get
//! up to 3 attempts total before the caller treats the call as failed.
//! Transport-level failures (timeouts, connection errors) are not retried
//! here; they propagate immediately.

use catalog_core::CatalogError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 200;

/// Retries `attempt_fn` up to [`MAX_ATTEMPTS`] times while `is_retryable`
/// accepts the error it produced. Delay doubles each attempt with up to
/// 50% jitter layered on top, so concurrent callers backing off on the
/// same upstream don't retry in lockstep.
pub async fn with_retry<T, E, F, Fut>(mut attempt_fn: F, is_retryable: impl Fn(&E) -> bool) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS && is_retryable(&e) => {
                let backoff_ms = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                let jitter_ms = rand::thread_rng().gen_range(0..=backoff_ms / 2);
                tokio::time::sleep(Duration::from_millis(backoff_ms + jitter_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends the request built by `make_request` (called fresh each attempt, so
/// retries work even for requests with a body), retrying up to
/// [`MAX_ATTEMPTS`] times on HTTP 429 or 5xx.
pub async fn send_with_retry(
    make_request: impl Fn() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response, CatalogError> {
    with_retry(
        || async {
            let response = make_request().send().await.map_err(CatalogError::Http)?;
            if response.status().is_server_error() || response.status().as_u16() == 429 {
                return Err(CatalogError::Api {
                    message: format!("upstream returned {}", response.status()),
                });
            }
            Ok(response)
        },
        |e| matches!(e, CatalogError::Api { .. }),
    )
    .await
}
