use std::time::Duration;

use log::debug;

/// Retry an async operation with exponential backoff.
///
/// `max_retries` counts attempts after the first one. Errors for which
/// `should_retry` returns false are returned immediately.
pub async fn retry<F, Fut, T, E, P>(max_retries: u32, should_retry: P, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) if attempt < max_retries && should_retry(&e) => {
                let delay = backoff(attempt);
                debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(attempt.min(6)))
}
