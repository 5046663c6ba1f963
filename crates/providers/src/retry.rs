//! Bounded exponential backoff for the two retriable LLM error kinds
//! (spec §4.7: `Timeout` and `Transport` retry; `ProviderError` does not).

use std::time::Duration;

use briefing_domain::error::{Error, Result};

/// Retry an async operation up to `max_retries` additional times
/// (`max_retries + 1` attempts total) with exponential backoff, doubling
/// from `base_delay` each attempt. Non-retriable errors (anything where
/// [`Error::is_retriable`] is `false`) are returned immediately.
pub async fn with_backoff<F, Fut, T>(
    max_retries: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retriable() && attempt < max_retries => {
                let delay = base_delay * 2u32.pow(attempt);
                tracing::warn!(attempt, error = %e, "retrying LLM call after backoff");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_retriable_errors_up_to_bound() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_backoff(2, Duration::from_millis(1), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::LlmTimeout("slow".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3); // initial + 2 retries
    }

    #[tokio::test]
    async fn does_not_retry_provider_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_backoff(5, Duration::from_millis(1), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(Error::LlmProviderError {
                    provider: "anthropic".into(),
                    message: "bad request".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let result = with_backoff(3, Duration::from_millis(1), || async { Ok::<_, Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
