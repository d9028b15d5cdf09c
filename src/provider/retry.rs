//! Retry logic with exponential backoff for provider calls
//!
//! The provider signals temporary capacity exhaustion with HTTP 529; that
//! status (and only that status) is retried, with the wait doubling after
//! each attempt. Every other non-success status fails immediately.

use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;

/// Status the provider uses to signal it is overloaded
pub const OVERLOADED_STATUS: u16 = 529;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, first call included (default: 3)
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds (default: 1000)
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
        }
    }
}

/// Issue a request with bounded retry on the overload status.
///
/// # Arguments
/// * `send` - Closure issuing one attempt of the request
/// * `config` - Retry configuration
/// * `on_retry` - Optional observer invoked before each wait with
///   (attempt number, backoff ms)
///
/// Transport errors are swallowed and retried on non-final attempts and
/// propagated on the last one.
pub async fn send_with_retry<F, Fut, R>(
    send: F,
    config: &RetryConfig,
    mut on_retry: Option<R>,
) -> Result<reqwest::Response, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    R: FnMut(u32, u64),
{
    let mut backoff_ms = config.initial_backoff_ms;

    for attempt in 1..=config.max_attempts {
        match send().await {
            Ok(response) => {
                let status = response.status().as_u16();

                if status == OVERLOADED_STATUS {
                    if attempt == config.max_attempts {
                        return Err(ApiError::Overloaded {
                            attempts: config.max_attempts,
                        });
                    }
                    log::warn!(
                        "Attempt {}/{} failed with 529. Retrying after {}ms...",
                        attempt,
                        config.max_attempts,
                        backoff_ms
                    );
                    if let Some(ref mut observer) = on_retry {
                        observer(attempt, backoff_ms);
                    }
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                    continue;
                }

                if !response.status().is_success() {
                    return Err(ApiError::Upstream { status });
                }

                return Ok(response);
            }
            Err(error) => {
                if attempt == config.max_attempts {
                    return Err(ApiError::Transport(error));
                }
                log::warn!(
                    "Attempt {}/{} failed with transport error: {}. Retrying...",
                    attempt,
                    config.max_attempts,
                    error
                );
            }
        }
    }

    Err(ApiError::RetriesExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http;
    use std::cell::{Cell, RefCell};

    fn response_with_status(status: u16) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body("body")
            .unwrap()
            .into()
    }

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 10,
        }
    }

    #[tokio::test]
    async fn test_success_without_retry() {
        let calls = Cell::new(0u32);
        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Ok(response_with_status(200)) }
            },
            &fast_config(),
            None::<fn(u32, u64)>,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_two_overloads_then_success() {
        let calls = Cell::new(0u32);
        let backoffs = RefCell::new(Vec::new());

        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call <= 2 {
                        Ok(response_with_status(529))
                    } else {
                        Ok(response_with_status(200))
                    }
                }
            },
            &fast_config(),
            Some(|_attempt: u32, backoff: u64| backoffs.borrow_mut().push(backoff)),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.get(), 3);

        // Exactly two waits, the second at least double the first
        let backoffs = backoffs.borrow();
        assert_eq!(backoffs.len(), 2);
        assert!(backoffs[1] >= 2 * backoffs[0]);
    }

    #[tokio::test]
    async fn test_always_overloaded_exhausts_budget() {
        let calls = Cell::new(0u32);
        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Ok(response_with_status(529)) }
            },
            &fast_config(),
            None::<fn(u32, u64)>,
        )
        .await;

        assert_eq!(calls.get(), 3);
        match result {
            Err(ApiError::Overloaded { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected Overloaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_error_status_fails_immediately() {
        let calls = Cell::new(0u32);
        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                async { Ok(response_with_status(401)) }
            },
            &fast_config(),
            None::<fn(u32, u64)>,
        )
        .await;

        assert_eq!(calls.get(), 1);
        match result {
            Err(ApiError::Upstream { status }) => assert_eq!(status, 401),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    // Connecting to port 1 on loopback is refused, which yields a genuine
    // reqwest transport error without any server involvement
    async fn failing_request() -> Result<reqwest::Response, reqwest::Error> {
        reqwest::Client::new().get("http://127.0.0.1:1").send().await
    }

    #[tokio::test]
    async fn test_transport_error_on_final_attempt_propagates() {
        let calls = Cell::new(0u32);
        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                failing_request()
            },
            &fast_config(),
            None::<fn(u32, u64)>,
        )
        .await;

        // All three attempts were made; the last failure came back as-is
        assert_eq!(calls.get(), 3);
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn test_transport_errors_swallowed_on_non_final_attempts() {
        let calls = Cell::new(0u32);
        let result = send_with_retry(
            || {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call <= 2 {
                        failing_request().await
                    } else {
                        Ok(response_with_status(200))
                    }
                }
            },
            &fast_config(),
            None::<fn(u32, u64)>,
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_backoff_ms, 1000);
    }
}
