// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded linear-backoff retry.
//!
//! Attempt `n` (0-based) that fails transiently sleeps `base_delay * (n + 1)`
//! before the next attempt, for at most `max_retries` retries. The sleep
//! suspends only the calling task. There is no cancellation hook: a retry
//! loop runs to completion once started.

use std::borrow::Cow;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use concierge_config::model::RetryConfig;
use concierge_core::ConciergeError;
use tracing::warn;

/// Lowercased message fragments that mark an error as permanent.
const FAIL_FAST_SIGNATURES: &[&str] = &[
    "unauthorized",
    "forbidden",
    "bad request",
    "not configured",
    "invalid",
];

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Whether an error message matches a fail-fast signature.
pub fn is_permanent(message: &str) -> bool {
    let lower = message.to_lowercase();
    FAIL_FAST_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

/// Errors the retry loop can classify as transient or permanent.
///
/// Fail-fast signatures are matched against [`retry_message`], which defaults
/// to the full `Display` text.
///
/// [`retry_message`]: RetryClassify::retry_message
pub trait RetryClassify: Display {
    /// The text fail-fast signatures are matched against.
    fn retry_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl RetryClassify for String {
    fn retry_message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RetryClassify for ConciergeError {
    /// Only the tool's own message for tool failures, so a tool name such as
    /// `invalidate_cache` never reads as a signature.
    fn retry_message(&self) -> Cow<'_, str> {
        match self {
            ConciergeError::Tool { message, .. } => Cow::Borrowed(message),
            other => Cow::Owned(other.to_string()),
        }
    }
}

/// Retry budget and backoff step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay after the failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Run `action` until it succeeds, fails permanently, or retries run out.
    ///
    /// The last error is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut action: F) -> Result<T, E>
    where
        E: RetryClassify,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let err = match action().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if is_permanent(&err.retry_message()) || attempt >= self.max_retries {
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            warn!(
                label,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "tool attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Run `action` under the default policy (2 retries, 500 ms step).
pub async fn with_retry<T, E, F, Fut>(label: &str, action: F) -> Result<T, E>
where
    E: RetryClassify,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryPolicy::default().run(label, action).await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Fails with `message` for the first `failures` calls, then returns the call count.
    fn flaky(
        calls: Arc<AtomicU32>,
        failures: u32,
        message: &'static str,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + Send>> {
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures {
                    Err(format!("{message} (call {n})"))
                } else {
                    Ok(n)
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = with_retry("search", flaky(calls.clone(), 2, "timeout")).await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500 ms + 1000 ms of backoff
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(1500) && elapsed < Duration::from_millis(1600),
            "unexpected backoff total {elapsed:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_when_retries_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_retry("search", flaky(calls.clone(), 10, "connection reset")).await;

        assert_eq!(result, Err("connection reset (call 3)".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn fail_fast_signatures_are_not_retried() {
        for message in [
            "401 Unauthorized",
            "Forbidden",
            "Bad Request: missing field",
            "Gmail not configured",
            "INVALID argument",
        ] {
            let calls = Arc::new(AtomicU32::new(0));
            let start = tokio::time::Instant::now();
            let result = with_retry("gmail", flaky(calls.clone(), 10, message)).await;
            assert!(result.is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 1, "{message} was retried");
            assert!(start.elapsed() < Duration::from_millis(500));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(0, Duration::from_millis(500));
        let result = policy.run("once", flaky(calls.clone(), 1, "timeout")).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    #[tracing_test::traced_test]
    async fn retries_are_logged() {
        let calls = Arc::new(AtomicU32::new(0));
        let _ = with_retry("calendar", flaky(calls, 1, "503 service unavailable")).await;
        assert!(logs_contain("tool attempt failed, retrying"));
        assert!(logs_contain("calendar"));
    }

    #[test]
    fn delay_grows_linearly() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(750));
    }

    #[test]
    fn policy_from_config() {
        let config = RetryConfig {
            max_retries: 4,
            base_delay_ms: 100,
        };
        assert_eq!(
            RetryPolicy::from(&config),
            RetryPolicy::new(4, Duration::from_millis(100))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn tool_name_is_not_matched_against_signatures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry("invalidate_cache", move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err(ConciergeError::tool("invalidate_cache", "503 Service Unavailable"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tool_errors_classify_on_their_message() {
        let transient = ConciergeError::tool("forbidden_words", "connection reset");
        assert_eq!(transient.retry_message(), "connection reset");
        assert!(!is_permanent(&transient.retry_message()));

        let permanent = ConciergeError::tool("web_search", "401 Unauthorized");
        assert!(is_permanent(&permanent.retry_message()));

        let other = ConciergeError::ToolNotFound("wikipedia".into());
        assert_eq!(other.retry_message(), "tool not found: wikipedia");
    }

    #[test]
    fn permanent_detection_is_case_insensitive() {
        assert!(is_permanent("HTTP 403 FORBIDDEN"));
        assert!(!is_permanent("rate limited, try later"));
    }
}
