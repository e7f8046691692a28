//! Bounded retry around a single backend call.
//!
//! Fixed attempt count, fixed pause, no backoff and no jitter. Every failure
//! cause is retried alike. When attempts run out the caller gets a degraded
//! completion carrying the static fallback text and the last error.

use std::time::Duration;

use tracing::warn;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

pub const DEFAULT_FALLBACK: &str = "The reasoning engine is currently over capacity.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub fallback: String,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Outcome of `complete_with_retry`. Never an error.
#[derive(Debug)]
pub enum Completion {
    Answered(LlmResponse),
    Degraded {
        attempts: u32,
        last_error: LlmError,
        fallback: String,
    },
}

impl Completion {
    /// The text to show: the model reply, or the fallback sentence.
    pub fn text(&self) -> &str {
        match self {
            Completion::Answered(resp) => &resp.content,
            Completion::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Completion::Degraded { .. })
    }

    pub fn into_text(self) -> String {
        match self {
            Completion::Answered(resp) => resp.content,
            Completion::Degraded { fallback, .. } => fallback,
        }
    }
}

pub async fn complete_with_retry(
    backend: &dyn LlmBackend,
    req: LlmRequest,
    policy: &RetryPolicy,
) -> Completion {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match backend.complete(req.clone()).await {
            Ok(resp) => return Completion::Answered(resp),
            Err(e) => {
                warn!(
                    backend = backend.name(),
                    model = %req.model,
                    attempt,
                    max_attempts,
                    kind = e.kind(),
                    "Inference attempt failed: {e}"
                );
                if attempt >= max_attempts {
                    return Completion::Degraded {
                        attempts: attempt,
                        last_error: e,
                        fallback: policy.fallback.clone(),
                    };
                }
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Message;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then answers "ok".
    struct FlakyBackend {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyBackend {
        fn new(failures: u32) -> Self {
            Self { failures, calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl LlmBackend for FlakyBackend {
        async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(LlmError::RateLimited("busy".into()));
            }
            Ok(LlmResponse {
                content: "ok".into(),
                model: req.model,
                prompt_tokens: 0,
                completion_tokens: 0,
            })
        }

        fn name(&self) -> &str { "flaky" }
    }

    fn request() -> LlmRequest {
        LlmRequest::new("vision", vec![Message::user("x")])
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_backend_gets_three_attempts_then_fallback() {
        let backend = FlakyBackend::new(u32::MAX);
        let started = tokio::time::Instant::now();

        let completion = complete_with_retry(&backend, request(), &RetryPolicy::default()).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(completion.text(), "The reasoning engine is currently over capacity.");
        assert!(completion.is_degraded());
        match completion {
            Completion::Degraded { attempts, last_error, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error.kind(), "rate_limited");
            }
            Completion::Answered(_) => unreachable!(),
        }
        // One-second pause between each pair of attempts.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_second_attempt() {
        let backend = FlakyBackend::new(1);
        let started = tokio::time::Instant::now();

        let completion = complete_with_retry(&backend, request(), &RetryPolicy::default()).await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(!completion.is_degraded());
        assert_eq!(completion.into_text(), "ok");
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1) && elapsed < Duration::from_secs(2), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_sleep() {
        let backend = FlakyBackend::new(0);
        let started = tokio::time::Instant::now();
        let completion = complete_with_retry(&backend, request(), &RetryPolicy::default()).await;
        assert_eq!(completion.text(), "ok");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let backend = FlakyBackend::new(u32::MAX);
        let policy = RetryPolicy { max_attempts: 0, ..RetryPolicy::default() };
        let completion = complete_with_retry(&backend, request(), &policy).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(completion.is_degraded());
    }
}
