//! Bounded retry with backoff around a single HTTP call.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::api::transport::HttpResponse;
use crate::error::{Error, Result};

/// Largest shift applied to the base delay by the exponential strategies.
const MAX_BACKOFF_SHIFT: u32 = 30;

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Constant,
    Linear,
    Exponential,
    #[default]
    ExponentialJitter,
}

/// What to do with a non-2xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Explicitly listed as permanent; never retried.
    Permanent,
    /// Listed as retryable, or any other 5xx.
    Retryable,
    /// Any other non-2xx; fails without retry.
    Fatal,
}

/// Retry policy for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub strategy: BackoffStrategy,
    pub max_delay: Duration,
    pub retryable_codes: Vec<u16>,
    pub permanent_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            strategy: BackoffStrategy::ExponentialJitter,
            max_delay: Duration::from_secs(30),
            retryable_codes: vec![408, 429, 500, 502, 503, 504],
            permanent_codes: vec![400, 401, 403, 404],
        }
    }
}

impl RetryPolicy {
    /// Classify a non-2xx status code.
    pub fn classify(&self, status: u16) -> StatusClass {
        if self.permanent_codes.contains(&status) {
            StatusClass::Permanent
        } else if self.retryable_codes.contains(&status) || (500..600).contains(&status) {
            StatusClass::Retryable
        } else {
            StatusClass::Fatal
        }
    }

    /// Delay to wait after failed attempt `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::Constant => self.base_delay,
            BackoffStrategy::Linear => self
                .base_delay
                .checked_mul(attempt)
                .unwrap_or(self.max_delay)
                .min(self.max_delay),
            BackoffStrategy::Exponential => self.exponential_cap(attempt),
            BackoffStrategy::ExponentialJitter => {
                let cap = self.exponential_cap(attempt).as_millis() as u64;
                if cap == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rand::thread_rng().gen_range(0..=cap))
            }
        }
    }

    fn exponential_cap(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_BACKOFF_SHIFT);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `send` until it succeeds, fails permanently, or attempts run out.
///
/// `context` names the request in logs and errors. At most
/// `policy.max_retries + 1` attempts are made.
pub async fn execute_with_retry<F, Fut>(
    policy: &RetryPolicy,
    context: &str,
    send: F,
) -> Result<HttpResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse>>,
{
    retry_loop(policy, context, &[], send, sleep).await
}

/// Like [`execute_with_retry`], but a status in `accept` is handed back as a
/// response on first sight, whatever the policy says about it.
pub async fn execute_with_retry_accepting<F, Fut>(
    policy: &RetryPolicy,
    context: &str,
    accept: &[u16],
    send: F,
) -> Result<HttpResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse>>,
{
    retry_loop(policy, context, accept, send, sleep).await
}

async fn retry_loop<F, Fut, P, PFut>(
    policy: &RetryPolicy,
    context: &str,
    accept: &[u16],
    mut send: F,
    mut pause: P,
) -> Result<HttpResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse>>,
    P: FnMut(Duration) -> PFut,
    PFut: Future<Output = ()>,
{
    let mut attempt: u32 = 0;

    loop {
        let attempts_left = attempt < policy.max_retries;

        match send().await {
            Ok(response) if response.is_success() || accept.contains(&response.status) => {
                return Ok(response)
            }
            Ok(response) => {
                let status = response.status;
                match policy.classify(status) {
                    StatusClass::Retryable if attempts_left => {
                        tracing::debug!(
                            "{} returned HTTP {} (attempt {}/{})",
                            context,
                            status,
                            attempt + 1,
                            policy.max_retries + 1
                        );
                    }
                    _ => return Err(Error::status(status, context)),
                }
            }
            Err(e) => {
                let message = match e {
                    Error::Transport(message) => message,
                    other => other.to_string(),
                };
                if !attempts_left {
                    return Err(Error::Transport(format!(
                        "{} gave no response after {} attempt(s): {}",
                        context,
                        attempt + 1,
                        message
                    )));
                }
                tracing::debug!(
                    "{} transport failure (attempt {}/{}): {}",
                    context,
                    attempt + 1,
                    policy.max_retries + 1,
                    message
                );
            }
        }

        let delay = policy.delay_for(attempt);
        tracing::debug!("Retrying {} in {:?}", context, delay);
        pause(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: Vec::new(),
        }
    }

    fn policy(strategy: BackoffStrategy) -> RetryPolicy {
        RetryPolicy {
            strategy,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_default_policy() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 3);
        assert_eq!(p.base_delay, Duration::from_millis(500));
        assert_eq!(p.strategy, BackoffStrategy::ExponentialJitter);
        assert_eq!(p.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_classify() {
        let p = RetryPolicy::default();
        assert_eq!(p.classify(400), StatusClass::Permanent);
        assert_eq!(p.classify(404), StatusClass::Permanent);
        assert_eq!(p.classify(429), StatusClass::Retryable);
        assert_eq!(p.classify(503), StatusClass::Retryable);
        assert_eq!(p.classify(507), StatusClass::Retryable);
        assert_eq!(p.classify(330), StatusClass::Fatal);
        assert_eq!(p.classify(418), StatusClass::Fatal);

        let p = RetryPolicy {
            permanent_codes: vec![501],
            ..RetryPolicy::default()
        };
        assert_eq!(p.classify(501), StatusClass::Permanent);
    }

    #[test]
    fn test_constant_and_linear_delays() {
        let p = policy(BackoffStrategy::Constant);
        assert_eq!(p.delay_for(0), Duration::from_millis(500));
        assert_eq!(p.delay_for(7), Duration::from_millis(500));

        let p = policy(BackoffStrategy::Linear);
        assert_eq!(p.delay_for(0), Duration::ZERO);
        assert_eq!(p.delay_for(3), Duration::from_millis(1500));
        assert_eq!(p.delay_for(1000), Duration::from_secs(30));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let p = policy(BackoffStrategy::Exponential);
        assert_eq!(p.delay_for(0), Duration::from_millis(500));
        assert_eq!(p.delay_for(2), Duration::from_millis(2000));
        assert_eq!(p.delay_for(10), Duration::from_secs(30));
        assert_eq!(p.delay_for(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_jitter_delay_within_bounds() {
        let p = policy(BackoffStrategy::ExponentialJitter);
        for attempt in 0..8 {
            let cap = p.exponential_cap(attempt);
            assert!(p.delay_for(attempt) <= cap);
        }

        let zero = RetryPolicy {
            base_delay: Duration::ZERO,
            ..p
        };
        assert_eq!(zero.delay_for(3), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_503_then_success() {
        let p = policy(BackoffStrategy::Constant);
        let attempts = AtomicUsize::new(0);
        let start = Instant::now();

        let result = execute_with_retry(&p, "webasseturls request", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok(response(if n < 2 { 503 } else { 200 })) }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // Exactly two constant delays of 500ms.
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_recovers_from_503s() {
        let p = RetryPolicy::default();
        let attempts = AtomicUsize::new(0);
        let start = Instant::now();

        let result = execute_with_retry(&p, "request", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok(response(if n < 2 { 503 } else { 200 })) }
        })
        .await;

        assert_eq!(result.unwrap().status, 200);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() <= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_waits_exactly_twice() {
        let p = RetryPolicy::default();
        let attempts = AtomicUsize::new(0);
        let delays = Mutex::new(Vec::new());

        let result = retry_loop(
            &p,
            "request",
            &[],
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move { Ok(response(if n < 2 { 503 } else { 200 })) }
            },
            |delay| {
                delays.lock().unwrap().push(delay);
                sleep(delay)
            },
        )
        .await;

        assert_eq!(result.unwrap().status, 200);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);

        let delays = delays.into_inner().unwrap();
        assert_eq!(delays.len(), 2);
        assert!(delays[0] <= Duration::from_millis(500));
        assert!(delays[1] <= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_status_is_not_retried() {
        let p = RetryPolicy {
            retryable_codes: vec![400, 503],
            permanent_codes: vec![401, 403, 404],
            ..RetryPolicy::default()
        };
        let attempts = AtomicUsize::new(0);

        let result = execute_with_retry_accepting(&p, "request", &[400], || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(400)) }
        })
        .await;

        assert_eq!(tokio_test::assert_ok!(result).status, 400);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_status_fails_immediately() {
        let p = RetryPolicy::default();
        let attempts = AtomicUsize::new(0);

        let err = execute_with_retry(&p, "request", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(404)) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlisted_status_fails_immediately() {
        let p = RetryPolicy::default();
        let attempts = AtomicUsize::new(0);

        let err = execute_with_retry(&p, "request", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(330)) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), Some(330));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_status_exhausts_attempts() {
        let p = policy(BackoffStrategy::Exponential);
        let attempts = AtomicUsize::new(0);

        let err = execute_with_retry(&p, "request", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(502)) }
        })
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), Some(502));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_become_network_error() {
        let p = RetryPolicy {
            max_retries: 1,
            ..policy(BackoffStrategy::Constant)
        };
        let attempts = AtomicUsize::new(0);

        let err = execute_with_retry(&p, "request", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Transport("connection reset".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        match err {
            Error::Transport(message) => assert!(message.contains("connection reset")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_then_success() {
        let p = policy(BackoffStrategy::Constant);
        let attempts = AtomicUsize::new(0);

        let result = execute_with_retry(&p, "request", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Error::Transport("timed out".into()))
                } else {
                    Ok(response(200))
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
