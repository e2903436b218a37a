//! Circuit breaker guarding the fee-collection sub-flow.
//!
//! The breaker counts consecutive failures. Once the configured threshold
//! is reached it opens and short-circuits every call without running the
//! guarded operation. After a cooldown it admits exactly one half-open
//! probe: a successful probe closes the breaker and resets the counter, a
//! failed probe re-opens it for another cooldown.
//!
//! One instance is shared by all concurrent requests; it is the only
//! intentionally shared mutable state in the service.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Breaker tuning knobs, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the breaker open
    pub failure_threshold: u32,

    /// How long the breaker stays open before admitting a probe
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; failures are counted
    Closed,
    /// Calls are short-circuited until the cooldown elapses
    Open,
    /// One probe call is in flight; its outcome decides the next state
    HalfOpen,
}

/// Error returned by [`CircuitBreaker::execute`].
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// The breaker is open; the guarded operation was not invoked.
    #[error("circuit breaker open")]
    Open,

    /// The guarded operation ran and failed.
    #[error(transparent)]
    Inner(E),
}

#[derive(Debug)]
struct BreakerInner {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Consecutive-failure circuit breaker with a half-open probe.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Current state, for logging and tests.
    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock().expect("breaker lock poisoned");
        if inner.probe_in_flight {
            CircuitState::HalfOpen
        } else if inner.opened_at.is_some() {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// Run `operation` under the breaker.
    ///
    /// While open (and within the cooldown) the operation is not polled
    /// and [`CircuitBreakerError::Open`] is returned immediately. Once
    /// the cooldown elapses a single caller is admitted as the half-open
    /// probe; concurrent callers keep getting `Open` until the probe
    /// resolves.
    pub async fn execute<T, E, Fut>(&self, operation: Fut) -> Result<T, CircuitBreakerError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.try_acquire() {
            return Err(CircuitBreakerError::Open);
        }

        match operation.await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(err) => {
                self.on_failure();
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }

    /// Admission check. Returns false when the call must be short-circuited.
    fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        match inner.opened_at {
            None => true,
            Some(opened_at) => {
                if inner.probe_in_flight {
                    return false;
                }
                if opened_at.elapsed() >= self.config.cooldown {
                    // Half-open: admit exactly this caller as the probe
                    inner.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.probe_in_flight = false;
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        if inner.probe_in_flight {
            // Failed probe: back to open for another cooldown
            inner.probe_in_flight = false;
            inner.opened_at = Some(Instant::now());
            return;
        }
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.config.failure_threshold {
            inner.opened_at = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown: Duration) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown,
        })
    }

    async fn fail(breaker: &CircuitBreaker) -> Result<(), CircuitBreakerError<&'static str>> {
        breaker.execute(async { Err::<(), _>("boom") }).await.map(|_| ())
    }

    #[tokio::test]
    async fn stays_closed_below_threshold() {
        let breaker = breaker(3, Duration::from_secs(60));
        fail(&breaker).await.unwrap_err();
        fail(&breaker).await.unwrap_err();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn opens_at_threshold_and_short_circuits() {
        let breaker = breaker(2, Duration::from_secs(60));
        fail(&breaker).await.unwrap_err();
        fail(&breaker).await.unwrap_err();
        assert_eq!(breaker.state(), CircuitState::Open);

        // Guarded operation must not run while open
        let invoked = std::sync::atomic::AtomicBool::new(false);
        let result = breaker
            .execute(async {
                invoked.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<(), &str>(())
            })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::Open)));
        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let breaker = breaker(2, Duration::from_secs(60));
        fail(&breaker).await.unwrap_err();
        breaker
            .execute(async { Ok::<(), &str>(()) })
            .await
            .unwrap();
        fail(&breaker).await.unwrap_err();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_probe_closes_on_success() {
        let breaker = breaker(1, Duration::from_millis(10));
        fail(&breaker).await.unwrap_err();
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;
        breaker
            .execute(async { Ok::<(), &str>(()) })
            .await
            .unwrap();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn failed_probe_reopens() {
        let breaker = breaker(1, Duration::from_millis(10));
        fail(&breaker).await.unwrap_err();

        tokio::time::sleep(Duration::from_millis(20)).await;
        fail(&breaker).await.unwrap_err();
        assert_eq!(breaker.state(), CircuitState::Open);

        // Immediately after the failed probe the cooldown restarts
        let result: Result<(), _> = breaker.execute(async { Ok::<(), &str>(()) }).await;
        assert!(matches!(result, Err(CircuitBreakerError::Open)));
    }
}
