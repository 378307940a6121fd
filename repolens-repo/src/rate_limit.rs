//! Rate-limit bookkeeping for the hosting API
//!
//! One [`RateLimitState`] belongs to one client instance. It decides, before
//! every request, whether the API may be used, whether the caller has to wait
//! for a quota reset, or whether the client has switched to the local-clone
//! fallback for good.

use repolens_core::GitHubConfig;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Request strategy of a client instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Use the REST API
    ApiPreferred,
    /// Never contact the API again; use the local clone where possible
    LocalFallback,
}

/// Thresholds governing the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub low_water_mark: u32,
    pub min_interval: Duration,
    pub max_reset_wait: Duration,
}

impl From<&GitHubConfig> for RateLimitPolicy {
    fn from(config: &GitHubConfig) -> Self {
        Self {
            low_water_mark: config.low_water_mark,
            min_interval: Duration::from_millis(config.min_request_interval_ms),
            max_reset_wait: Duration::from_secs(config.max_reset_wait_seconds),
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from(&GitHubConfig::default())
    }
}

/// What to do before issuing the next request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Send the request after sleeping `delay` (pacing, possibly zero)
    Proceed { delay: Duration },
    /// Quota is nearly exhausted; sleep until the reset, then send
    WaitForReset { delay: Duration },
    /// Do not contact the API
    UseFallback,
}

#[derive(Debug)]
pub struct RateLimitState {
    policy: RateLimitPolicy,
    mode: RequestMode,
    /// Unknown until the first response carries the header
    remaining: Option<u32>,
    /// Epoch seconds
    reset_at: Option<i64>,
    last_request: Option<Instant>,
}

impl RateLimitState {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            mode: RequestMode::ApiPreferred,
            remaining: None,
            reset_at: None,
            last_request: None,
        }
    }

    /// A state that never uses the API, e.g. when no access token is configured
    pub fn fallback_only(policy: RateLimitPolicy) -> Self {
        Self {
            mode: RequestMode::LocalFallback,
            ..Self::new(policy)
        }
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn reset_at(&self) -> Option<i64> {
        self.reset_at
    }

    /// Decide how to handle the next request.
    ///
    /// `now_epoch` is wall-clock seconds (compared against the reset header),
    /// `now` the monotonic instant used for pacing.
    pub fn decide(&mut self, now_epoch: i64, now: Instant) -> Decision {
        if self.mode == RequestMode::LocalFallback {
            return Decision::UseFallback;
        }

        if let Some(remaining) = self.remaining {
            if remaining <= self.policy.low_water_mark {
                let wait = self
                    .reset_at
                    .filter(|reset| *reset > now_epoch)
                    .map(|reset| Duration::from_secs((reset - now_epoch) as u64))
                    .filter(|wait| *wait <= self.policy.max_reset_wait);

                return match wait {
                    Some(wait) => Decision::WaitForReset {
                        delay: wait + Duration::from_secs(1),
                    },
                    None => {
                        self.enter_fallback("quota at or below low-water mark");
                        Decision::UseFallback
                    }
                };
            }
        }

        let delay = self
            .last_request
            .map(|last| {
                self.policy
                    .min_interval
                    .saturating_sub(now.saturating_duration_since(last))
            })
            .unwrap_or(Duration::ZERO);

        Decision::Proceed { delay }
    }

    /// The reset time has passed; assume a fresh quota until the next response says otherwise
    pub fn reset_elapsed(&mut self) {
        info!("Rate-limit window reset, resuming API requests");
        self.remaining = None;
        self.reset_at = None;
    }

    pub fn record_request(&mut self, at: Instant) {
        self.last_request = Some(at);
    }

    /// Bookkeeping from the `X-RateLimit-Remaining` / `X-RateLimit-Reset` headers
    pub fn update(&mut self, remaining: Option<u32>, reset_at: Option<i64>) {
        if remaining.is_some() {
            self.remaining = remaining;
        }
        if reset_at.is_some() {
            self.reset_at = reset_at;
        }
    }

    /// Switch to the local-clone fallback; irreversible
    pub fn enter_fallback(&mut self, reason: &str) {
        if self.mode != RequestMode::LocalFallback {
            warn!(
                reason,
                remaining = ?self.remaining,
                reset_at = ?self.reset_at,
                "Switching to local clone fallback for the rest of this session"
            );
            self.mode = RequestMode::LocalFallback;
        }
    }
}

/// Whether a non-2xx response is the platform explicitly refusing for quota reasons
pub fn is_rate_limit_rejection(status: u16, body: &str) -> bool {
    (status == 403 || status == 429) && body.to_lowercase().contains("rate limit exceeded")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RateLimitPolicy {
        RateLimitPolicy {
            low_water_mark: 10,
            min_interval: Duration::from_millis(100),
            max_reset_wait: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_fresh_state_proceeds_without_delay() {
        let mut state = RateLimitState::new(policy());
        assert_eq!(
            state.decide(1_000, Instant::now()),
            Decision::Proceed {
                delay: Duration::ZERO
            }
        );
    }

    #[test]
    fn test_pacing_enforces_min_interval() {
        let mut state = RateLimitState::new(policy());
        let start = Instant::now();
        state.record_request(start);

        match state.decide(1_000, start + Duration::from_millis(30)) {
            Decision::Proceed { delay } => assert_eq!(delay, Duration::from_millis(70)),
            other => panic!("unexpected decision: {other:?}"),
        }

        match state.decide(1_000, start + Duration::from_millis(250)) {
            Decision::Proceed { delay } => assert_eq!(delay, Duration::ZERO),
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_low_quota_with_near_reset_waits() {
        let mut state = RateLimitState::new(policy());
        state.update(Some(10), Some(1_030));

        assert_eq!(
            state.decide(1_000, Instant::now()),
            Decision::WaitForReset {
                delay: Duration::from_secs(31)
            }
        );
        assert_eq!(state.mode(), RequestMode::ApiPreferred);

        state.reset_elapsed();
        assert!(matches!(
            state.decide(1_031, Instant::now()),
            Decision::Proceed { .. }
        ));
    }

    #[test]
    fn test_low_quota_with_distant_reset_falls_back_for_good() {
        let mut state = RateLimitState::new(policy());
        state.update(Some(3), Some(10_000));

        assert_eq!(state.decide(1_000, Instant::now()), Decision::UseFallback);
        assert_eq!(state.mode(), RequestMode::LocalFallback);

        // A refreshed quota does not bring the API back
        state.update(Some(5_000), Some(20_000));
        assert_eq!(state.decide(1_000, Instant::now()), Decision::UseFallback);
    }

    #[test]
    fn test_low_quota_without_reset_falls_back() {
        let mut state = RateLimitState::new(policy());
        state.update(Some(0), None);
        assert_eq!(state.decide(1_000, Instant::now()), Decision::UseFallback);
    }

    #[test]
    fn test_quota_above_threshold_proceeds() {
        let mut state = RateLimitState::new(policy());
        state.update(Some(11), Some(10_000));
        assert!(matches!(
            state.decide(1_000, Instant::now()),
            Decision::Proceed { .. }
        ));
    }

    #[test]
    fn test_fallback_only_state() {
        let mut state = RateLimitState::fallback_only(policy());
        assert_eq!(state.decide(0, Instant::now()), Decision::UseFallback);
    }

    #[test]
    fn test_rate_limit_rejection_detection() {
        assert!(is_rate_limit_rejection(
            403,
            r#"{"message":"API rate limit exceeded for 1.2.3.4."}"#
        ));
        assert!(is_rate_limit_rejection(429, "Rate Limit Exceeded"));
        assert!(!is_rate_limit_rejection(403, "Resource not accessible"));
        assert!(!is_rate_limit_rejection(500, "rate limit exceeded"));
    }
}
