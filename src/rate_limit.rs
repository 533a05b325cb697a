//! Per-client request rate limiting.
//!
//! A fixed-window counter store protecting the authentication endpoints from
//! brute force. Each client key (derived from the forwarded address) gets one
//! counter per window; the quota it is compared against depends on the
//! endpoint class, so login and registration are throttled much harder than
//! the gateway's internal validation calls.
//!
//! # Window semantics
//!
//! The window is approximate: when it elapses, every counter is cleared in
//! one blunt sweep on the next check, instead of tracking a precise sliding
//! window per client. A burst that straddles the boundary can therefore get
//! up to twice the quota. This is an accepted trade-off carried over from the
//! original portal, not something to tighten.
//!
//! The limiter is advisory request shaping. It composes with credential
//! checking and never replaces it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Which quota applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointClass {
    /// Login attempts: strict
    Login,
    /// Registration attempts: strictest
    Register,
    /// Gateway validation calls: effectively unbounded
    Validate,
    /// Any other authentication endpoint
    Other,
}

impl EndpointClass {
    /// Requests allowed per window for this class.
    pub fn limit(self) -> u32 {
        match self {
            EndpointClass::Login => 5,
            EndpointClass::Register => 3,
            EndpointClass::Validate => 1000,
            EndpointClass::Other => 10,
        }
    }
}

/// Outcome of a rate limit check, with the metadata the HTTP layer turns
/// into `X-RateLimit-*` headers and the 429 retry hint.
#[derive(Debug, Clone)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub window_secs: u64,
    pub retry_after_secs: u64,
    /// Unix milliseconds at which the current window resets
    pub reset_at_ms: i64,
}

/// Counter state for the current window.
struct WindowState {
    window_start: DateTime<Utc>,
    counts: HashMap<String, u32>,
}

/// Fixed-window rate limiter.
///
/// Explicitly constructed and injected through `AppState`; there is no
/// process-wide singleton. Denied requests still consume quota, matching the
/// original interceptor's increment-then-compare behavior.
pub struct RateLimiter {
    window: Duration,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    pub fn new(window: Duration, now: DateTime<Utc>) -> Self {
        Self {
            window,
            state: Mutex::new(WindowState {
                window_start: now,
                counts: HashMap::new(),
            }),
        }
    }

    /// Count a request for `key` and decide whether it is within quota.
    ///
    /// The clock is caller-supplied so tests can step through windows
    /// without sleeping.
    pub fn check(&self, key: &str, class: EndpointClass, now: DateTime<Utc>) -> RateDecision {
        let limit = class.limit();
        let window_secs = self.window.as_secs();

        let mut state = self.state.lock().expect("rate limiter lock poisoned");

        // Blunt clear-all once the window has elapsed
        if (now - state.window_start).num_seconds() >= window_secs as i64 {
            state.counts.clear();
            state.window_start = now;
        }

        let count = state.counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        let current = *count;

        let reset_at = state.window_start
            + chrono::TimeDelta::seconds(window_secs as i64);
        let retry_after_secs = (reset_at - now).num_seconds().max(1) as u64;

        RateDecision {
            allowed: current <= limit,
            limit,
            remaining: limit.saturating_sub(current),
            window_secs,
            retry_after_secs,
            reset_at_ms: reset_at.timestamp_millis(),
        }
    }
}
