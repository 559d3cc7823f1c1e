//! Process-local fixed-window request counter.
//!
//! State lives in this process only: a restart forgets every window and
//! separate instances count independently.

use dashmap::DashMap;
use rand::Rng;
use std::time::{Duration, Instant};

/// Chance that a check also sweeps expired windows.
const CLEANUP_PROBABILITY: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Admin login and management endpoints.
    pub fn admin() -> Self {
        Self {
            name: "admin",
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }

    /// Public read and engagement endpoints.
    pub fn public() -> Self {
        Self {
            name: "public",
            max_requests: 120,
            window: Duration::from_secs(60),
        }
    }

    pub fn post_creation() -> Self {
        Self {
            name: "post_creation",
            max_requests: 10,
            window: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    entries: DashMap<String, WindowEntry>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        if rand::thread_rng().gen_bool(CLEANUP_PROBABILITY) {
            self.purge_expired(now);
        }
        self.check_at(key, now)
    }

    /// Counts one request for `key` at `now`. The request that would exceed
    /// `max_requests` inside the current window is rejected and not counted.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.policy.window;
        let limit = self.policy.max_requests;

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(WindowEntry {
                count: 0,
                window_start: now,
            });

        let mut elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed >= window {
            entry.count = 0;
            entry.window_start = now;
            elapsed = Duration::ZERO;
        }

        let allowed = entry.count < limit;
        if allowed {
            entry.count += 1;
        }

        let decision = RateLimitDecision {
            allowed,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_after: window - elapsed,
        };

        if !allowed {
            tracing::warn!(
                policy = self.policy.name,
                key = %key,
                "Rate limit exceeded"
            );
        }

        decision
    }

    /// Drops every window that has fully elapsed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let window = self.policy.window;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.window_start) < window);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(policy = self.policy.name, removed, "Purged expired rate limit windows");
        }
        removed
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}
