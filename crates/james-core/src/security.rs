//! Access control and per-user rate limiting.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::domain::UserId;

/// An empty allowlist means the bot is open to everyone; otherwise only the
/// listed user ids are served.
pub fn is_authorized(user_id: Option<UserId>, allowed_users: &[i64]) -> bool {
    if allowed_users.is_empty() {
        return true;
    }
    match user_id {
        Some(id) => allowed_users.contains(&id.0),
        None => false,
    }
}

#[derive(Clone, Copy, Debug)]
struct Bucket {
    tokens: f64,
    refreshed: Instant,
}

/// Token-bucket rate limiter, one bucket per user.
///
/// `requests` tokens refill evenly over `window`; each handled message costs
/// one token.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    enabled: bool,
    capacity: f64,
    refill_per_sec: f64,
    buckets: HashMap<UserId, Bucket>,
}

/// Outcome of a rate-limit check.
#[derive(Clone, Copy, Debug)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

impl RateLimiter {
    pub fn new(enabled: bool, requests: u32, window: Duration) -> Self {
        let capacity = f64::from(requests.max(1));
        Self {
            enabled,
            capacity,
            refill_per_sec: capacity / window.as_secs_f64().max(1e-9),
            buckets: HashMap::new(),
        }
    }

    pub fn check(&mut self, user_id: UserId) -> RateDecision {
        self.check_at(user_id, Instant::now())
    }

    pub fn check_at(&mut self, user_id: UserId, now: Instant) -> RateDecision {
        if !self.enabled {
            return RateDecision::Allowed;
        }

        let bucket = self.buckets.entry(user_id).or_insert(Bucket {
            tokens: self.capacity,
            refreshed: now,
        });

        let elapsed = now.duration_since(bucket.refreshed).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.refreshed = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return RateDecision::Allowed;
        }

        let secs = (1.0 - bucket.tokens) / self.refill_per_sec;
        RateDecision::Limited {
            retry_after: Duration::from_secs_f64(secs.max(0.0)),
        }
    }
}
