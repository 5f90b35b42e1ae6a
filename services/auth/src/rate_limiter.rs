//! Login rate limiter for preventing brute force attacks
//!
//! Counts failed logins per key (the normalized email). Too many failures
//! inside the window lock the key for the ban duration; a successful login
//! clears it. Entries whose window and ban have both lapsed are dropped,
//! so keys that stop failing do not accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failed attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    failures: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    fn is_banned(&self, now: Instant) -> bool {
        self.ban_expires.is_some_and(|ban_expires| now < ban_expires)
    }

    /// Neither the failure window nor a ban still applies
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        !self.is_banned(now) && now.duration_since(self.window_start) >= window
    }
}

#[derive(Debug)]
struct RateLimiterState {
    entries: HashMap<String, RateLimiterEntry>,
    last_purge: Instant,
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Arc<Mutex<RateLimiterState>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(RateLimiterState {
                entries: HashMap::new(),
                last_purge: Instant::now(),
            })),
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_seconds)
    }

    /// Whether `key` may attempt a login right now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        let Some(entry) = state.entries.get(key) else {
            return true;
        };

        if entry.is_banned(now) {
            return false;
        }
        if entry.is_stale(now, self.window()) || entry.ban_expires.is_some() {
            state.entries.remove(key);
        }
        true
    }

    /// Count a failed attempt, banning the key once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let window = self.window();

        // Sweep everything at most once per window
        if now.duration_since(state.last_purge) >= window {
            let before = state.entries.len();
            state.entries.retain(|_, entry| !entry.is_stale(now, window));
            state.last_purge = now;
            let purged = before - state.entries.len();
            if purged > 0 {
                debug!("Purged {} stale rate limiter entries", purged);
            }
        }

        let entry = state.entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            failures: 0,
            window_start: now,
            ban_expires: None,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;

        if entry.failures >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
        }
    }

    /// Forget everything about `key`
    pub async fn reset(&self, key: &str) {
        self.state.lock().await.entries.remove(key);
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}
