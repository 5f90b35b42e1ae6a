//! Auth service settings (`AUTH_*` environment variables)

use config::ConfigError;
use serde::Deserialize;

use crate::rate_limiter::RateLimiterConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
    pub login_ban_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let defaults = RateLimiterConfig::default();

        common::settings::layered("auth", 5001)?
            .set_default("login_max_attempts", i64::from(defaults.max_attempts))?
            .set_default("login_window_secs", defaults.window_seconds as i64)?
            .set_default("login_ban_secs", defaults.ban_duration_seconds as i64)?
            .build()?
            .try_deserialize()
    }

    pub fn rate_limiter(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_attempts: self.login_max_attempts,
            window_seconds: self.login_window_secs,
            ban_duration_seconds: self.login_ban_secs,
        }
    }
}
