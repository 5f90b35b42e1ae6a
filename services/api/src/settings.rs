//! API service settings (`API_*` environment variables)

use config::ConfigError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Root of the statically served `/uploads` tree
    pub uploads_dir: String,
    pub max_avatar_mb: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        common::settings::layered("api", 5000)?
            .set_default("uploads_dir", "uploads")?
            .set_default("max_avatar_mb", 5)?
            .build()?
            .try_deserialize()
    }

    pub fn max_avatar_bytes(&self) -> usize {
        self.max_avatar_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults() {
        let settings = Settings::new().unwrap();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.uploads_dir, "uploads");
        assert_eq!(settings.max_avatar_bytes(), 5 * 1024 * 1024);
    }

    #[test]
    #[serial]
    fn uploads_dir_from_env() {
        unsafe {
            std::env::set_var("API_UPLOADS_DIR", "/srv/uploads");
        }
        let settings = Settings::new().unwrap();
        assert_eq!(settings.uploads_dir, "/srv/uploads");
        unsafe {
            std::env::remove_var("API_UPLOADS_DIR");
        }
    }
}
