//! Layered service settings
//!
//! Each service deserializes its own flat settings struct from:
//! built-in defaults, then an optional `config/<service>.toml`, then
//! environment variables prefixed with the upper-cased service name
//! (`TOOLS_TMP_DIR`, `API_PORT`, ...).

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};

/// Start a builder with the shared server defaults and both sources attached
///
/// Callers add their own `set_default` calls and finish with
/// `.build()?.try_deserialize()`.
pub fn layered(
    service: &str,
    default_port: u16,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(default_port))?
        .set_default("cors_origin", "http://localhost:3000")?
        .add_source(File::with_name(&format!("config/{}", service)).required(false))
        .add_source(
            Environment::with_prefix(&service.to_uppercase())
                .prefix_separator("_")
                .try_parsing(true),
        );

    Ok(builder)
}

/// Socket address string for `TcpListener::bind`
pub fn bind_address(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}
