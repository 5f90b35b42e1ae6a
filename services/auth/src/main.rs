use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;

mod password;
mod rate_limiter;
mod routes;
mod settings;
mod validation;

use common::{
    jwt::{JwtConfig, JwtService},
    users::{PgUserRepository, UserRepository},
};

use crate::{rate_limiter::RateLimiter, settings::Settings};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    common::telemetry::init();

    info!("Starting authentication service");

    let settings = Settings::new()?;
    let pool = common::database::connect_from_env().await?;

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    let app_state = AppState {
        user_repository: Arc::new(PgUserRepository::new(pool)),
        jwt_service,
        rate_limiter: RateLimiter::new(settings.rate_limiter()),
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state)
        .layer(common::http::cors_layer(&settings.cors_origin))
        .layer(TraceLayer::new_for_http());

    let address = common::settings::bind_address(&settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
