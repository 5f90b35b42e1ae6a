use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;

mod archive;
mod compression;
mod converter;
mod page_range;
mod routes;
mod settings;
mod sweeper;
mod translator;
mod upload;

use common::jwt::{JwtConfig, JwtService};

use crate::{
    converter::{Converter, command::CommandConverter},
    settings::Settings,
    sweeper::Sweeper,
    translator::{HttpTranslator, Translator},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<dyn Converter>,
    pub translator: Arc<dyn Translator>,
    pub jwt_service: JwtService,
    /// Parent of the per-request working directories
    pub tmp_dir: PathBuf,
    /// Archived results, served at `/uploads`
    pub output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    common::telemetry::init();

    info!("Starting tool gateway");

    let settings = Settings::new()?;

    let tmp_dir = PathBuf::from(&settings.tmp_dir);
    let output_dir = PathBuf::from(&settings.output_dir);
    tokio::fs::create_dir_all(&tmp_dir).await?;
    tokio::fs::create_dir_all(&output_dir).await?;

    let sweeper = Sweeper::new(
        tmp_dir.clone(),
        std::time::Duration::from_secs(settings.work_dir_max_age_secs),
        output_dir.clone(),
        std::time::Duration::from_secs(settings.archive_max_age_secs),
    );
    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = sweeper.start(&settings.sweep_schedule).await?;

    let app_state = AppState {
        converter: Arc::new(CommandConverter::new(
            settings.binaries(),
            settings.conversion_timeout(),
        )),
        translator: Arc::new(HttpTranslator::new(
            reqwest::Client::new(),
            settings.translate_url.clone(),
            settings.translate_api_key.clone(),
        )),
        jwt_service: JwtService::new(JwtConfig::from_env()?),
        tmp_dir,
        output_dir,
    };

    info!("Tool gateway initialized successfully");

    let app = routes::create_router(app_state, settings.max_upload_bytes())
        .layer(common::http::cors_layer(&settings.cors_origin))
        .layer(TraceLayer::new_for_http());

    let address = common::settings::bind_address(&settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Tool gateway listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
