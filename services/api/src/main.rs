use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;

mod avatar;
mod models;
mod repositories;
mod routes;
mod settings;
mod state;

use common::{
    jwt::{JwtConfig, JwtService},
    users::PgUserRepository,
};

use crate::{
    avatar::AvatarStore, repositories::document::PgDocumentRepository, settings::Settings,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    common::telemetry::init();

    info!("Starting API service");

    let settings = Settings::new()?;
    let pool = common::database::connect_from_env().await?;

    let uploads_dir = PathBuf::from(&settings.uploads_dir);
    let avatar_store = AvatarStore::new(&uploads_dir);
    tokio::fs::create_dir_all(avatar_store.dir()).await?;

    let app_state = AppState {
        user_repository: Arc::new(PgUserRepository::new(pool.clone())),
        document_repository: Arc::new(PgDocumentRepository::new(pool)),
        jwt_service: JwtService::new(JwtConfig::from_env()?),
        avatar_store,
    };

    info!("API service initialized successfully");

    let app = routes::create_router(app_state, &uploads_dir, settings.max_avatar_bytes())
        .layer(common::http::cors_layer(&settings.cors_origin))
        .layer(TraceLayer::new_for_http());

    let address = common::settings::bind_address(&settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
