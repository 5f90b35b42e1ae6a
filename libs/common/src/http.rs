//! HTTP building blocks shared by the service routers

use axum::{
    Json, async_trait,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, header::CONTENT_DISPOSITION},
    response::IntoResponse,
};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::warn;

use crate::error::AppError;

/// `Json` whose rejection is an `AppError::Validation`
///
/// Keeps malformed bodies inside the shared error format instead of axum's
/// plain-text rejection.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(AppJson(value))
    }
}

/// CORS for the browser front end
///
/// An unparsable origin falls back to a layer that allows nothing
/// cross-origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .expose_headers([
                CONTENT_DISPOSITION,
                HeaderName::from_static("x-original-size-mb"),
                HeaderName::from_static("x-compressed-size-mb"),
            ])
            .allow_credentials(true),
        Err(e) => {
            warn!("Invalid CORS origin {:?}: {}", origin, e);
            CorsLayer::new()
        }
    }
}

/// Liveness payload for `GET /health`
pub fn health_body(service: &'static str) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": service
    }))
}
