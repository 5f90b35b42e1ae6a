//! Authentication middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, jwt::JwtService};

/// Authenticated caller, inserted into the request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Reject requests without a valid `Authorization: Bearer <token>` header
///
/// Install with `middleware::from_fn_with_state(jwt_service, require_auth)`;
/// handlers then read the caller through `Extension<AuthUser>`.
pub async fn require_auth(
    State(jwt_service): State<JwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = jwt_service.validate_token(token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
