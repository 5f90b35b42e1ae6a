//! Authentication service routes

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use common::{
    error::{AppError, AppResult},
    http::AppJson,
    users::{NewUser, optional_date},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    AppState, password,
    validation::{normalize_email, validate_email, validate_password, validate_username},
};

/// Request for user registration
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "optional_date")]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

/// Response for user registration
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub token: String,
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response for token generation
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/check-username", get(check_username))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    common::http::health_body("auth-service")
}

/// User registration endpoint
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let username = payload.username.trim().to_string();
    let email = normalize_email(&payload.email);
    info!("Signup attempt for user: {}", username);

    validate_username(&username).map_err(AppError::Validation)?;
    validate_email(&email).map_err(AppError::Validation)?;
    validate_password(&payload.password).map_err(AppError::Validation)?;

    if state.user_repository.username_exists(&username).await? {
        return Err(AppError::DuplicateUsername);
    }
    if state.user_repository.email_exists(&email).await? {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = password::hash_password(payload.password).await?;

    let user = state
        .user_repository
        .create(NewUser {
            username,
            email,
            password_hash,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            date_of_birth: payload.date_of_birth,
            gender: payload.gender.filter(|g| !g.trim().is_empty()),
        })
        .await?;

    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, &user.username)?;

    info!("User created: {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            token,
        }),
    ))
}

/// User login endpoint
///
/// Failures are counted per normalized email, not per client, so repeated bad
/// guesses lock that account for every caller until the ban lapses.
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    info!("Login attempt for: {}", email);

    if !state.rate_limiter.is_allowed(&email).await {
        warn!("Login blocked by rate limiter: {}", email);
        return Err(AppError::TooManyRequests);
    }

    let user = state.user_repository.find_by_email(&email).await?;
    let authenticated = match &user {
        Some(user) => {
            password::verify_password(payload.password, user.password_hash.clone()).await?
        }
        None => false,
    };

    let user = match user {
        Some(user) if authenticated => user,
        _ => {
            state.rate_limiter.record_failure(&email).await;
            return Err(AppError::InvalidCredentials);
        }
    };

    state.rate_limiter.reset(&email).await;

    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, &user.username)?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.token_expiry(),
    }))
}

/// Username availability check
pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let username = query.username.unwrap_or_default();
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    let taken = state.user_repository.username_exists(username).await?;
    Ok(Json(AvailabilityResponse { available: !taken }))
}
