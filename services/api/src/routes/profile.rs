//! Profile handlers

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use common::{
    error::{AppError, AppResult},
    http::AppJson,
    middleware::AuthUser,
    users::ProfileUpdate,
};
use tracing::info;

use crate::{
    AppState,
    models::profile::{AvatarResponse, ProfileResponse},
};

/// Multipart field carrying the avatar
pub const AVATAR_FIELD: &str = "profileImage";

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state
        .user_repository
        .find_by_id(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user.into()))
}

/// Partial update of name and birth date
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(mut payload): AppJson<ProfileUpdate>,
) -> AppResult<Json<ProfileResponse>> {
    if payload.is_empty() {
        return Err(AppError::Validation(
            "At least one profile field is required".to_string(),
        ));
    }
    payload.first_name = payload.first_name.map(|name| name.trim().to_string());
    payload.last_name = payload.last_name.map(|name| name.trim().to_string());

    let updated = state
        .user_repository
        .update_profile(user.id, &payload)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    info!("Profile updated for user: {}", user.id);
    Ok(Json(updated.into()))
}

/// Replace the caller's avatar with an uploaded image
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> AppResult<Json<AvatarResponse>> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {}", e.body_text())))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Only image files are allowed".to_string(),
            ));
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e.body_text())))?;
        image = Some((content_type, file_name, bytes));
        break;
    }

    let (content_type, file_name, bytes) = image
        .ok_or_else(|| AppError::Validation("No profileImage file in request".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded image is empty".to_string()));
    }

    let current = state
        .user_repository
        .find_by_id(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let url = state
        .avatar_store
        .save(user.id, &content_type, file_name.as_deref(), &bytes)
        .await?;

    if state
        .user_repository
        .set_profile_image(user.id, &url)
        .await?
        .is_none()
    {
        state.avatar_store.remove(&url).await;
        return Err(AppError::NotFound("User"));
    }

    if let Some(previous) = current.profile_image.filter(|previous| *previous != url) {
        state.avatar_store.remove(&previous).await;
    }

    Ok(Json(AvatarResponse {
        message: "Profile image updated".to_string(),
        profile_image: url,
    }))
}
