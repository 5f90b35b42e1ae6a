//! Document store handlers; every query is scoped to the caller

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{
    error::{AppError, AppResult},
    http::AppJson,
    middleware::AuthUser,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    models::document::{DeleteQuery, Document, DocumentUpdate, FavoriteResponse, NewDocument},
};

/// List the caller's documents, newest first
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Document>>> {
    let documents = state.document_repository.list_owned(user.id).await?;
    Ok(Json(documents))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Document>> {
    let document = state
        .document_repository
        .find_owned(user.id, id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(document))
}

pub async fn create_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(mut payload): AppJson<NewDocument>,
) -> AppResult<impl IntoResponse> {
    payload.name = payload.name.trim().to_string();
    if payload.name.is_empty() {
        return Err(AppError::Validation("Document name is required".to_string()));
    }

    let document = state.document_repository.create(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Partial update; last write wins
pub async fn update_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    AppJson(mut payload): AppJson<DocumentUpdate>,
) -> AppResult<Json<Document>> {
    if payload.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    if let Some(name) = payload.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Document name is required".to_string()));
        }
    }

    let document = state
        .document_repository
        .update_owned(user.id, id, &payload)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(document))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FavoriteResponse>> {
    let favorite = state
        .document_repository
        .toggle_favorite(user.id, id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(FavoriteResponse { id, favorite }))
}

/// Delete a document; `?confirm=` must repeat its name when given
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<impl IntoResponse> {
    if let Some(confirm) = query.confirm {
        let document = state
            .document_repository
            .find_owned(user.id, id)
            .await?
            .ok_or(AppError::NotFound("Document"))?;
        if confirm.trim() != document.name.trim() {
            return Err(AppError::Validation(
                "Document name does not match".to_string(),
            ));
        }
    }

    if !state.document_repository.delete_owned(user.id, id).await? {
        return Err(AppError::NotFound("Document"));
    }

    info!("User {} deleted document {}", user.id, id);
    Ok(Json(json!({ "message": "Document deleted" })))
}
