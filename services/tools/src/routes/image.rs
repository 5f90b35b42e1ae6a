//! Image and PDF page conversions

use std::path::PathBuf;

use axum::{
    Json,
    extract::{Multipart, State},
    response::Response,
};
use common::error::{AppError, AppResult};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{PDF_MIME, attachment, read_output};
use crate::{
    AppState,
    archive::{ARCHIVE_PREFIX, zip_files},
    upload::{FileKind, UploadForm, WorkDir},
};

pub async fn image_to_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;

    let images = form.files("images");
    if images.is_empty() {
        return Err(AppError::Validation(
            "Select at least one image".to_string(),
        ));
    }
    for image in &images {
        image.ensure_kind(FileKind::Image)?;
    }

    let inputs: Vec<PathBuf> = images.iter().map(|image| image.path.clone()).collect();
    let output = work_dir.join("images.pdf");
    state.converter.images_to_pdf(&inputs, &output).await?;

    Ok(attachment(read_output(&output).await?, PDF_MIME, "images.pdf"))
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub success: bool,
    pub message: String,
    /// Public path of the zip under `/uploads`
    pub file: String,
}

/// Render every page to PNG and publish them as one zip
pub async fn pdf_to_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ArchiveResponse>> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["file", "pdf"])?;
    upload.ensure_kind(FileKind::Pdf)?;

    let pages_dir = work_dir.join("pages");
    tokio::fs::create_dir_all(&pages_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create pages dir: {e}")))?;
    let images = state
        .converter
        .pdf_to_images(&upload.path, &pages_dir)
        .await?;
    let page_count = images.len();

    tokio::fs::create_dir_all(&state.output_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create output dir: {e}")))?;
    let name = format!("{}{}.zip", ARCHIVE_PREFIX, Uuid::new_v4().simple());
    let archive_path = state.output_dir.join(&name);

    tokio::task::spawn_blocking(move || zip_files(&images, &archive_path))
        .await
        .map_err(|e| AppError::Internal(format!("Archive task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("Failed to write archive: {e}")))?;

    info!("Archived {} pages as {}", page_count, name);
    Ok(Json(ArchiveResponse {
        success: true,
        message: format!("Converted {} pages", page_count),
        file: format!("/uploads/{}", name),
    }))
}
