//! qpdf and Ghostscript tools

use std::path::PathBuf;

use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use common::error::{AppError, AppResult};
use serde::Serialize;
use tracing::info;

use super::{PDF_MIME, attachment, read_output};
use crate::{
    AppState,
    compression::{CompressionLevel, size_mb},
    page_range::PageRanges,
    upload::{FileKind, UploadForm, WorkDir},
};

/// Combine at least two PDFs in upload order
pub async fn merge(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;

    let files = form.files("files");
    if files.len() < 2 {
        return Err(AppError::Validation(
            "Select at least two PDF files to merge".to_string(),
        ));
    }
    for file in &files {
        file.ensure_kind(FileKind::Pdf)?;
    }

    let inputs: Vec<PathBuf> = files.iter().map(|file| file.path.clone()).collect();
    let output = work_dir.join("merged.pdf");
    state.converter.merge_pdfs(&inputs, &output).await?;

    info!("Merged {} PDFs", inputs.len());
    Ok(attachment(read_output(&output).await?, PDF_MIME, "merged.pdf"))
}

/// Extract the pages named by `ranges`
pub async fn split(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["file"])?;
    upload.ensure_kind(FileKind::Pdf)?;

    let ranges: PageRanges = form
        .text("ranges")
        .ok_or_else(|| AppError::Validation("Page ranges are required".to_string()))?
        .parse()?;

    let page_count = state.converter.page_count(&upload.path).await?;
    ranges.validate(page_count)?;

    let output = work_dir.join("split.pdf");
    state
        .converter
        .select_pages(&upload.path, &ranges, &output)
        .await?;

    info!(
        "Split {} pages out of {}",
        ranges.selected_pages(),
        page_count
    );
    Ok(attachment(read_output(&output).await?, PDF_MIME, "split.pdf"))
}

/// Re-render through Ghostscript; sizes are reported in headers
pub async fn compress(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["file"])?;
    upload.ensure_kind(FileKind::Pdf)?;

    let level: CompressionLevel = form.text("mode").unwrap_or("recommended").parse()?;

    let output = work_dir.join("compressed.pdf");
    state
        .converter
        .compress_pdf(&upload.path, level, &output)
        .await?;
    let bytes = read_output(&output).await?;

    let original = size_mb(upload.size);
    let compressed = size_mb(bytes.len() as u64);
    info!("Compressed PDF from {} MB to {} MB", original, compressed);

    let disposition = format!("attachment; filename=\"{}-compressed.pdf\"", upload.stem());
    Ok((
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::HeaderName::from_static("x-original-size-mb"), original),
            (header::HeaderName::from_static("x-compressed-size-mb"), compressed),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub encrypted: bool,
    pub requires_password: bool,
}

pub async fn unlock_check(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<LockStatus>> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["pdfFile"])?;
    upload.ensure_kind(FileKind::Pdf)?;

    let status = state.converter.encryption_status(&upload.path).await?;
    Ok(Json(LockStatus {
        encrypted: status.encrypted,
        requires_password: status.requires_password,
    }))
}

/// Remove encryption, using the password when one is given
pub async fn unlock(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["pdfFile"])?;
    upload.ensure_kind(FileKind::Pdf)?;

    let output = work_dir.join("unlocked.pdf");
    state
        .converter
        .decrypt_pdf(&upload.path, form.text("password"), &output)
        .await?;

    Ok(attachment(
        read_output(&output).await?,
        PDF_MIME,
        &format!("{}_unlocked.pdf", upload.stem()),
    ))
}
