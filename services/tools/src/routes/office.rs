//! LibreOffice conversions

use axum::{
    extract::{Multipart, State},
    response::Response,
};
use common::error::{AppError, AppResult};

use super::{DOCX_MIME, PDF_MIME, attachment, read_output};
use crate::{
    AppState,
    converter::OfficeTarget,
    upload::{FileKind, UploadForm, WorkDir},
};

pub async fn pdf_to_word(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    convert(&state, multipart, FileKind::Pdf, OfficeTarget::Docx).await
}

pub async fn word_to_pdf(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    convert(&state, multipart, FileKind::Word, OfficeTarget::Pdf).await
}

pub async fn ppt_to_pdf(State(state): State<AppState>, multipart: Multipart) -> AppResult<Response> {
    convert(&state, multipart, FileKind::Presentation, OfficeTarget::Pdf).await
}

async fn convert(
    state: &AppState,
    multipart: Multipart,
    kind: FileKind,
    target: OfficeTarget,
) -> AppResult<Response> {
    let work_dir = WorkDir::create(&state.tmp_dir)?;
    let form = UploadForm::read(multipart, &work_dir).await?;
    let upload = form.file(&["file"])?;
    upload.ensure_kind(kind)?;

    let out_dir = work_dir.join("out");
    tokio::fs::create_dir_all(&out_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create output dir: {e}")))?;

    let produced = state
        .converter
        .office_convert(&upload.path, target, &out_dir)
        .await?;
    let bytes = read_output(&produced).await?;

    let mime = match target {
        OfficeTarget::Docx => DOCX_MIME,
        OfficeTarget::Pdf => PDF_MIME,
    };
    Ok(attachment(
        bytes,
        mime,
        &format!("{}.{}", upload.stem(), target.extension()),
    ))
}
