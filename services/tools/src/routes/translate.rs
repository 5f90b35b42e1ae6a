//! Text translation

use axum::{Json, extract::State};
use common::{
    error::{AppError, AppResult},
    http::AppJson,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub target_lang: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

pub async fn translate(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TranslateRequest>,
) -> AppResult<Json<TranslateResponse>> {
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Text to translate is required".to_string(),
        ));
    }
    let target = payload.target_lang.trim();
    if target.is_empty() {
        return Err(AppError::Validation(
            "Target language is required".to_string(),
        ));
    }

    let translated_text = state.translator.translate(&payload.text, target).await?;
    Ok(Json(TranslateResponse { translated_text }))
}
