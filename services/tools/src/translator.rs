//! Text translation through a LibreTranslate-compatible API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use common::error::{AppError, AppResult};

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> AppResult<String>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

pub struct HttpTranslator {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(client: reqwest::Client, url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> AppResult<String> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Conversion(format!("translation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Translation backend returned {}: {}", status, body);
            return Err(AppError::Conversion(format!(
                "translation backend returned {status}"
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Conversion(format!("bad translation response: {e}")))?;
        Ok(body.translated_text)
    }
}
