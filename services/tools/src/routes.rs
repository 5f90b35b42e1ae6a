//! Tool gateway routes

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{
    error::{AppError, AppResult},
    middleware::require_auth,
};
use tower_http::services::ServeDir;

use crate::AppState;

pub mod image;
pub mod office;
pub mod pdf;
pub mod translate;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Create the router for the tool gateway
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let protected_tools = Router::new()
        .route("/pdf/compress", post(pdf::compress))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            require_auth,
        ));

    let tools = Router::new()
        .route("/pdf-to-word", post(office::pdf_to_word))
        .route("/word-to-pdf", post(office::word_to_pdf))
        .route("/ppt-to-pdf", post(office::ppt_to_pdf))
        .route("/pdf-merge", post(pdf::merge))
        .route("/pdf-split", post(pdf::split))
        .route("/image-to-pdf", post(image::image_to_pdf))
        .route("/pdf-to-image", post(image::pdf_to_image))
        .route("/doc-translator", post(translate::translate))
        .route("/unlock-pdf/check", post(pdf::unlock_check))
        .route("/unlock-pdf/unlock", post(pdf::unlock))
        .merge(protected_tools);

    let output_dir = state.output_dir.clone();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/tools", tools)
        .nest_service("/uploads", ServeDir::new(output_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    common::http::health_body("tools-service")
}

/// Binary download response
pub fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

pub async fn read_output(path: &Path) -> AppResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Conversion(format!("cannot read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compression::CompressionLevel,
        converter::{ConversionError, Converter, EncryptionStatus, OfficeTarget},
        page_range::PageRanges,
        translator::Translator,
    };
    use async_trait::async_trait;
    use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use common::jwt::{DEFAULT_TOKEN_EXPIRY, JwtConfig, JwtService};
    use serde_json::json;
    use std::{
        path::PathBuf,
        sync::{Arc, Mutex},
    };
    use tempfile::TempDir;
    use uuid::Uuid;

    /// Writes placeholder outputs and records each call
    #[derive(Default)]
    struct FakeConverter {
        calls: Mutex<Vec<&'static str>>,
        pages: u32,
        fail: bool,
    }

    impl FakeConverter {
        fn with_pages(pages: u32) -> Self {
            Self {
                pages,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: &'static str) -> Result<(), ConversionError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(ConversionError::Failed {
                    program: "fake".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "secret internal detail".to_string(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Converter for FakeConverter {
        async fn office_convert(
            &self,
            input: &Path,
            target: OfficeTarget,
            out_dir: &Path,
        ) -> Result<PathBuf, ConversionError> {
            self.record("office_convert")?;
            let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
            let output = out_dir.join(format!("{}.{}", stem, target.extension()));
            std::fs::write(&output, format!("converted to {}", target.extension()))?;
            Ok(output)
        }

        async fn page_count(&self, _input: &Path) -> Result<u32, ConversionError> {
            self.record("page_count")?;
            Ok(self.pages)
        }

        async fn merge_pdfs(
            &self,
            inputs: &[PathBuf],
            output: &Path,
        ) -> Result<(), ConversionError> {
            self.record("merge_pdfs")?;
            let mut merged = Vec::new();
            for input in inputs {
                merged.extend(std::fs::read(input)?);
            }
            std::fs::write(output, merged)?;
            Ok(())
        }

        async fn select_pages(
            &self,
            _input: &Path,
            ranges: &PageRanges,
            output: &Path,
        ) -> Result<(), ConversionError> {
            self.record("select_pages")?;
            std::fs::write(output, format!("pages:{}", ranges.selected_pages()))?;
            Ok(())
        }

        async fn compress_pdf(
            &self,
            _input: &Path,
            level: CompressionLevel,
            output: &Path,
        ) -> Result<(), ConversionError> {
            self.record("compress_pdf")?;
            std::fs::write(output, level.pdf_settings())?;
            Ok(())
        }

        async fn images_to_pdf(
            &self,
            inputs: &[PathBuf],
            output: &Path,
        ) -> Result<(), ConversionError> {
            self.record("images_to_pdf")?;
            std::fs::write(output, format!("images:{}", inputs.len()))?;
            Ok(())
        }

        async fn pdf_to_images(
            &self,
            _input: &Path,
            out_dir: &Path,
        ) -> Result<Vec<PathBuf>, ConversionError> {
            self.record("pdf_to_images")?;
            let pages: Vec<PathBuf> = (1..=2)
                .map(|n| out_dir.join(format!("page-{n}.png")))
                .collect();
            for page in &pages {
                std::fs::write(page, b"png")?;
            }
            Ok(pages)
        }

        async fn encryption_status(
            &self,
            _input: &Path,
        ) -> Result<EncryptionStatus, ConversionError> {
            self.record("encryption_status")?;
            Ok(EncryptionStatus {
                encrypted: true,
                requires_password: true,
            })
        }

        async fn decrypt_pdf(
            &self,
            _input: &Path,
            password: Option<&str>,
            output: &Path,
        ) -> Result<(), ConversionError> {
            self.record("decrypt_pdf")?;
            if password != Some("open-sesame") {
                return Err(ConversionError::InvalidPassword);
            }
            std::fs::write(output, b"unlocked")?;
            Ok(())
        }
    }

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target_lang: &str) -> AppResult<String> {
            Ok(format!("[{target_lang}] {text}"))
        }
    }

    struct Harness {
        server: TestServer,
        converter: Arc<FakeConverter>,
        jwt: JwtService,
        tmp: TempDir,
        output: TempDir,
    }

    impl Harness {
        fn new(converter: FakeConverter) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let output = tempfile::tempdir().unwrap();
            let converter = Arc::new(converter);
            let jwt = JwtService::new(JwtConfig {
                secret: "tools-routes-secret".to_string(),
                token_expiry: DEFAULT_TOKEN_EXPIRY,
            });
            let state = AppState {
                converter: converter.clone(),
                translator: Arc::new(EchoTranslator),
                jwt_service: jwt.clone(),
                tmp_dir: tmp.path().to_path_buf(),
                output_dir: output.path().to_path_buf(),
            };

            Self {
                server: TestServer::new(create_router(state, 1024 * 1024)).unwrap(),
                converter,
                jwt,
                tmp,
                output,
            }
        }

        fn bearer(&self) -> HeaderValue {
            let token = self
                .jwt
                .generate_token(Uuid::new_v4(), "a@x.com", "ana")
                .unwrap();
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
        }

        /// Working directories left behind under the temp root
        fn leftover_work_dirs(&self) -> usize {
            std::fs::read_dir(self.tmp.path()).unwrap().count()
        }
    }

    fn pdf(name: &str) -> Part {
        Part::bytes(b"%PDF-1.4 fake".to_vec())
            .file_name(name)
            .mime_type("application/pdf")
    }

    #[tokio::test]
    async fn merge_needs_two_files_before_any_conversion() {
        let h = Harness::new(FakeConverter::default());

        let response = h
            .server
            .post("/api/tools/pdf-merge")
            .multipart(MultipartForm::new().add_part("files", pdf("a.pdf")))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(h.converter.calls().is_empty());
        assert_eq!(h.leftover_work_dirs(), 0);
    }

    #[tokio::test]
    async fn merge_combines_files_in_order() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new()
            .add_part("files", Part::bytes(b"first;".to_vec()).file_name("a.pdf").mime_type("application/pdf"))
            .add_part("files", Part::bytes(b"second".to_vec()).file_name("b.pdf").mime_type("application/pdf"));
        let response = h.server.post("/api/tools/pdf-merge").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.text(), "first;second");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PDF_MIME
        );
        assert_eq!(h.converter.calls(), vec!["merge_pdfs"]);
        assert_eq!(h.leftover_work_dirs(), 0);
    }

    #[tokio::test]
    async fn split_selects_requested_pages() {
        let h = Harness::new(FakeConverter::with_pages(5));

        let form = MultipartForm::new()
            .add_part("file", pdf("report.pdf"))
            .add_text("ranges", "2-4");
        let response = h.server.post("/api/tools/pdf-split").multipart(form).await;

        response.assert_status_ok();
        assert_eq!(response.text(), "pages:3");
        assert_eq!(h.converter.calls(), vec!["page_count", "select_pages"]);
    }

    #[tokio::test]
    async fn split_rejects_pages_past_the_end() {
        let h = Harness::new(FakeConverter::with_pages(5));

        let form = MultipartForm::new()
            .add_part("file", pdf("report.pdf"))
            .add_text("ranges", "4-6");
        let response = h.server.post("/api/tools/pdf-split").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(h.converter.calls(), vec!["page_count"]);
        assert_eq!(h.leftover_work_dirs(), 0);
    }

    #[tokio::test]
    async fn compress_requires_a_token() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new()
            .add_part("file", pdf("big.pdf"))
            .add_text("mode", "extreme");
        h.server
            .post("/api/tools/pdf/compress")
            .multipart(form)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        assert!(h.converter.calls().is_empty());
    }

    #[tokio::test]
    async fn compress_reports_sizes() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new()
            .add_part("file", pdf("big.pdf"))
            .add_text("mode", "extreme");
        let response = h
            .server
            .post("/api/tools/pdf/compress")
            .add_header(AUTHORIZATION, h.bearer())
            .multipart(form)
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "/screen");
        assert_eq!(
            response.headers().get("x-original-size-mb").unwrap(),
            "0.00"
        );
        assert!(response.headers().get("x-compressed-size-mb").is_some());
    }

    #[tokio::test]
    async fn compress_rejects_unknown_mode() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new()
            .add_part("file", pdf("big.pdf"))
            .add_text("mode", "maximum");
        h.server
            .post("/api/tools/pdf/compress")
            .add_header(AUTHORIZATION, h.bearer())
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert!(h.converter.calls().is_empty());
    }

    #[tokio::test]
    async fn converter_failure_is_generic() {
        let h = Harness::new(FakeConverter::failing());

        let form = MultipartForm::new().add_part("file", pdf("in.pdf"));
        let response = h.server.post("/api/tools/pdf-to-word").multipart(form).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Conversion failed");
        assert_eq!(body["kind"], "conversion_failure");
        assert!(!response.text().contains("secret internal detail"));
        assert_eq!(h.leftover_work_dirs(), 0);
    }

    #[tokio::test]
    async fn office_conversion_checks_media_type() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"plain".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
        h.server
            .post("/api/tools/word-to-pdf")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"docx".to_vec()).file_name("letter.docx"),
        );
        let response = h.server.post("/api/tools/word-to-pdf").multipart(form).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "converted to pdf");
        assert!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("letter.pdf")
        );
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new().add_part("document", pdf("in.pdf"));
        h.server
            .post("/api/tools/pdf-to-word")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert!(h.converter.calls().is_empty());
    }

    #[tokio::test]
    async fn image_to_pdf_accepts_images_only() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new()
            .add_part("images", Part::bytes(b"png".to_vec()).file_name("a.png").mime_type("image/png"))
            .add_part("images", Part::bytes(b"jpg".to_vec()).file_name("b.jpg").mime_type("image/jpeg"));
        let response = h.server.post("/api/tools/image-to-pdf").multipart(form).await;
        response.assert_status_ok();
        assert_eq!(response.text(), "images:2");

        h.server
            .post("/api/tools/image-to-pdf")
            .multipart(MultipartForm::new().add_text("note", "nothing"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pdf_to_image_publishes_an_archive() {
        let h = Harness::new(FakeConverter::default());

        let form = MultipartForm::new().add_part("pdf", pdf("slides.pdf"));
        let response = h.server.post("/api/tools/pdf-to-image").multipart(form).await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        let file = body["file"].as_str().unwrap();
        assert!(file.starts_with("/uploads/pages-"));
        assert!(file.ends_with(".zip"));

        let archive = h.output.path().join(file.trim_start_matches("/uploads/"));
        assert!(archive.exists());
        h.server.get(file).await.assert_status_ok();
        assert_eq!(h.leftover_work_dirs(), 0);
    }

    #[tokio::test]
    async fn translation_validates_text() {
        let h = Harness::new(FakeConverter::default());

        h.server
            .post("/api/tools/doc-translator")
            .json(&json!({"text": "  ", "targetLang": "fr"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let body: translate::TranslateResponse = h
            .server
            .post("/api/tools/doc-translator")
            .json(&json!({"text": "hello", "targetLang": "fr"}))
            .await
            .json();
        assert_eq!(body.translated_text, "[fr] hello");
    }

    #[tokio::test]
    async fn unlock_reports_and_removes_encryption() {
        let h = Harness::new(FakeConverter::default());

        let status: serde_json::Value = h
            .server
            .post("/api/tools/unlock-pdf/check")
            .multipart(MultipartForm::new().add_part("pdfFile", pdf("locked.pdf")))
            .await
            .json();
        assert_eq!(status["encrypted"], true);
        assert_eq!(status["requiresPassword"], true);

        h.server
            .post("/api/tools/unlock-pdf/unlock")
            .multipart(
                MultipartForm::new()
                    .add_part("pdfFile", pdf("locked.pdf"))
                    .add_text("password", "guess"),
            )
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let response = h
            .server
            .post("/api/tools/unlock-pdf/unlock")
            .multipart(
                MultipartForm::new()
                    .add_part("pdfFile", pdf("locked.pdf"))
                    .add_text("password", "open-sesame"),
            )
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "unlocked");
    }
}
