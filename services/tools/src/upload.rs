//! Per-request working directories and multipart intake

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::extract::Multipart;
use chrono::Utc;
use common::error::{AppError, AppResult};
use tempfile::TempDir;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

/// Prefix shared by every working directory, matched by the sweeper
pub const WORK_DIR_PREFIX: &str = "job-";

/// Working directory removed when dropped, whether the request succeeded or not
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    /// Create `job-<millis>-<random>` under `root`
    pub fn create(root: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(root)
            .map_err(|e| AppError::Internal(format!("Failed to create temp root: {e}")))?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}{}-", WORK_DIR_PREFIX, Utc::now().timestamp_millis()))
            .tempdir_in(root)
            .map_err(|e| AppError::Internal(format!("Failed to create work dir: {e}")))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Accepted upload families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Presentation,
    Image,
}

impl FileKind {
    fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "a PDF file",
            FileKind::Word => "a Word document",
            FileKind::Presentation => "a PowerPoint presentation",
            FileKind::Image => "an image",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Pdf => &["pdf"],
            FileKind::Word => &["doc", "docx", "odt", "rtf"],
            FileKind::Presentation => &["ppt", "pptx", "odp"],
            FileKind::Image => &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"],
        }
    }

    fn matches_mime(&self, mime: &str) -> bool {
        match self {
            FileKind::Pdf => mime == "application/pdf",
            FileKind::Word => {
                mime == "application/msword" || mime.contains("wordprocessingml")
            }
            FileKind::Presentation => {
                mime == "application/vnd.ms-powerpoint" || mime.contains("presentationml")
            }
            FileKind::Image => mime.starts_with("image/"),
        }
    }
}

/// A file field written to the working directory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    /// Sanitized client file name
    pub file_name: String,
    pub content_type: Option<String>,
    pub path: PathBuf,
    pub size: u64,
}

impl UploadedFile {
    /// Accept by media type, falling back to the extension for generic types
    pub fn ensure_kind(&self, kind: FileKind) -> AppResult<()> {
        let by_mime = self
            .content_type
            .as_deref()
            .is_some_and(|mime| kind.matches_mime(mime));
        let by_extension = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| kind.extensions().contains(&ext.to_ascii_lowercase().as_str()));

        if by_mime || by_extension {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "{} is not {}",
                self.file_name,
                kind.label()
            )))
        }
    }

    /// Client file name without its extension
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("document")
    }
}

/// Every file and text field of a multipart request
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Stream file fields to disk and keep text fields in memory
    pub async fn read(mut multipart: Multipart, work_dir: &WorkDir) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {}", e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();

            let Some(original) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read field: {}", e.body_text()))
                })?;
                form.fields.insert(name, value);
                continue;
            };

            let file_name = sanitize_file_name(&original);
            let content_type = field.content_type().map(str::to_string);
            let path = work_dir.join(&format!("{}-{}", form.files.len(), file_name));

            let mut file = File::create(&path)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;
            let mut size = 0u64;
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                AppError::Validation(format!("Failed to read file: {}", e.body_text()))
            })? {
                size += chunk.len() as u64;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;
            }
            file.flush()
                .await
                .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

            debug!("Stored upload {} ({} bytes)", file_name, size);
            form.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                path,
                size,
            });
        }

        Ok(form)
    }

    /// First non-empty file under any of `names`
    pub fn file(&self, names: &[&str]) -> AppResult<&UploadedFile> {
        self.files
            .iter()
            .find(|file| names.contains(&file.field.as_str()) && file.size > 0)
            .ok_or_else(|| {
                AppError::Validation(format!("No file uploaded in field `{}`", names[0]))
            })
    }

    /// Non-empty files under `name`, in upload order
    pub fn files(&self, name: &str) -> Vec<&UploadedFile> {
        self.files
            .iter()
            .filter(|file| file.field == name && file.size > 0)
            .collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; never empty, never hidden
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
