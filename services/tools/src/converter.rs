//! External converter seam
//!
//! Every tool runs exactly one converter call (two for split: the page
//! count, then the extraction). Handlers only see the [`Converter`] trait;
//! [`command::CommandConverter`] shells out to the real binaries.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::error::AppError;
use thiserror::Error;

use crate::{compression::CompressionLevel, page_range::PageRanges};

pub mod command;

/// Failure of a single converter call
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },

    #[error("converter produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("unexpected output from {program}: {detail}")]
    UnexpectedOutput { program: String, detail: String },

    /// The PDF password was wrong or missing
    #[error("invalid PDF password")]
    InvalidPassword,

    #[error("converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::InvalidPassword => {
                AppError::Validation("Incorrect or missing PDF password".to_string())
            }
            other => AppError::Conversion(other.to_string()),
        }
    }
}

/// LibreOffice export targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficeTarget {
    Docx,
    Pdf,
}

impl OfficeTarget {
    pub fn extension(&self) -> &'static str {
        match self {
            OfficeTarget::Docx => "docx",
            OfficeTarget::Pdf => "pdf",
        }
    }
}

/// Encryption state as reported by qpdf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionStatus {
    pub encrypted: bool,
    /// Opening needs a user password (not just owner restrictions)
    pub requires_password: bool,
}

#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert an office document; returns the produced file inside `out_dir`
    async fn office_convert(
        &self,
        input: &Path,
        target: OfficeTarget,
        out_dir: &Path,
    ) -> Result<PathBuf, ConversionError>;

    async fn page_count(&self, input: &Path) -> Result<u32, ConversionError>;

    async fn merge_pdfs(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConversionError>;

    /// Write only the selected pages, in range order
    async fn select_pages(
        &self,
        input: &Path,
        ranges: &PageRanges,
        output: &Path,
    ) -> Result<(), ConversionError>;

    async fn compress_pdf(
        &self,
        input: &Path,
        level: CompressionLevel,
        output: &Path,
    ) -> Result<(), ConversionError>;

    async fn images_to_pdf(&self, inputs: &[PathBuf], output: &Path)
    -> Result<(), ConversionError>;

    /// Render every page to PNG; returns the images in page order
    async fn pdf_to_images(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ConversionError>;

    async fn encryption_status(&self, input: &Path) -> Result<EncryptionStatus, ConversionError>;

    async fn decrypt_pdf(
        &self,
        input: &Path,
        password: Option<&str>,
        output: &Path,
    ) -> Result<(), ConversionError>;
}
