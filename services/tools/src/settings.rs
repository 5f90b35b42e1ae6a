//! Tool gateway settings (`TOOLS_*` environment variables)

use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;

use crate::converter::command::Binaries;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// Parent of the per-request working directories
    pub tmp_dir: String,
    /// Served at `/uploads` by this service; holds archived results
    pub output_dir: String,
    pub conversion_timeout_secs: u64,
    pub max_upload_mb: usize,
    pub translate_url: String,
    pub translate_api_key: Option<String>,
    pub sweep_schedule: String,
    pub work_dir_max_age_secs: u64,
    pub archive_max_age_secs: u64,
    pub soffice_bin: String,
    pub qpdf_bin: String,
    pub gs_bin: String,
    pub img2pdf_bin: String,
    pub pdftoppm_bin: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let tmp_dir = std::env::temp_dir().join("docdesk-tools");

        common::settings::layered("tools", 5002)?
            .set_default("tmp_dir", tmp_dir.to_string_lossy().as_ref())?
            .set_default("output_dir", "uploads/tools")?
            .set_default("conversion_timeout_secs", 120)?
            .set_default("max_upload_mb", 50)?
            .set_default("translate_url", "http://localhost:5050/translate")?
            .set_default("sweep_schedule", "0 */10 * * * *")?
            .set_default("work_dir_max_age_secs", 3600)?
            .set_default("archive_max_age_secs", 86_400)?
            .set_default("soffice_bin", "soffice")?
            .set_default("qpdf_bin", "qpdf")?
            .set_default("gs_bin", "gs")?
            .set_default("img2pdf_bin", "img2pdf")?
            .set_default("pdftoppm_bin", "pdftoppm")?
            .build()?
            .try_deserialize()
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn binaries(&self) -> Binaries {
        Binaries {
            soffice: self.soffice_bin.clone(),
            qpdf: self.qpdf_bin.clone(),
            ghostscript: self.gs_bin.clone(),
            img2pdf: self.img2pdf_bin.clone(),
            pdftoppm: self.pdftoppm_bin.clone(),
        }
    }
}
