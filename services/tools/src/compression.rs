//! Ghostscript compression presets

use std::str::FromStr;

use common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    Extreme,
    Recommended,
    Low,
}

impl CompressionLevel {
    /// Value for `-dPDFSETTINGS`
    pub fn pdf_settings(&self) -> &'static str {
        match self {
            CompressionLevel::Extreme => "/screen",
            CompressionLevel::Recommended => "/ebook",
            CompressionLevel::Low => "/printer",
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extreme" => Ok(CompressionLevel::Extreme),
            "recommended" => Ok(CompressionLevel::Recommended),
            "low" => Ok(CompressionLevel::Low),
            other => Err(AppError::Validation(format!(
                "Unknown compression mode {:?}, expected extreme, recommended or low",
                other
            ))),
        }
    }
}

/// Size in MiB with two decimals, as sent in the size headers
pub fn size_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}
