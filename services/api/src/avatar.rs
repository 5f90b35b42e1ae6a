//! Avatar files under `<uploads>/avatars`

use std::path::{Path, PathBuf};

use chrono::Utc;
use common::error::{AppError, AppResult};
use tracing::{info, warn};
use uuid::Uuid;

/// Public URL prefix matching the `/uploads` static mount
pub const AVATAR_URL_PREFIX: &str = "/uploads/avatars/";

#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(uploads_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: uploads_dir.as_ref().join("avatars"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the image and return its public URL path
    pub async fn save(
        &self,
        user_id: Uuid,
        content_type: &str,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create avatar dir: {e}")))?;

        let name = format!(
            "{}-{}.{}",
            user_id,
            Utc::now().timestamp_millis(),
            extension_for(content_type, file_name)
        );
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write avatar: {e}")))?;

        info!("Stored avatar {} ({} bytes)", name, bytes.len());
        Ok(format!("{AVATAR_URL_PREFIX}{name}"))
    }

    /// Best-effort removal of a previously stored avatar
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.path_for(url) else {
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Could not remove old avatar {}: {}", path.display(), e);
        }
    }

    /// Map a public URL back to a file, refusing anything outside the avatar dir
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(AVATAR_URL_PREFIX)?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.dir.join(name))
    }
}

fn extension_for(content_type: &str, file_name: Option<&str>) -> String {
    let known = match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    };
    if let Some(ext) = known {
        return ext.to_string();
    }

    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "img".to_string())
}
