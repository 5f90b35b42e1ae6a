//! Document models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Document owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Rich editor content, stored as JSONB and never interpreted here
    pub content: serde_json::Value,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for document creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default = "empty_content")]
    pub content: serde_json::Value,
}

fn empty_content() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Partial document edit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub content: Option<serde_json::Value>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none()
    }
}

/// Result of a favorite toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub id: Uuid,
    pub favorite: bool,
}

/// Query parameters for deletion
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteQuery {
    /// Name typed by the user to confirm the deletion
    pub confirm: Option<String>,
}
