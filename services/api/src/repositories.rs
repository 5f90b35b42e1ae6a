//! Repositories for database operations

use async_trait::async_trait;
use common::error::AppResult;
use uuid::Uuid;

use crate::models::document::{Document, DocumentUpdate, NewDocument};

pub mod document;
#[cfg(test)]
pub mod memory;

/// Document persistence, always scoped to the owning user.
///
/// A document owned by someone else is indistinguishable from a missing one.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Newest first; equal timestamps fall back to id order
    async fn list_owned(&self, owner_id: Uuid) -> AppResult<Vec<Document>>;

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Document>>;

    async fn create(&self, owner_id: Uuid, new_document: NewDocument) -> AppResult<Document>;

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &DocumentUpdate,
    ) -> AppResult<Option<Document>>;

    /// Flip the favorite flag in one statement and return the new value
    async fn toggle_favorite(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<bool>>;

    /// Returns `false` when nothing was deleted
    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool>;
}
