//! In-memory document repository for handler tests

use async_trait::async_trait;
use chrono::Utc;
use common::error::AppResult;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DocumentRepository;
use crate::models::document::{Document, DocumentUpdate, NewDocument};

#[derive(Default)]
pub struct MemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn list_owned(&self, owner_id: Uuid) -> AppResult<Vec<Document>> {
        let mut owned: Vec<Document> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id && d.owner_id == owner_id)
            .cloned())
    }

    async fn create(&self, owner_id: Uuid, new_document: NewDocument) -> AppResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            owner_id,
            name: new_document.name,
            content: new_document.content,
            favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.documents.write().await.push(document.clone());
        Ok(document)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &DocumentUpdate,
    ) -> AppResult<Option<Document>> {
        let mut documents = self.documents.write().await;
        let Some(document) = documents
            .iter_mut()
            .find(|d| d.id == id && d.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            document.name = name.clone();
        }
        if let Some(content) = &update.content {
            document.content = content.clone();
        }
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn toggle_favorite(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<bool>> {
        let mut documents = self.documents.write().await;
        Ok(documents
            .iter_mut()
            .find(|d| d.id == id && d.owner_id == owner_id)
            .map(|document| {
                document.favorite = !document.favorite;
                document.favorite
            }))
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| !(d.id == id && d.owner_id == owner_id));
        Ok(documents.len() < before)
    }
}
