//! Document repository for database operations

use async_trait::async_trait;
use common::error::AppResult;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::DocumentRepository;
use crate::models::document::{Document, DocumentUpdate, NewDocument};

/// PostgreSQL implementation of the DocumentRepository
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn list_owned(&self, owner_id: Uuid) -> AppResult<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, owner_id, name, content, favorite, created_at, updated_at
            FROM documents
            WHERE owner_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, owner_id, name, content, favorite, created_at, updated_at
            FROM documents
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    async fn create(&self, owner_id: Uuid, new_document: NewDocument) -> AppResult<Document> {
        info!("Creating document for user: {}", owner_id);

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, owner_id, name, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, content, favorite, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&new_document.name)
        .bind(&new_document.content)
        .fetch_one(&self.pool)
        .await?;
        Ok(document)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        update: &DocumentUpdate,
    ) -> AppResult<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET name = COALESCE($3, name),
                content = COALESCE($4, content),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, content, favorite, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&update.name)
        .bind(&update.content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(document)
    }

    async fn toggle_favorite(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<bool>> {
        let favorite: Option<bool> = sqlx::query_scalar(
            r#"
            UPDATE documents
            SET favorite = NOT favorite, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING favorite
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(favorite)
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted document {} for user {}", id, owner_id);
        }
        Ok(result.rows_affected() > 0)
    }
}
