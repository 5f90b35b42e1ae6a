//! Application state shared across handlers

use std::sync::Arc;

use common::{jwt::JwtService, users::UserRepository};

use crate::{avatar::AvatarStore, repositories::DocumentRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub document_repository: Arc<dyn DocumentRepository>,
    pub jwt_service: JwtService,
    pub avatar_store: AvatarStore,
}
