//! In-memory user repository used by service tests

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NewUser, ProfileUpdate, User, UserRepository};
use crate::error::{AppError, AppResult};

/// Vec-backed store enforcing the same uniqueness rules as the schema
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::DuplicateUsername);
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            date_of_birth: new_user.date_of_birth,
            gender: new_user.gender,
            profile_image: None,
            premium: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.users.read().await.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self.users.read().await.iter().any(|u| u.email == email))
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_profile_image(&self, id: Uuid, path: &str) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.profile_image = Some(path.to_string());
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}
