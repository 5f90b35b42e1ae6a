//! Credential store: user records and their persistence
//!
//! The auth service creates users and checks credentials; the API service
//! reads and edits profiles. Both go through [`UserRepository`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[cfg(any(test, feature = "testing"))]
pub mod memory;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// URL path of the avatar, e.g. `/uploads/avatars/<file>`
    pub profile_image: Option<String>,
    pub premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
}

/// Partial profile edit; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub date_of_birth: Option<NaiveDate>,
}

/// `YYYY-MM-DD`, with `null` and `""` (an untouched date input) read as absent
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.date_of_birth.is_none()
    }
}

/// Repository trait for user operations.
///
/// Kept behind a trait so handlers can be tested without PostgreSQL.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a uniqueness clash maps to the matching duplicate error
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn username_exists(&self, username: &str) -> AppResult<bool>;

    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    /// Returns `None` when the user does not exist
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>>;

    /// Returns `None` when the user does not exist
    async fn set_profile_image(&self, id: Uuid, path: &str) -> AppResult<Option<User>>;
}

/// PostgreSQL implementation of the UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(USERNAME_CONSTRAINT) => return AppError::DuplicateUsername,
            Some(EMAIL_CONSTRAINT) => return AppError::DuplicateEmail,
            _ => {}
        }
    }
    AppError::Database(err)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        info!("Creating new user: {}", new_user.username);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name,
                               date_of_birth, gender)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.date_of_birth)
        .bind(&new_user.gender)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>> {
        info!("Updating profile for user: {}", id);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                date_of_birth = COALESCE($4, date_of_birth),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.date_of_birth)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_profile_image(&self, id: Uuid, path: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET profile_image = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_reads_camel_case_and_blank_dates() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"firstName":"Ana","dateOfBirth":""}"#).unwrap();
        assert_eq!(update.first_name.as_deref(), Some("Ana"));
        assert!(update.date_of_birth.is_none());
        assert!(!update.is_empty());

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"dateOfBirth":"1990-04-02"}"#).unwrap();
        assert_eq!(
            update.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 4, 2)
        );

        assert!(serde_json::from_str::<ProfileUpdate>(r#"{"dateOfBirth":"02/04/1990"}"#).is_err());
        assert!(serde_json::from_str::<ProfileUpdate>("{}").unwrap().is_empty());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            gender: None,
            profile_image: None,
            premium: false,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }
}
