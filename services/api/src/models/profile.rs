//! Profile models for the API service

use chrono::NaiveDate;
use common::users::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub premium: bool,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            profile_image: user.profile_image,
            premium: user.premium,
        }
    }
}

/// Response for avatar uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub message: String,
    pub profile_image: String,
}
