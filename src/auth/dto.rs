use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::model::{Role, User};

/// Request body for account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone_number: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            phone_number: u.phone_number,
            role: u.role,
            created_at: u.created_at,
        }
    }
}
