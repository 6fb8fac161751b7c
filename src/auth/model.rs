use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Access level attached to every account. Stored and serialized by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn role_uses_enum_names_on_the_wire() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"ADMIN\"").unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn user_json_hides_password_hash() {
        let user = User {
            id: 1,
            email: "ann@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            name: "Ann".to_string(),
            phone_number: None,
            role: Role::User,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("ann@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}
