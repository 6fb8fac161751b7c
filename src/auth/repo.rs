use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::model::{Role, User};

/// Data needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage contract for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn insert(&self, new: NewUser) -> Result<User, InsertError>;
}

/// Postgres-backed user store.
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, name, phone_number, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, name, phone_number, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> Result<User, InsertError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, name, phone_number, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password, name, phone_number, role, created_at
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.name)
        .bind(new.phone_number)
        .bind(new.role)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(InsertError::DuplicateEmail),
            Err(e) => Err(InsertError::Other(e.into())),
        }
    }
}

/// Postgres unique_violation. The email constraint is the only arbiter for
/// concurrent signups with the same address; the loser of the race lands
/// here.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
