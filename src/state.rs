use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgStore, UserStore};
use crate::auth::service::{Auth, AuthService};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub auth: Arc<dyn AuthService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(PgStore::new(db.clone()));
        let keys = JwtKeys::from_config(&config.jwt);
        let auth: Arc<dyn AuthService> = Arc::new(Auth::new(users.clone(), keys));
        Self {
            db,
            config,
            users,
            auth,
        }
    }
}
