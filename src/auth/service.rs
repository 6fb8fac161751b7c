use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, SignupRequest};
use crate::auth::error::AuthError;
use crate::auth::jwt::JwtKeys;
use crate::auth::model::{Role, User};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{InsertError, NewUser, UserStore};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Account operations exposed to the HTTP layer.
///
/// Persistence, hashing and token backends all sit behind this contract.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, req: SignupRequest) -> Result<User, AuthError>;
    async fn login(&self, req: LoginRequest) -> Result<String, AuthError>;
}

pub struct Auth {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl Auth {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }
}

#[async_trait]
impl AuthService for Auth {
    async fn signup(&self, mut req: SignupRequest) -> Result<User, AuthError> {
        req.email = req.email.trim().to_lowercase();

        if !is_valid_email(&req.email) {
            warn!(email = %req.email, "invalid email");
            return Err(AuthError::Validation("Invalid email".into()));
        }
        if req.password.len() < 8 {
            warn!("password too short");
            return Err(AuthError::Validation("Password too short".into()));
        }
        if req.name.trim().is_empty() {
            warn!("name is required");
            return Err(AuthError::Validation("Name is required".into()));
        }

        // Friendly pre-check; under concurrent signups the unique
        // constraint on users.email still decides.
        if self.store.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let hash = hash_password(&req.password)?;

        let user = self
            .store
            .insert(NewUser {
                email: req.email,
                password_hash: hash,
                name: req.name.trim().to_string(),
                phone_number: req.phone_number,
                role: Role::default(),
            })
            .await
            .map_err(|e| match e {
                InsertError::DuplicateEmail => AuthError::DuplicateEmail,
                InsertError::Other(e) => AuthError::Internal(e),
            })?;

        info!(user_id = user.id, email = %user.email, "user signed up");
        Ok(user)
    }

    async fn login(&self, mut req: LoginRequest) -> Result<String, AuthError> {
        req.email = req.email.trim().to_lowercase();

        // Unknown email and bad password collapse into one error kind so
        // the caller cannot tell which factor failed.
        let user = match self.store.find_by_email(&req.email).await? {
            Some(u) => u,
            None => {
                warn!(email = %req.email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id)?;
        info!(user_id = user.id, email = %user.email, "user logged in");
        Ok(token)
    }
}
