use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
