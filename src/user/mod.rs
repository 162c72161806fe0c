use std::sync::Arc;

use axum::{Router, routing::get};
use repository::UserRepository;
use service::UserService;

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn UserRepository + Send + Sync>;
pub type Service = Arc<dyn UserService + Send + Sync>;

welt_service::uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/users/except-me", get(handler::api::find_except_me))
        .with_state(s)
}

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/users", get(handler::admin::find_page))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0}")]
    NotFound(Id),
    #[error("user with such email already exists")]
    AlreadyExists,

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
