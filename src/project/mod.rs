use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use repository::ProjectRepository;
use service::ProjectService;

use crate::state::AppState;
use crate::user;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn ProjectRepository + Send + Sync>;
pub type Service = Arc<dyn ProjectService + Send + Sync>;

welt_service::uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/projects/my", get(handler::api::find_my))
        .with_state(s)
}

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/projects",
            post(handler::admin::create).get(handler::admin::find_page),
        )
        .route("/projects/{id}", delete(handler::admin::delete))
        .route("/projects/{id}/users", post(handler::admin::add_member))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("project not found: {0}")]
    NotFound(Id),
    #[error("project '{0}' already exists")]
    AlreadyExists(String),
    #[error("user {0} is already a member")]
    AlreadyMember(user::Id),
    #[error("project title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
