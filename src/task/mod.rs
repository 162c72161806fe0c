use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use repository::TaskRepository;
use service::TaskService;

use crate::state::AppState;
use crate::{project, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn TaskRepository + Send + Sync>;
pub type Service = Arc<dyn TaskService + Send + Sync>;

welt_service::uuid_id!(Id);
welt_service::uuid_id!(StatusId);
welt_service::uuid_id!(PriorityId);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/tasks", post(handler::api::create))
        .route("/tasks/statuses", get(handler::api::find_statuses))
        .route("/tasks/priorities", get(handler::api::find_priorities))
        .route("/tasks/project/{project_id}", get(handler::api::board))
        .route("/tasks/{id}/status", put(handler::api::update_status))
        .with_state(s)
}

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/tasks", get(handler::admin::find_page))
        .route("/task-statuses", post(handler::admin::create_status))
        .route("/task-priorities", post(handler::admin::create_priority))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("task not found: {0}")]
    NotFound(Id),
    #[error("task status not found: {0}")]
    UnknownStatus(StatusId),
    #[error("task priority not found: {0}")]
    UnknownPriority(PriorityId),
    #[error("task status '{0}' already exists")]
    StatusExists(String),
    #[error("task priority '{0}' already exists")]
    PriorityExists(String),
    #[error("title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Project(#[from] project::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
