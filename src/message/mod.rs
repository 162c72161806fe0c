use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use repository::MessageRepository;
use service::MessageService;

use crate::state::AppState;
use crate::{chat, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn MessageRepository + Send + Sync>;
pub type Service = Arc<dyn MessageService + Send + Sync>;

welt_service::uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/chats/{id}/messages", get(handler::api::find_by_chat))
        .route(
            "/messages",
            post(handler::api::create).delete(handler::api::delete),
        )
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message not found: {0}")]
    NotFound(Id),
    #[error("not a message owner")]
    NotOwner,
    #[error("message text must not be empty")]
    EmptyText,

    #[error(transparent)]
    _Chat(#[from] chat::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
