use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use repository::ChatRepository;
use serde::{Deserialize, Serialize};
use service::ChatService;

use crate::state::AppState;
use crate::{message, project, request, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn ChatRepository + Send + Sync>;
pub type Service = Arc<dyn ChatService + Send + Sync>;

welt_service::uuid_id!(Id);

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/chats/my", get(handler::api::directory))
        .route("/chats", post(handler::api::create))
        .route("/chats/private", post(handler::api::create_private))
        .route("/chats/{id}/participants", post(handler::api::add_participant))
        .with_state(s)
}

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/chats", get(handler::admin::find_page))
        .route("/chats/{id}/participants", get(handler::admin::find_participants_page))
        .route("/chats/{id}", delete(handler::admin::delete))
        .with_state(s)
}

/// Where a chat came from. Stored as two nullable columns, at most one of them set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Origin {
    #[default]
    Direct,
    FromProject(project::Id),
    FromRequest(request::Id),
}

impl Origin {
    pub fn new(project_id: Option<project::Id>, request_id: Option<request::Id>) -> Self {
        match (project_id, request_id) {
            (_, Some(request_id)) => Self::FromRequest(request_id),
            (Some(project_id), None) => Self::FromProject(project_id),
            (None, None) => Self::Direct,
        }
    }

    pub const fn project_id(&self) -> Option<&project::Id> {
        match self {
            Self::FromProject(id) => Some(id),
            _ => None,
        }
    }

    pub const fn request_id(&self) -> Option<&request::Id> {
        match self {
            Self::FromRequest(id) => Some(id),
            _ => None,
        }
    }

    pub const fn is_request(&self) -> bool {
        matches!(self, Self::FromRequest(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("chat not found: {0}")]
    NotFound(Id),
    #[error("not a member of chat {0}")]
    NotMember(Id),
    #[error("private chat already exists")]
    AlreadyExists,
    #[error("user {0} is already a participant")]
    AlreadyParticipant(user::Id),
    #[error("private chat must have exactly two participants, got {0}")]
    InvalidParticipants(usize),
    #[error("private chat cannot take more participants")]
    PrivateChat,
    #[error("cannot start a private chat with yourself")]
    SelfChat,
    #[error("missing group name")]
    MissingName,
    #[error("selected user does not exist: {0}")]
    NonExistingUser(user::Id),
    #[error("chat origin does not exist")]
    UnknownOrigin,
    #[error("chats from requests are opened by the request itself")]
    UnsupportedOrigin,

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Message(#[from] Box<message::Error>),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
