use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use repository::RoleRepository;
use serde::Serialize;
use service::RoleService;

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn RoleRepository + Send + Sync>;
pub type Service = Arc<dyn RoleService + Send + Sync>;

welt_service::uuid_id!(Id);

/// Roles allowed to administer projects, chats and catalogs.
pub const STAFF: &[Kind] = &[Kind::Admin, Kind::Moderator];

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/roles", post(handler::admin::create))
        .route("/roles", get(handler::admin::find_page))
        .route("/roles/{id}", delete(handler::admin::delete))
        .with_state(s)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Admin,
    Moderator,
    User,
    Other(String),
}

impl Kind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::Moderator => "MODERATOR",
            Self::User => "USER",
            Self::Other(title) => title,
        }
    }
}

impl From<&str> for Kind {
    fn from(title: &str) -> Self {
        match title.trim().to_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "MODERATOR" => Self::Moderator,
            "USER" => Self::User,
            _ => Self::Other(title.to_string()),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Kind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("role not found: {0}")]
    NotFound(Id),
    #[error("role '{0}' already exists")]
    AlreadyExists(String),
    #[error("role title must not be empty")]
    EmptyTitle,
    #[error("role {0} is still held by users")]
    InUse(Id),

    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
