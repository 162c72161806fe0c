use std::fmt::Display;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{Output, ToSql};
use diesel::sql_types::Integer;
use repository::RequestRepository;
use serde::{Deserialize, Serialize};
use service::RequestService;

use crate::state::AppState;
use crate::{project, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn RequestRepository + Send + Sync>;
pub type Service = Arc<dyn RequestService + Send + Sync>;

welt_service::uuid_id!(StatusId);

/// Status every new request starts in.
pub const INITIAL_STATUS: &str = "IN PROGRESS";

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/requests", post(handler::api::create))
        .route("/requests/received", get(handler::api::find_received))
        .route("/requests/sent", get(handler::api::find_sent))
        .route("/requests/{id}", get(handler::api::find_by_id))
        .route("/requests/{id}/status", patch(handler::api::update_status))
        .with_state(s)
}

pub fn admin<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/requests", get(handler::admin::find_page))
        .route(
            "/request-statuses",
            post(handler::admin::create_status).get(handler::admin::find_statuses),
        )
        .route("/request-statuses/{id}", delete(handler::admin::delete_status))
        .with_state(s)
}

/// Sequential request number.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, FromSqlRow, AsExpression,
)]
#[diesel(sql_type = Integer)]
pub struct Id(i32);

impl Id {
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl From<i32> for Id {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql<Integer, Pg> for Id {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> diesel::serialize::Result {
        <i32 as ToSql<Integer, Pg>>::to_sql(&self.0, out)
    }
}

impl FromSql<Integer, Pg> for Id {
    fn from_sql(bytes: PgValue<'_>) -> diesel::deserialize::Result<Self> {
        <i32 as FromSql<Integer, Pg>>::from_sql(bytes).map(Self)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request not found: {0}")]
    NotFound(Id),
    #[error("request status '{0}' not found")]
    UnknownStatus(String),
    #[error("request status not found: {0}")]
    StatusNotFound(StatusId),
    #[error("request status '{0}' already exists")]
    StatusExists(String),
    #[error("request status {0} is still in use")]
    StatusInUse(StatusId),
    #[error("status title must not be empty")]
    EmptyTitle,
    #[error("request subject must not be empty")]
    EmptySubject,
    #[error("cannot send a request to yourself")]
    SelfRequest,

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Project(#[from] project::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
