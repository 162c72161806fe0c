use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;
use welt_service::pagination;

use crate::{auth, chat, message, project, request, role, task, user};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Role(#[from] role::Error),
    #[error(transparent)]
    _Project(#[from] project::Error),
    #[error(transparent)]
    _Request(#[from] request::Error),
    #[error(transparent)]
    _Task(#[from] task::Error),
    #[error(transparent)]
    _Chat(#[from] chat::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Pagination(#[from] pagination::Error),
}

impl From<Error> for StatusCode {
    fn from(e: Error) -> Self {
        match e {
            Error::_Auth(e) => e.into(),
            Error::_User(e) => e.into(),
            Error::_Role(e) => e.into(),
            Error::_Project(e) => e.into(),
            Error::_Request(e) => e.into(),
            Error::_Task(e) => e.into(),
            Error::_Chat(e) => e.into(),
            Error::_Message(e) => e.into(),
            Error::_Pagination(_) => Self::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let reason = self.to_string();
        let status = StatusCode::from(self);

        let message = match status {
            s if s.is_server_error() => {
                error!("{reason}");
                "Internal server error".to_owned()
            }
            StatusCode::UNAUTHORIZED => {
                warn!("{reason}");
                "Could not validate credentials".to_owned()
            }
            _ => {
                warn!("{reason}");
                reason
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
