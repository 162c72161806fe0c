use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use welt_service::{Raw, Redact};

use crate::state::AppState;
use crate::{role, user};

mod handler;
pub mod middleware;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

/// Routes reachable without a token.
pub fn public<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/auth/signup", post(handler::api::signup))
        .route("/auth/login", post(handler::api::login))
        .route("/auth/refresh", post(handler::api::refresh))
        .with_state(s)
}

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/auth/me", get(handler::api::me))
        .with_state(s)
}

/// Identity of the caller, resolved from a bearer token.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    id: user::Id,
    email: String,
    first_name: String,
    last_name: Option<String>,
    avatar: Option<String>,
    role_id: role::Id,
    role: role::Kind,
}

impl User {
    pub fn new(u: &user::model::User, avatar: Option<String>, role: role::Kind) -> Self {
        Self {
            id: u.id().clone(),
            email: u.email().to_string(),
            first_name: u.first_name().to_string(),
            last_name: u.last_name().map(String::from),
            avatar,
            role_id: u.role_id().clone(),
            role,
        }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> String {
        user::model::full_name(&self.first_name, self.last_name.as_deref())
    }

    pub const fn role(&self) -> &role::Kind {
        &self.role
    }

    pub fn require(&self, allowed: &[role::Kind]) -> Result<()> {
        if allowed.contains(&self.role) {
            return Ok(());
        }

        Err(Error::Forbidden)
    }
}

#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct Token(String);

impl Token {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Redact for Token {}

impl Raw for Token {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.redact())
    }
}

#[derive(Deserialize)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Redact for Password {}

impl Raw for Password {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password({})", "*".repeat(self.0.chars().count()))
    }
}

#[derive(Serialize, Debug)]
pub struct Tokens {
    access_token: Token,
    refresh_token: Token,
    token_type: &'static str,
}

impl Tokens {
    pub fn new(access_token: Token, refresh_token: Token) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer",
        }
    }

    pub const fn access_token(&self) -> &Token {
        &self.access_token
    }

    pub const fn refresh_token(&self) -> &Token {
        &self.refresh_token
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("forbidden to access the resource")]
    Forbidden,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Role(#[from] role::Error),
    #[error(transparent)]
    _Bcrypt(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    _JsonWebtoken(#[from] jsonwebtoken::errors::Error),
}
