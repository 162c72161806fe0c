use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::Unauthorized => Self::UNAUTHORIZED,
            super::Error::Forbidden => Self::FORBIDDEN,
            super::Error::InvalidCredentials | super::Error::InvalidEmail(_) => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_Role(e) => e.into(),
            super::Error::_Bcrypt(_) | super::Error::_JsonWebtoken(_) => {
                Self::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub(super) mod api {
    use axum::{Extension, Form, Json, extract::State, http::StatusCode};
    use serde::Deserialize;

    use crate::{
        auth::{self, Password, Token, Tokens, service::Signup},
        user::{self, model::UserDto},
    };

    pub async fn signup(
        State(auth_service): State<auth::Service>,
        State(user_service): State<user::Service>,
        Json(params): Json<Signup>,
    ) -> crate::Result<(StatusCode, Json<UserDto>)> {
        let user = auth_service.signup(&params).await?;

        Ok((StatusCode::CREATED, Json(user_service.to_dto(&user))))
    }

    #[derive(Deserialize)]
    pub struct LoginForm {
        username: String,
        password: Password,
    }

    pub async fn login(
        State(auth_service): State<auth::Service>,
        Form(form): Form<LoginForm>,
    ) -> crate::Result<Json<Tokens>> {
        let tokens = auth_service.login(&form.username, &form.password).await?;

        Ok(Json(tokens))
    }

    #[derive(Deserialize)]
    pub struct RefreshParams {
        refresh_token: Token,
    }

    pub async fn refresh(
        State(auth_service): State<auth::Service>,
        Json(params): Json<RefreshParams>,
    ) -> crate::Result<Json<Tokens>> {
        let tokens = auth_service.refresh(&params.refresh_token).await?;

        Ok(Json(tokens))
    }

    pub async fn me(Extension(auth_user): Extension<auth::User>) -> Json<auth::User> {
        Json(auth_user)
    }
}
