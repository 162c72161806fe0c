use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_)
            | super::Error::NonExistingUser(_)
            | super::Error::UnknownOrigin => Self::NOT_FOUND,
            super::Error::NotMember(_) => Self::FORBIDDEN,
            super::Error::AlreadyExists | super::Error::AlreadyParticipant(_) => Self::CONFLICT,
            super::Error::InvalidParticipants(_)
            | super::Error::PrivateChat
            | super::Error::SelfChat
            | super::Error::MissingName
            | super::Error::UnsupportedOrigin => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_Message(e) => (*e).into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Query;
    use serde::Deserialize;

    use crate::{
        auth,
        chat::{
            self, Origin,
            model::{ChatDto, Directory},
        },
        user,
    };

    #[derive(Deserialize)]
    pub struct DirectoryParams {
        search_query: Option<String>,
    }

    pub async fn directory(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Query(params): Query<DirectoryParams>,
    ) -> crate::Result<Json<Directory>> {
        let directory = chat_service
            .directory(&auth_user, params.search_query.as_deref())
            .await?;

        Ok(Json(directory))
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        #[serde(default)]
        name: String,
        #[serde(default)]
        is_group_chat: bool,
        #[serde(default)]
        origin: Origin,
        #[serde(default)]
        participants: Vec<user::Id>,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Json(params): Json<CreateParams>,
    ) -> crate::Result<(StatusCode, Json<ChatDto>)> {
        let chat = chat_service
            .create(
                &auth_user,
                &params.name,
                params.is_group_chat,
                &params.origin,
                &params.participants,
            )
            .await?;

        Ok((StatusCode::CREATED, Json(chat)))
    }

    #[derive(Deserialize)]
    pub struct UserParams {
        user_id: user::Id,
    }

    pub async fn create_private(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Json(params): Json<UserParams>,
    ) -> crate::Result<(StatusCode, Json<ChatDto>)> {
        let chat = chat_service
            .create_private(&auth_user, &params.user_id)
            .await?;

        Ok((StatusCode::CREATED, Json(chat)))
    }

    pub async fn add_participant(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Path(id): Path<chat::Id>,
        Json(params): Json<UserParams>,
    ) -> crate::Result<StatusCode> {
        chat_service
            .add_participant(&id, &auth_user, &params.user_id)
            .await?;

        Ok(StatusCode::CREATED)
    }
}

pub(super) mod admin {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Query;
    use welt_service::pagination::{Page, Params};

    use crate::{
        auth,
        chat::{self, model::ChatDto},
        role,
        user::model::UserDto,
    };

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<ChatDto>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(chat_service.find_page(&params).await?))
    }

    pub async fn find_participants_page(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Path(id): Path<chat::Id>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<UserDto>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(chat_service.find_participants_page(&id, &params).await?))
    }

    pub async fn delete(
        Extension(auth_user): Extension<auth::User>,
        State(chat_service): State<chat::Service>,
        Path(id): Path<chat::Id>,
    ) -> crate::Result<StatusCode> {
        auth_user.require(role::STAFF)?;
        chat_service.delete(&id).await?;

        Ok(StatusCode::NO_CONTENT)
    }
}
