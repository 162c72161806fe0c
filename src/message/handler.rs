use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotOwner => Self::FORBIDDEN,
            super::Error::EmptyText => Self::BAD_REQUEST,
            super::Error::_Chat(e) => e.into(),
            super::Error::_User(e) => e.into(),
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
    use serde::Deserialize;

    use crate::{
        auth, chat,
        message::{
            self,
            model::{ChatMessages, SentMessage},
        },
    };

    pub async fn find_by_chat(
        Extension(auth_user): Extension<auth::User>,
        State(message_service): State<message::Service>,
        Path(chat_id): Path<chat::Id>,
    ) -> crate::Result<Json<ChatMessages>> {
        let messages = message_service.find_by_chat(&chat_id, &auth_user).await?;

        Ok(Json(messages))
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        text: String,
        chat_id: chat::Id,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        State(message_service): State<message::Service>,
        Json(params): Json<CreateParams>,
    ) -> crate::Result<(StatusCode, Json<SentMessage>)> {
        let message = message_service
            .create(&params.chat_id, &auth_user, &params.text)
            .await?;

        Ok((StatusCode::CREATED, Json(message)))
    }

    #[derive(Deserialize)]
    pub struct DeleteParams {
        id: message::Id,
    }

    pub async fn delete(
        Extension(auth_user): Extension<auth::User>,
        State(message_service): State<message::Service>,
        Json(params): Json<DeleteParams>,
    ) -> crate::Result<StatusCode> {
        message_service.delete(&params.id, &auth_user).await?;

        Ok(StatusCode::NO_CONTENT)
    }
}
