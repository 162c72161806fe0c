use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists(_) | super::Error::InUse(_) => Self::CONFLICT,
            super::Error::EmptyTitle => Self::BAD_REQUEST,
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod admin {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Query;
    use serde::Deserialize;
    use welt_service::pagination::{Page, Params};

    use crate::{
        auth,
        role::{self, model::Role},
    };

    #[derive(Deserialize)]
    pub struct CreateParams {
        title: String,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        State(role_service): State<role::Service>,
        Json(params): Json<CreateParams>,
    ) -> crate::Result<(StatusCode, Json<Role>)> {
        auth_user.require(role::STAFF)?;
        let role = role_service.create(&params.title).await?;

        Ok((StatusCode::CREATED, Json(role)))
    }

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(role_service): State<role::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<Role>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(role_service.find_page(&params).await?))
    }

    pub async fn delete(
        Extension(auth_user): Extension<auth::User>,
        State(role_service): State<role::Service>,
        Path(id): Path<role::Id>,
    ) -> crate::Result<StatusCode> {
        auth_user.require(role::STAFF)?;
        role_service.delete(&id).await?;

        Ok(StatusCode::NO_CONTENT)
    }
}
