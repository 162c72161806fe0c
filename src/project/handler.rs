use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists(_) | super::Error::AlreadyMember(_) => Self::CONFLICT,
            super::Error::EmptyTitle => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{Extension, Json, extract::State};

    use crate::{
        auth,
        project::{self, model::ProjectDto},
    };

    pub async fn find_my(
        Extension(auth_user): Extension<auth::User>,
        State(project_service): State<project::Service>,
    ) -> crate::Result<Json<Vec<ProjectDto>>> {
        let projects = project_service.find_my(&auth_user).await?;

        Ok(Json(projects))
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
        project::{self, model::ProjectDto},
        role, user,
    };

    #[derive(Deserialize)]
    pub struct CreateParams {
        title: String,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        State(project_service): State<project::Service>,
        Json(params): Json<CreateParams>,
    ) -> crate::Result<(StatusCode, Json<ProjectDto>)> {
        auth_user.require(role::STAFF)?;
        let project = project_service.create(&auth_user, &params.title).await?;

        Ok((StatusCode::CREATED, Json(project)))
    }

    #[derive(Deserialize)]
    pub struct MemberParams {
        user_id: user::Id,
    }

    pub async fn add_member(
        Extension(auth_user): Extension<auth::User>,
        State(project_service): State<project::Service>,
        Path(id): Path<project::Id>,
        Json(params): Json<MemberParams>,
    ) -> crate::Result<StatusCode> {
        auth_user.require(role::STAFF)?;
        project_service.add_member(&id, &params.user_id).await?;

        Ok(StatusCode::CREATED)
    }

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(project_service): State<project::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<ProjectDto>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(project_service.find_page(&params).await?))
    }

    pub async fn delete(
        Extension(auth_user): Extension<auth::User>,
        State(project_service): State<project::Service>,
        Path(id): Path<project::Id>,
    ) -> crate::Result<StatusCode> {
        auth_user.require(role::STAFF)?;
        project_service.delete(&id).await?;

        Ok(StatusCode::NO_CONTENT)
    }
}
