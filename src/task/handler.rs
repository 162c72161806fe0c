use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_)
            | super::Error::UnknownStatus(_)
            | super::Error::UnknownPriority(_) => Self::NOT_FOUND,
            super::Error::StatusExists(_) | super::Error::PriorityExists(_) => Self::CONFLICT,
            super::Error::EmptyTitle => Self::BAD_REQUEST,
            super::Error::_User(e) => e.into(),
            super::Error::_Project(e) => e.into(),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use serde::Deserialize;

    use crate::{
        project,
        task::{
            self,
            model::{Column, Draft, Priority, Status, Task},
        },
    };

    pub async fn create(
        State(task_service): State<task::Service>,
        Json(draft): Json<Draft>,
    ) -> crate::Result<(StatusCode, Json<Task>)> {
        let task = task_service.create(&draft).await?;

        Ok((StatusCode::CREATED, Json(task)))
    }

    pub async fn board(
        State(task_service): State<task::Service>,
        Path(project_id): Path<project::Id>,
    ) -> crate::Result<Json<Vec<Column>>> {
        Ok(Json(task_service.board(&project_id).await?))
    }

    #[derive(Deserialize)]
    pub struct StatusParams {
        status_id: task::StatusId,
    }

    pub async fn update_status(
        State(task_service): State<task::Service>,
        Path(id): Path<task::Id>,
        Json(params): Json<StatusParams>,
    ) -> crate::Result<Json<Task>> {
        let task = task_service.update_status(&id, &params.status_id).await?;

        Ok(Json(task))
    }

    pub async fn find_statuses(
        State(task_service): State<task::Service>,
    ) -> crate::Result<Json<Vec<Status>>> {
        Ok(Json(task_service.find_statuses().await?))
    }

    pub async fn find_priorities(
        State(task_service): State<task::Service>,
    ) -> crate::Result<Json<Vec<Priority>>> {
        Ok(Json(task_service.find_priorities().await?))
    }
}

pub(super) mod admin {
    use axum::{Extension, Json, extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use serde::Deserialize;
    use welt_service::pagination::{Page, Params};

    use crate::{
        auth, role,
        task::{
            self,
            model::{Priority, Status, Task},
        },
    };

    #[derive(Deserialize)]
    pub struct TitleParams {
        title: String,
    }

    pub async fn create_status(
        Extension(auth_user): Extension<auth::User>,
        State(task_service): State<task::Service>,
        Json(params): Json<TitleParams>,
    ) -> crate::Result<(StatusCode, Json<Status>)> {
        auth_user.require(role::STAFF)?;
        let status = task_service.create_status(&params.title).await?;

        Ok((StatusCode::CREATED, Json(status)))
    }

    pub async fn create_priority(
        Extension(auth_user): Extension<auth::User>,
        State(task_service): State<task::Service>,
        Json(params): Json<TitleParams>,
    ) -> crate::Result<(StatusCode, Json<Priority>)> {
        auth_user.require(role::STAFF)?;
        let priority = task_service.create_priority(&params.title).await?;

        Ok((StatusCode::CREATED, Json(priority)))
    }

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(task_service): State<task::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<Task>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(task_service.find_page(&params).await?))
    }
}
