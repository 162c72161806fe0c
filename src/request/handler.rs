use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_)
            | super::Error::UnknownStatus(_)
            | super::Error::StatusNotFound(_) => Self::NOT_FOUND,
            super::Error::StatusExists(_) | super::Error::StatusInUse(_) => Self::CONFLICT,
            super::Error::EmptyTitle | super::Error::EmptySubject | super::Error::SelfRequest => {
                Self::BAD_REQUEST
            }
            super::Error::_User(e) => e.into(),
            super::Error::_Project(e) => e.into(),
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
        request::{
            self,
            model::{Draft, RequestDto},
        },
    };

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Json(draft): Json<Draft>,
    ) -> crate::Result<(StatusCode, Json<RequestDto>)> {
        let request = request_service.create(&auth_user, &draft).await?;

        Ok((StatusCode::CREATED, Json(request)))
    }

    #[derive(Deserialize)]
    pub struct ReceivedParams {
        status_title: Option<String>,
    }

    pub async fn find_received(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Query(params): Query<ReceivedParams>,
    ) -> crate::Result<Json<Vec<RequestDto>>> {
        let requests = request_service
            .find_received(&auth_user, params.status_title.as_deref())
            .await?;

        Ok(Json(requests))
    }

    pub async fn find_sent(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
    ) -> crate::Result<Json<Vec<RequestDto>>> {
        Ok(Json(request_service.find_sent(&auth_user).await?))
    }

    pub async fn find_by_id(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Path(id): Path<request::Id>,
    ) -> crate::Result<Json<RequestDto>> {
        Ok(Json(request_service.find_by_id(&id, &auth_user).await?))
    }

    #[derive(Deserialize)]
    pub struct StatusParams {
        new_status_title: String,
    }

    pub async fn update_status(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Path(id): Path<request::Id>,
        Query(params): Query<StatusParams>,
    ) -> crate::Result<Json<RequestDto>> {
        let request = request_service
            .update_status(&id, &auth_user, &params.new_status_title)
            .await?;

        Ok(Json(request))
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
        request::{
            self,
            model::{RequestDto, Status},
        },
        role,
    };

    #[derive(Deserialize)]
    pub struct StatusParams {
        title: String,
    }

    pub async fn create_status(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Json(params): Json<StatusParams>,
    ) -> crate::Result<(StatusCode, Json<Status>)> {
        auth_user.require(role::STAFF)?;
        let status = request_service.create_status(&params.title).await?;

        Ok((StatusCode::CREATED, Json(status)))
    }

    pub async fn find_statuses(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
    ) -> crate::Result<Json<Vec<Status>>> {
        auth_user.require(role::STAFF)?;

        Ok(Json(request_service.find_statuses().await?))
    }

    pub async fn delete_status(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Path(id): Path<request::StatusId>,
    ) -> crate::Result<StatusCode> {
        auth_user.require(role::STAFF)?;
        request_service.delete_status(&id).await?;

        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(request_service): State<request::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<RequestDto>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(request_service.find_page(&params).await?))
    }
}
