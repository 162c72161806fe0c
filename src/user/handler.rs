use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::AlreadyExists => Self::CONFLICT,
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{Extension, Json, extract::State};
    use axum_extra::extract::Query;
    use welt_service::pagination::{Page, Params};

    use crate::{
        auth,
        user::{self, model::UserDto},
    };

    pub async fn find_except_me(
        Extension(auth_user): Extension<auth::User>,
        State(user_service): State<user::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<UserDto>>> {
        let params = params.validate()?;
        let page = user_service
            .find_page(Some(auth_user.id()), &params)
            .await?;

        Ok(Json(page))
    }
}

pub(super) mod admin {
    use axum::{Extension, Json, extract::State};
    use axum_extra::extract::Query;
    use welt_service::pagination::{Page, Params};

    use crate::{
        auth, role,
        user::{self, model::UserDto},
    };

    pub async fn find_page(
        Extension(auth_user): Extension<auth::User>,
        State(user_service): State<user::Service>,
        Query(params): Query<Params>,
    ) -> crate::Result<Json<Page<UserDto>>> {
        auth_user.require(role::STAFF)?;
        let params = params.validate()?;

        Ok(Json(user_service.find_page(None, &params).await?))
    }
}
