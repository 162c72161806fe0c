use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    extract::Query,
    headers::{Authorization, authorization::Bearer},
};
use log::debug;
use serde::Deserialize;

use crate::auth::{self, Token};

#[derive(Deserialize)]
pub struct Params {
    access_token: Option<Token>,
}

/// Resolves the bearer token, or the `access_token` query parameter used by
/// browser WebSocket clients, into an [`auth::User`] extension.
pub async fn authorize(
    State(auth_service): State<auth::Service>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Query(params): Query<Params>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let token = match (bearer, params.access_token) {
        (Some(TypedHeader(Authorization(bearer))), _) => Token::new(bearer.token()),
        (None, Some(token)) => token,
        (None, None) => {
            debug!("No credentials on {}", req.uri().path());
            return Err(auth::Error::Unauthorized.into());
        }
    };

    let auth_user = auth_service.authenticate(&token).await?;
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
