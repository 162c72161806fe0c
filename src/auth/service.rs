use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use email_address::EmailAddress;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use welt_service::Raw;

use super::{Password, Token, Tokens};
use crate::integration::{idp, storage};
use crate::user::model::{NewUser, User};
use crate::{auth, role, user};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
enum Kind {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug)]
struct Claims {
    sub: String,
    exp: u64,
    typ: Kind,
}

#[derive(Deserialize)]
pub struct Signup {
    first_name: String,
    last_name: Option<String>,
    email: String,
    password: Password,
    role_id: role::Id,
    avatar: Option<String>,
}

#[cfg(test)]
impl Signup {
    pub fn new(first_name: &str, email: &str, password: &str, role_id: &role::Id) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: None,
            email: email.to_string(),
            password: Password::new(password),
            role_id: role_id.clone(),
            avatar: None,
        }
    }
}

#[async_trait]
pub trait AuthService {
    async fn signup(&self, params: &Signup) -> super::Result<User>;

    async fn login(&self, email: &str, password: &Password) -> super::Result<Tokens>;

    async fn refresh(&self, refresh_token: &Token) -> super::Result<Tokens>;

    async fn authenticate(&self, access_token: &Token) -> super::Result<auth::User>;
}

#[derive(Clone)]
pub struct AuthServiceImpl {
    cfg: idp::Config,
    storage: storage::Config,
    user_service: user::Service,
    role_service: role::Service,
}

impl AuthServiceImpl {
    pub fn new(
        cfg: idp::Config,
        storage: storage::Config,
        user_service: user::Service,
        role_service: role::Service,
    ) -> Self {
        Self {
            cfg,
            storage,
            user_service,
            role_service,
        }
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn signup(&self, params: &Signup) -> super::Result<User> {
        let email = params.email.trim().to_lowercase();
        if !EmailAddress::is_valid(&email) {
            return Err(super::Error::InvalidEmail(params.email.clone()));
        }

        if self.user_service.find_by_email(&email).await?.is_some() {
            return Err(user::Error::AlreadyExists.into());
        }

        self.role_service.find_by_id(&params.role_id).await?;

        let hash = bcrypt::hash(params.password.raw(), HASH_COST)?;
        let id = user::Id::random();
        let user = self
            .user_service
            .create(&NewUser::new(
                &id,
                params.first_name.trim(),
                params.last_name.as_deref().map(str::trim),
                &email,
                &hash,
                params.avatar.as_deref(),
                &params.role_id,
            ))
            .await?;

        debug!("Signed up user {:?}", user.id());
        Ok(user)
    }

    async fn login(&self, email: &str, password: &Password) -> super::Result<Tokens> {
        let email = email.trim().to_lowercase();
        let user = self
            .user_service
            .find_by_email(&email)
            .await?
            .ok_or(super::Error::InvalidCredentials)?;

        if !bcrypt::verify(password.raw(), user.password())? {
            debug!("Password mismatch for {:?}", user.id());
            return Err(super::Error::InvalidCredentials);
        }

        let access_token = self.issue(&email, Kind::Access)?;
        let refresh_token = self.issue(&email, Kind::Refresh)?;

        Ok(Tokens::new(access_token, refresh_token))
    }

    async fn refresh(&self, refresh_token: &Token) -> super::Result<Tokens> {
        let claims = self.validate(refresh_token, Kind::Refresh)?;

        if self.user_service.find_by_email(&claims.sub).await?.is_none() {
            debug!("Refresh token subject is gone");
            return Err(super::Error::Unauthorized);
        }

        let access_token = self.issue(&claims.sub, Kind::Access)?;

        Ok(Tokens::new(access_token, refresh_token.clone()))
    }

    async fn authenticate(&self, access_token: &Token) -> super::Result<auth::User> {
        let claims = self.validate(access_token, Kind::Access)?;

        let user = self
            .user_service
            .find_by_email(&claims.sub)
            .await?
            .ok_or(super::Error::Unauthorized)?;
        let role = self.role_service.find_by_id(user.role_id()).await?;

        Ok(auth::User::new(
            &user,
            self.storage.resolve_opt(user.avatar()),
            role.kind(),
        ))
    }
}

impl AuthServiceImpl {
    fn issue(&self, email: &str, typ: Kind) -> super::Result<Token> {
        let (secret, ttl) = match typ {
            Kind::Access => (self.cfg.access_secret(), self.cfg.access_ttl()),
            Kind::Refresh => (self.cfg.refresh_secret(), self.cfg.refresh_ttl()),
        };

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + ttl).as_secs(),
            typ,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )?;

        Ok(Token::new(token))
    }

    fn validate(&self, token: &Token, expected: Kind) -> super::Result<Claims> {
        let secret = match expected {
            Kind::Access => self.cfg.access_secret(),
            Kind::Refresh => self.cfg.refresh_secret(),
        };

        let claims = decode::<Claims>(
            token.raw(),
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            warn!("Rejected {token:?}: {e}");
            super::Error::Unauthorized
        })?;

        if claims.typ != expected {
            warn!("Rejected {token:?}: expected {expected:?} token");
            return Err(super::Error::Unauthorized);
        }

        Ok(claims)
    }
}
