use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{FromRequest, Outcome},
    time::Duration,
    Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::common::Identity;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token naming the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    pub id: Identity,
}

impl AuthToken {
    pub fn new(id: Identity) -> Self {
        Self { id }
    }

    /// Serialize this token into a signed cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>, Error> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the cookie. A missing or invalid token fails with 401;
    /// use `Option<AuthToken>` for routes that also serve anonymous callers.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = match req.rocket().state::<Config>() {
            Some(config) => config,
            None => {
                return Outcome::Failure((
                    Status::InternalServerError,
                    Error::Status(
                        Status::InternalServerError,
                        "Config is not managed".to_string(),
                    ),
                ))
            }
        };

        let cookie = try_outcome!(req.cookies().get(AUTH_TOKEN_COOKIE).into_outcome((
            Status::Unauthorized,
            Error::Status(Status::Unauthorized, "Missing auth token".to_string()),
        )));
        let token = Self::from_cookie(cookie, config);
        if let Err(ref e) = token {
            debug!("Rejected auth token: {e}");
        }
        token.into_outcome(Status::Unauthorized)
    }
}
