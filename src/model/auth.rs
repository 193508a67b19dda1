use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Config;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token for the admin account.
///
/// Admin-only routes take one of these as a request guard; it is read from
/// the `auth_token` cookie or an `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "sub")]
    username: String,
}

impl AuthToken {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// The admin this token was issued to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Sign this token, valid for the configured lifetime.
    pub fn encode(&self, config: &Config) -> Result<String, JwtError> {
        let claims = Claims {
            token: self.clone(),
            expire_at: Utc::now() + config.auth_ttl(),
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
    }

    /// Verify a signed token and check it has not expired.
    pub fn decode(token: &str, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            token,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)
    }

    /// Wrap an already-signed token in a cookie with the same lifetime.
    pub fn cookie(signed: String, config: &Config) -> Cookie<'static> {
        Cookie::build(AUTH_TOKEN_COOKIE, signed)
            .max_age(time::Duration::seconds(config.auth_ttl().num_seconds()))
            .same_site(SameSite::Strict)
            .http_only(true)
            .finish()
    }
}

/// Token claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Raw tokens the request carries: the cookie first, then a bearer header.
fn raw_tokens(req: &Request<'_>) -> Vec<String> {
    let cookie = req
        .cookies()
        .get(AUTH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let bearer = req
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    cookie.into_iter().chain(bearer).collect()
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Accept the first carried token that decodes, so a stale cookie does
    /// not shadow a valid bearer header.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = req.guard::<&State<Config>>().await.unwrap(); // Valid as `Config` is always managed

        let raws = raw_tokens(req);
        if raws.is_empty() {
            return request::Outcome::Failure((
                Status::Unauthorized,
                Error::Unauthorized("No token provided".to_string()),
            ));
        }
        for raw in raws {
            match Self::decode(&raw, config) {
                Ok(token) => return request::Outcome::Success(token),
                Err(e) => debug!("Rejected admin token: {e}"),
            }
        }
        request::Outcome::Failure((
            Status::Unauthorized,
            Error::Unauthorized("Invalid or expired token".to_string()),
        ))
    }
}
