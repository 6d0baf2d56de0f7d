use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::SessionConfig, error::ApiError, state::AppState};

/// Claims carried inside the session cookie value.
///
/// The cookie is still bearer-style (possession proves identity), but the
/// value is an HMAC-signed token rather than a raw account id, so a session
/// cannot be forged without the server secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,  // account id
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at, mirrors the cookie Max-Age
}

/// Session token signing/verification keys plus cookie settings.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub cookie_name: String,
    pub max_age: Duration,
    pub secure: bool,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            cookie_name,
            max_age_secs,
            cookie_secure,
        } = state.config.session.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            cookie_name,
            max_age: Duration::from_secs(max_age_secs),
            secure: cookie_secure,
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, account_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.max_age.as_secs() as i64);
        let claims = SessionClaims {
            sub: account_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %account_id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    /// `Set-Cookie` value establishing a session.
    pub fn issue_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            self.cookie_name,
            token,
            self.max_age.as_secs(),
            if self.secure { "; Secure" } else { "" },
        )
    }

    /// `Set-Cookie` value clearing the session.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.cookie_name,
            if self.secure { "; Secure" } else { "" },
        )
    }

    /// Account id asserted by the request's session cookie, if any.
    ///
    /// An absent, unreadable or unverifiable cookie is "no session", never
    /// an error.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<Uuid> {
        let raw = headers.get(header::COOKIE)?.to_str().ok()?;
        for cookie in raw.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == self.cookie_name {
                    if let Ok(claims) = self.verify(value) {
                        return Some(claims.sub);
                    }
                }
            }
        }
        None
    }
}

/// Extracts the session cookie, returning the account id.
pub struct SessionUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        match keys.session_from_headers(&parts.headers) {
            Some(id) => Ok(SessionUser(id)),
            None => {
                warn!("missing or invalid session cookie");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
