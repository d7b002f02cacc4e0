use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Duration as TimeDuration;
use tracing::debug;

use super::claims::SessionClaims;
use crate::utils::{
    encryption::{open, seal, EncryptionError},
    jwt::{create_jwt, decode_jwt, SessionKeys},
};

pub const SESSION_COOKIE: &str = "ethioguide.session-token";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session token signature error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("session envelope error: {0}")]
    Envelope(#[from] EncryptionError),
}

#[derive(Serialize, Deserialize)]
struct SessionEnvelope {
    iat: i64,
    exp: i64,
    #[serde(flatten)]
    claims: SessionClaims,
}

/// Persists claims between requests inside a signed, encrypted cookie.
/// Nothing is kept server side, so rotating the secret invalidates every
/// outstanding session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    keys: SessionKeys,
    max_age_secs: i64,
    secure: bool,
}

impl SessionStore {
    pub fn new(keys: SessionKeys, max_age_secs: i64, secure: bool) -> Self {
        Self {
            keys,
            max_age_secs,
            secure,
        }
    }

    pub fn encode(&self, claims: &SessionClaims, now: i64) -> Result<String, SessionStoreError> {
        let envelope = SessionEnvelope {
            iat: now,
            exp: now + self.max_age_secs,
            claims: claims.clone(),
        };
        let jwt = create_jwt(&envelope, &self.keys)?;
        Ok(seal(self.keys.sealing_key(), &jwt)?)
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims, SessionStoreError> {
        let jwt = open(self.keys.sealing_key(), token)?;
        let data = decode_jwt::<SessionEnvelope>(&jwt, &self.keys)?;
        Ok(data.claims.claims)
    }

    /// Claims from the request's session cookie, if present and valid.
    pub fn load(&self, jar: &CookieJar) -> Option<SessionClaims> {
        let cookie = jar.get(SESSION_COOKIE)?;
        match self.decode(cookie.value()) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "discarding unreadable session cookie");
                None
            }
        }
    }

    pub fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(TimeDuration::seconds(self.max_age_secs))
            .build()
    }

    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(TimeDuration::seconds(0))
            .build()
    }
}
