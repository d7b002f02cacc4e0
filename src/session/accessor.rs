use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::claims::{SessionClaims, SessionError};
use crate::models::user::UserRole;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// The client-visible session. Refresh tokens and error details never
/// leave the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicSession {
    pub user: PublicUser,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
    /// RFC 3339 expiry of the current access token.
    pub expires: String,
}

impl From<&SessionClaims> for PublicSession {
    fn from(claims: &SessionClaims) -> Self {
        debug!(
            sid = %claims.sid,
            user_id = %claims.user_id,
            role = %claims.role,
            expires_at = claims.access_token_expires,
            error = ?claims.error,
            "session claims"
        );

        let expires = DateTime::<Utc>::from_timestamp(claims.access_token_expires, 0)
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();

        PublicSession {
            user: PublicUser {
                id: claims.user_id.clone(),
                name: claims.name.clone(),
                email: claims.email.clone(),
                role: claims.role,
            },
            access_token: claims.access_token.clone(),
            error: claims.error,
            expires,
        }
    }
}
