use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum SessionError {
    #[serde(rename = "RefreshAccessTokenError")]
    RefreshAccessToken,
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::RefreshAccessToken => "RefreshAccessTokenError",
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct SessionClaims {
    pub sid: String, // single-flight key, minted at sign-in
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub access_token_expires: i64, // unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl SessionClaims {
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.access_token_expires
    }
}
