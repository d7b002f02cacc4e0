use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use crate::models::user::{Identity, SocialProvider, UserRole};

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct SocialRequest<'a> {
    pub provider: SocialProvider,
    pub code: &'a str,
}

#[derive(Debug, Deserialize, Default)]
pub struct BackendUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<BackendUser>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|msg| !msg.trim().is_empty())
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(AuthError::MissingField(field))
}

impl TryFrom<AuthResponse> for Identity {
    type Error = AuthError;

    fn try_from(response: AuthResponse) -> Result<Self, Self::Error> {
        let user = response.user.ok_or(AuthError::MissingField("user"))?;
        let access_token = required(response.access_token, "access_token")?;
        let id = required(user.id, "user.id")?;
        let email = required(user.email, "user.email")?;
        let role = required(user.role, "user.role")?
            .parse::<UserRole>()
            .map_err(|unknown| AuthError::UnknownRole(unknown.0))?;
        let name = user
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());

        Ok(Identity {
            id,
            name,
            email,
            role,
            access_token,
            refresh_token: response.refresh_token,
        })
    }
}
