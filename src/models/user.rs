use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "lowercase")] // <- Ensures it matches JSON like "google"
pub enum SocialProvider {
    Google,
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SocialProvider::Google => "google",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[serde(alias = "organization")]
    Org,
    User,
}

impl UserRole {
    /// Landing page the portal routes each role to after sign-in.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/admin",
            UserRole::Org => "/organization",
            UserRole::User => "/user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::Org => "org",
            UserRole::User => "user",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "org" | "organization" => Ok(UserRole::Org),
            "user" => Ok(UserRole::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Principal returned by the backend after a successful credential or
/// social exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub access_token: String,
    pub refresh_token: Option<String>,
}
