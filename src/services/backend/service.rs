use async_trait::async_trait;

use super::errors::{AuthError, RefreshError};
use crate::models::user::{Identity, SocialProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The remote backend's authentication endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, identifier: &str, password: &str) -> Result<Identity, AuthError>;
    async fn social_login(
        &self,
        provider: SocialProvider,
        code: &str,
    ) -> Result<Identity, AuthError>;
    /// Exchanges the current (possibly expired) access token for a new one.
    async fn refresh(&self, access_token: &str) -> Result<RefreshedToken, RefreshError>;
}
