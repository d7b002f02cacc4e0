use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use super::{
    errors::{AuthError, RefreshError},
    models::{AuthResponse, BackendErrorBody, LoginRequest, RefreshResponse, SocialRequest},
    service::{AuthBackend, RefreshedToken},
};
use crate::models::user::{Identity, SocialProvider};

const DEFAULT_LOGIN_ERROR: &str = "Invalid credentials";
const DEFAULT_SOCIAL_ERROR: &str = "Social sign-in failed";

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Pulls a human readable message out of a failed backend response,
/// preferring the JSON `message`/`error` fields over the raw body.
async fn error_message(res: Response) -> Option<String> {
    let text = res.text().await.ok()?;
    serde_json::from_str::<BackendErrorBody>(&text)
        .ok()
        .and_then(BackendErrorBody::into_message)
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
}

#[async_trait]
impl AuthBackend for BackendClient {
    async fn login(&self, identifier: &str, password: &str) -> Result<Identity, AuthError> {
        let res = self
            .client
            .post(self.url("auth/login"))
            .json(&LoginRequest {
                identifier,
                password,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let message = error_message(res)
                .await
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
            debug!(%status, "backend rejected credential login");
            return Err(AuthError::Credentials(message));
        }

        let body: AuthResponse = res.json().await?;
        Identity::try_from(body)
    }

    async fn social_login(
        &self,
        provider: SocialProvider,
        code: &str,
    ) -> Result<Identity, AuthError> {
        let res = self
            .client
            .post(self.url("auth/social"))
            .json(&SocialRequest { provider, code })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let message = error_message(res)
                .await
                .unwrap_or_else(|| DEFAULT_SOCIAL_ERROR.to_string());
            debug!(%status, %provider, "backend rejected social login");
            return Err(AuthError::Social(message));
        }

        let body: AuthResponse = res.json().await?;
        Identity::try_from(body)
    }

    async fn refresh(&self, access_token: &str) -> Result<RefreshedToken, RefreshError> {
        let res = self
            .client
            .post(self.url("auth/refresh"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = error_message(res)
                .await
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("refresh failed").to_string());
            warn!(%status, "backend rejected token refresh");
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: RefreshResponse = res.json().await?;
        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::MissingAccessToken)?;

        Ok(RefreshedToken {
            access_token,
            refresh_token: body.refresh_token,
        })
    }
}
