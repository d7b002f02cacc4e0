use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{
    errors::{AuthError, RefreshError},
    service::{AuthBackend, RefreshedToken},
};
use crate::models::user::{Identity, SocialProvider};

/// Scriptable backend double. `identity = None` rejects sign-in with
/// `rejection`; `refreshed = None` rejects refreshes with a 401.
pub struct MockAuthBackend {
    pub identity: Option<Identity>,
    pub rejection: String,
    pub refreshed: Mutex<Option<RefreshedToken>>,
    pub refresh_delay: Duration,
    refresh_calls: Mutex<Vec<String>>,
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self {
            identity: None,
            rejection: "Invalid credentials".into(),
            refreshed: Mutex::new(None),
            refresh_delay: Duration::from_millis(0),
            refresh_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockAuthBackend {
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..Default::default()
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: message.to_string(),
            ..Default::default()
        }
    }

    pub fn refreshing_to(self, token: &str) -> Self {
        *self.refreshed.lock().unwrap() = Some(RefreshedToken {
            access_token: token.to_string(),
            refresh_token: None,
        });
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Tokens presented to `refresh`, in call order.
    pub fn refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, _identifier: &str, _password: &str) -> Result<Identity, AuthError> {
        self.identity
            .clone()
            .ok_or_else(|| AuthError::Credentials(self.rejection.clone()))
    }

    async fn social_login(
        &self,
        _provider: SocialProvider,
        _code: &str,
    ) -> Result<Identity, AuthError> {
        self.identity
            .clone()
            .ok_or_else(|| AuthError::Social(self.rejection.clone()))
    }

    async fn refresh(&self, access_token: &str) -> Result<RefreshedToken, RefreshError> {
        if !self.refresh_delay.is_zero() {
            sleep(self.refresh_delay).await;
        }
        self.refresh_calls
            .lock()
            .unwrap()
            .push(access_token.to_string());

        self.refreshed
            .lock()
            .unwrap()
            .clone()
            .ok_or(RefreshError::Rejected {
                status: 401,
                message: "Unauthorized".into(),
            })
    }
}
