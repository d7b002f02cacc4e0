pub mod accessor;
pub mod claims;
pub mod refresh;
pub mod store;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    models::user::{Identity, SocialProvider},
    services::backend::{AuthBackend, AuthError},
    utils::token::expiry_or_default,
};

pub use accessor::PublicSession;
pub use claims::{SessionClaims, SessionError};
pub use refresh::{RefreshScheduler, RefreshTrigger};
pub use store::{SessionStore, SessionStoreError, SESSION_COOKIE};

/// Owns the session lifecycle: sign-in, lazy refresh on read, sign-out.
/// One instance lives in the application state and is shared by handlers.
#[derive(Clone)]
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    refresher: RefreshScheduler,
    store: SessionStore,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn AuthBackend>, store: SessionStore) -> Self {
        Self {
            refresher: RefreshScheduler::new(backend.clone()),
            backend,
            store,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn refresher(&self) -> &RefreshScheduler {
        &self.refresher
    }

    pub async fn sign_in_with_credentials(
        &self,
        identifier: &str,
        password: &str,
        now: i64,
    ) -> Result<SessionClaims, AuthError> {
        let identity = self.backend.login(identifier, password).await?;
        Ok(self.start_session(identity, now))
    }

    pub async fn sign_in_with_social(
        &self,
        provider: SocialProvider,
        code: &str,
        now: i64,
    ) -> Result<SessionClaims, AuthError> {
        let identity = self.backend.social_login(provider, code).await?;
        Ok(self.start_session(identity, now))
    }

    fn start_session(&self, identity: Identity, now: i64) -> SessionClaims {
        let claims = SessionClaims {
            sid: Uuid::new_v4().to_string(),
            access_token_expires: expiry_or_default(&identity.access_token, now),
            user_id: identity.id,
            name: identity.name,
            email: identity.email,
            role: identity.role,
            access_token: identity.access_token,
            refresh_token: identity.refresh_token,
            error: None,
            error_details: None,
        };
        info!(sid = %claims.sid, user_id = %claims.user_id, role = %claims.role, "session started");
        claims
    }

    /// Returns the claims to use for this request, refreshing the access
    /// token first when it has expired or an update was requested.
    pub async fn read(
        &self,
        claims: SessionClaims,
        trigger: RefreshTrigger,
        now: i64,
    ) -> SessionClaims {
        if RefreshScheduler::should_refresh(&claims, trigger, now) {
            self.refresher.refresh(claims, now).await
        } else {
            claims
        }
    }

    pub fn sign_out(&self, claims: &SessionClaims) {
        self.refresher.forget(&claims.sid);
        info!(sid = %claims.sid, user_id = %claims.user_id, "session ended");
    }
}
