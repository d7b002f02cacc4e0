use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;

use crate::{
    config::Config,
    models::user::{Identity, UserRole},
    services::backend::mock_backend::MockAuthBackend,
    session::{SessionClaims, SessionManager, SessionStore, SESSION_COOKIE},
    state::AppState,
    utils::jwt::SessionKeys,
};

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub(crate) const NOW_OFFSET_EXPIRED: i64 = -60;

pub(crate) fn test_config(api_base_url: &str) -> Config {
    Config {
        session_secret: TEST_SECRET.into(),
        api_base_url: api_base_url.trim_end_matches('/').into(),
        frontend_origin: "http://localhost:3000".into(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        auth_cookie_secure: false,
        session_max_age_secs: 3600,
        backend_timeout: Duration::from_secs(5),
        rate_limit_auth_seconds: 1,
        rate_limit_auth_burst: 10,
    }
}

pub(crate) fn build_state_with_api(backend: Arc<MockAuthBackend>, api_base_url: &str) -> AppState {
    let config = test_config(api_base_url);
    let store = SessionStore::new(
        SessionKeys::from_secret(&config.session_secret).unwrap(),
        config.session_max_age_secs,
        config.auth_cookie_secure,
    );
    AppState {
        sessions: SessionManager::new(backend, store),
        http_client: Arc::new(Client::new()),
        config: Arc::new(config),
    }
}

pub(crate) fn build_state(backend: Arc<MockAuthBackend>) -> AppState {
    build_state_with_api(backend, "http://127.0.0.1:9")
}

pub(crate) fn sample_identity(role: UserRole) -> Identity {
    Identity {
        id: "u-1".into(),
        name: "Abebe Kebede".into(),
        email: "abebe@example.et".into(),
        role,
        access_token: "access-token".into(),
        refresh_token: Some("refresh-token".into()),
    }
}

/// Claims whose access token expires `expires_in` seconds from now.
pub(crate) fn sample_claims(expires_in: i64) -> SessionClaims {
    SessionClaims {
        sid: "sid-test".into(),
        user_id: "u-1".into(),
        name: "Abebe Kebede".into(),
        email: "abebe@example.et".into(),
        role: UserRole::Org,
        access_token: "access-token".into(),
        refresh_token: Some("refresh-token".into()),
        access_token_expires: Utc::now().timestamp() + expires_in,
        error: None,
        error_details: None,
    }
}

/// `Cookie` header value carrying `claims` as the session.
pub(crate) fn session_cookie_header(state: &AppState, claims: &SessionClaims) -> String {
    let token = state
        .sessions
        .store()
        .encode(claims, Utc::now().timestamp())
        .unwrap();
    format!("{SESSION_COOKIE}={token}")
}
