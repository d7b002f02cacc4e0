use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::session::persist_session;
use crate::{
    responses::JsonResponse,
    services::backend::AuthError,
    session::{PublicSession, SessionClaims},
    state::AppState,
};

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    /// Email address or username.
    pub identifier: String,
    pub password: String,
}

pub async fn handle_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Response {
    if payload.identifier.trim().is_empty() || payload.password.is_empty() {
        return JsonResponse::bad_request("Identifier and password are required").into_response();
    }

    let now = Utc::now().timestamp();
    let result = app_state
        .sessions
        .sign_in_with_credentials(payload.identifier.trim(), &payload.password, now)
        .await;

    signed_in_response(&app_state, jar, result, now)
}

/// Shared tail of every sign-in flow: set the session cookie on success,
/// map backend failures onto HTTP errors otherwise.
pub(crate) fn signed_in_response(
    app_state: &AppState,
    jar: CookieJar,
    result: Result<SessionClaims, AuthError>,
    now: i64,
) -> Response {
    let claims = match result {
        Ok(claims) => claims,
        Err(err) => return sign_in_error(err),
    };

    match persist_session(app_state, jar, &claims, now) {
        Ok(jar) => (
            jar,
            Json(json!({
                "success": true,
                "session": PublicSession::from(&claims),
                "redirect": claims.role.dashboard_path(),
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

fn sign_in_error(err: AuthError) -> Response {
    match &err {
        AuthError::Credentials(message) | AuthError::Social(message) => {
            tracing::info!(%message, "sign-in rejected by backend");
            JsonResponse::unauthorized(message).into_response()
        }
        AuthError::MissingField(_) | AuthError::UnknownRole(_) => {
            tracing::error!(error = %err, "unexpected sign-in response from backend");
            JsonResponse::bad_gateway("Unexpected response from authentication service")
                .into_response()
        }
        AuthError::Transport(e) => {
            tracing::error!(error = %e, "authentication service unreachable");
            JsonResponse::bad_gateway("Authentication service unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::user::UserRole,
        routes::test_support::{build_state, sample_identity},
        services::backend::mock_backend::MockAuthBackend,
        session::SESSION_COOKIE,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(backend: MockAuthBackend) -> Router {
        let state = build_state(Arc::new(backend));
        Router::new()
            .route("/login", post(handle_login))
            .with_state(state)
    }

    fn login_request(body: Value) -> Request<Body> {
        Request::post("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn successful_login_sets_session_cookie_and_redirect() {
        let backend = MockAuthBackend::with_identity(sample_identity(UserRole::Admin));

        let res = app(backend)
            .oneshot(login_request(
                json!({ "identifier": "abebe@example.et", "password": "secret" }),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));
        assert!(cookie.contains("HttpOnly"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["redirect"], "/admin");
        assert_eq!(json["session"]["user"]["role"], "admin");
        assert_eq!(json["session"]["accessToken"], "access-token");
        assert!(!body.windows(13).any(|w| w == b"refresh-token"));
    }

    #[tokio::test]
    async fn rejected_login_returns_backend_message() {
        let backend = MockAuthBackend::rejecting("Account is locked");

        let res = app(backend)
            .oneshot(login_request(json!({ "identifier": "a", "password": "b" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Account is locked");
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_before_backend() {
        let backend = MockAuthBackend::with_identity(sample_identity(UserRole::User));

        let res = app(backend)
            .oneshot(login_request(json!({ "identifier": "  ", "password": "" })))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_backend_response_maps_to_bad_gateway() {
        let res = sign_in_error(AuthError::MissingField("access_token"));
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let res = sign_in_error(AuthError::UnknownRole("superuser".into()));
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }
}
