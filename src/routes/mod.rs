pub mod auth;
pub mod dashboard;
pub mod proxy;
#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{any, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    responses::JsonResponse,
    state::AppState,
    utils::csrf::{get_csrf_token, validate_csrf},
};

use auth::{
    handle_login, handle_logout, handle_session, handle_session_update, handle_social_login,
    refresh_session,
};
use dashboard::{dashboard_access, dashboard_home};
use proxy::proxy_to_backend;

pub async fn root() -> impl IntoResponse {
    JsonResponse::success("EthioGuide session service")
}

/// `/api/auth/*`. State-changing requests need the CSRF header.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handle_login))
        .route("/social", post(handle_social_login))
        .route("/logout", post(handle_logout))
        .route("/session", get(handle_session).post(handle_session_update))
        .layer(from_fn(validate_csrf))
        .route("/csrf", get(get_csrf_token))
}

/// Routes behind the session guard. Expired access tokens are refreshed
/// before the handler runs.
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(dashboard_home))
        .route("/api/dashboard/{area}", get(dashboard_access))
        .route("/api/proxy/{*path}", any(proxy_to_backend))
        .layer(from_fn(validate_csrf))
        .layer(from_fn_with_state(state.clone(), refresh_session))
}

/// Full application without rate limiting or CORS, which `main` layers on
/// top since they depend on the listener and deployment.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth_routes())
        .merge(protected_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::user::UserRole,
        routes::test_support::{build_state, sample_claims, sample_identity, session_cookie_header},
        services::backend::mock_backend::MockAuthBackend,
        utils::csrf::CSRF_HEADER,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn login_without_csrf_is_forbidden() {
        let state = build_state(Arc::new(MockAuthBackend::with_identity(sample_identity(
            UserRole::User,
        ))));

        let res = router(state)
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "identifier": "a", "password": "b" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn csrf_then_login_then_session_round_trip() {
        let state = build_state(Arc::new(MockAuthBackend::with_identity(sample_identity(
            UserRole::Org,
        ))));
        let app = router(state);

        let res = app
            .clone()
            .oneshot(Request::get("/api/auth/csrf").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let csrf = serde_json::from_slice::<Value>(&body).unwrap()["csrfToken"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(CSRF_HEADER, &csrf)
                    .header(header::COOKIE, format!("csrf_token={csrf}"))
                    .body(Body::from(
                        json!({ "identifier": "abebe", "password": "pw" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let session_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let res = app
            .oneshot(
                Request::get("/api/auth/session")
                    .header(header::COOKIE, session_cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user"]["email"], "abebe@example.et");
        assert_eq!(json["user"]["role"], "org");
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let state = build_state(Arc::new(MockAuthBackend::default()));

        let res = router(state)
            .oneshot(Request::get("/api/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn dashboard_reads_session_cookie() {
        let state = build_state(Arc::new(MockAuthBackend::default()));
        let cookie = session_cookie_header(&state, &sample_claims(3600));

        let res = router(state)
            .oneshot(
                Request::get("/api/dashboard")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["redirect"], "/organization");
    }

    #[tokio::test]
    async fn failed_refresh_on_guarded_route_asks_for_sign_in() {
        let state = build_state(Arc::new(MockAuthBackend::default()));
        let cookie = session_cookie_header(&state, &sample_claims(-60));

        let res = router(state)
            .oneshot(
                Request::get("/api/dashboard")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_some());
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "RefreshAccessTokenError");
    }
}
