use axum::{
    body::Body,
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{self, prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand_core::RngCore;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{responses::JsonResponse, state::AppState};

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Double-submit check for state-changing methods: the `x-csrf-token`
/// header must equal the `csrf_token` cookie.
pub async fn validate_csrf(req: Request<Body>, next: Next) -> Response {
    if !matches!(
        req.method(),
        &Method::POST | &Method::PUT | &Method::DELETE | &Method::PATCH
    ) {
        return next.run(req).await;
    }

    let header_token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let jar = CookieJar::from_headers(req.headers());
    let cookie_token = jar.get(CSRF_COOKIE).map(|c| c.value().to_owned());

    match (header_token, cookie_token) {
        (Some(header), Some(cookie))
            if !header.is_empty() && bool::from(header.as_bytes().ct_eq(cookie.as_bytes())) =>
        {
            next.run(req).await
        }
        _ => {
            tracing::debug!(method = %req.method(), path = %req.uri().path(), "csrf check failed");
            JsonResponse::forbidden("Invalid CSRF token").into_response()
        }
    }
}

pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 32]; // 256-bit token
    rand_core::OsRng.fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

pub async fn get_csrf_token(State(app_state): State<AppState>) -> Response {
    let token = generate_csrf_token();

    // Readable by the client so it can echo the value back in the header.
    let cookie = Cookie::build((CSRF_COOKIE, token.clone()))
        .path("/")
        .same_site(SameSite::Strict)
        .secure(app_state.config.auth_cookie_secure)
        .build();

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.insert(SET_COOKIE, value);
        }
        Err(err) => {
            tracing::error!(?err, "failed to build csrf cookie header");
            return JsonResponse::server_error("Failed to issue CSRF token").into_response();
        }
    }

    (StatusCode::OK, headers, Json(json!({ "csrfToken": token }))).into_response()
}
