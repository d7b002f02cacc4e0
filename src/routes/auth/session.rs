use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde_json::Value;

use crate::{
    responses::JsonResponse,
    session::{PublicSession, RefreshTrigger, SessionClaims},
    state::AppState,
};

/// Claims of the signed-in user. Rejects requests without a session, and
/// sessions whose last refresh failed so the client re-authenticates.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub SessionClaims);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .ok_or_else(|| JsonResponse::unauthorized("Not authenticated").into_response())?;

        if let Some(error) = claims.error {
            return Err(JsonResponse::unauthorized_with_code(
                "Session expired. Please sign in again.",
                error.code(),
            )
            .into_response());
        }

        Ok(AuthSession(claims))
    }
}

/// Adds the session cookie for `claims` to `jar`.
pub(crate) fn persist_session(
    app_state: &AppState,
    jar: CookieJar,
    claims: &SessionClaims,
    now: i64,
) -> Result<CookieJar, Response> {
    let store = app_state.sessions.store();
    match store.encode(claims, now) {
        Ok(token) => Ok(jar.add(store.session_cookie(token))),
        Err(err) => {
            tracing::error!(error = %err, sid = %claims.sid, "failed to encode session");
            Err(JsonResponse::server_error("Failed to persist session").into_response())
        }
    }
}

/// Loads the session cookie, refreshes the access token when it has
/// expired, and exposes the claims to downstream extractors. The cookie is
/// rewritten only when the claims changed.
pub async fn refresh_session(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(claims) = app_state.sessions.store().load(&jar) else {
        return next.run(req).await;
    };

    let now = Utc::now().timestamp();
    let current = app_state
        .sessions
        .read(claims.clone(), RefreshTrigger::Read, now)
        .await;
    let changed = current != claims;

    req.extensions_mut().insert(current.clone());
    let response = next.run(req).await;

    if !changed {
        return response;
    }
    match persist_session(&app_state, jar, &current, now) {
        Ok(jar) => (jar, response).into_response(),
        Err(_) => response,
    }
}

async fn respond_with_session(
    app_state: AppState,
    jar: CookieJar,
    trigger: RefreshTrigger,
) -> Response {
    let Some(claims) = app_state.sessions.store().load(&jar) else {
        return match trigger {
            RefreshTrigger::Read => Json(Value::Null).into_response(),
            RefreshTrigger::Update => JsonResponse::unauthorized("Not authenticated").into_response(),
        };
    };

    let now = Utc::now().timestamp();
    let current = app_state.sessions.read(claims, trigger, now).await;

    match persist_session(&app_state, jar, &current, now) {
        Ok(jar) => (jar, Json(PublicSession::from(&current))).into_response(),
        Err(resp) => resp,
    }
}

/// `GET /api/auth/session`: the public session, or `null` when signed out.
pub async fn handle_session(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    respond_with_session(app_state, jar, RefreshTrigger::Read).await
}

/// `POST /api/auth/session`: force a token refresh.
pub async fn handle_session_update(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    respond_with_session(app_state, jar, RefreshTrigger::Update).await
}
