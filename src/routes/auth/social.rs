use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::login::signed_in_response;
use crate::{models::user::SocialProvider, responses::JsonResponse, state::AppState};

#[derive(Deserialize, Serialize)]
pub struct SocialLoginPayload {
    pub provider: SocialProvider,
    /// Authorization code obtained from the provider's consent screen.
    pub code: String,
}

pub async fn handle_social_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SocialLoginPayload>,
) -> Response {
    if payload.code.trim().is_empty() {
        return JsonResponse::bad_request("Authorization code is required").into_response();
    }

    tracing::debug!(provider = %payload.provider, "social sign-in");
    let now = Utc::now().timestamp();
    let result = app_state
        .sessions
        .sign_in_with_social(payload.provider, payload.code.trim(), now)
        .await;

    signed_in_response(&app_state, jar, result, now)
}
