use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{responses::JsonResponse, state::AppState};

pub async fn handle_logout(State(app_state): State<AppState>, jar: CookieJar) -> Response {
    let store = app_state.sessions.store();
    if let Some(claims) = store.load(&jar) {
        app_state.sessions.sign_out(&claims);
    }

    let jar = jar.add(store.expired_cookie());
    (jar, JsonResponse::success("Logged out")).into_response()
}
