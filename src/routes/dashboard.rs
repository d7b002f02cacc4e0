use axum::{
    extract::Path,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{models::user::UserRole, responses::JsonResponse, routes::auth::AuthSession};

/// Where the signed-in user lands after sign-in.
pub async fn dashboard_home(AuthSession(claims): AuthSession) -> Response {
    Json(json!({
        "role": claims.role,
        "redirect": claims.role.dashboard_path(),
    }))
    .into_response()
}

/// Guards one dashboard area. Users of another role are told where their
/// own dashboard is.
pub async fn dashboard_access(
    AuthSession(claims): AuthSession,
    Path(area): Path<String>,
) -> Response {
    let Ok(required) = area.parse::<UserRole>() else {
        return JsonResponse::bad_request("Unknown dashboard").into_response();
    };

    if claims.role != required {
        tracing::info!(
            user_id = %claims.user_id,
            role = %claims.role,
            area = %area,
            "dashboard access denied"
        );
        return JsonResponse::forbidden_with_redirect(
            "You do not have access to this dashboard",
            claims.role.dashboard_path(),
        )
        .into_response();
    }

    Json(json!({
        "success": true,
        "role": claims.role,
        "user": { "id": claims.user_id, "name": claims.name, "email": claims.email },
    }))
    .into_response()
}
