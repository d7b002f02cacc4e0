use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use reqwest::Url;

use crate::{responses::JsonResponse, routes::auth::AuthSession, state::AppState};

#[derive(Debug, thiserror::Error)]
pub enum ProxyPathError {
    #[error("backend base url is not a usable base: {0}")]
    InvalidBase(String),
    #[error("dot segment in proxied path")]
    DotSegment,
}

const FORWARDED_HEADERS: [header::HeaderName; 3] =
    [header::CONTENT_TYPE, header::ACCEPT, header::ACCEPT_LANGUAGE];

/// Joins the decoded wildcard path onto the backend base url one segment at
/// a time. Each segment is re-encoded, so a decoded `?` or `#` cannot start
/// a query or fragment. Dot segments are refused outright.
pub fn upstream_url(base: &str, path: &str, query: Option<&str>) -> Result<Url, ProxyPathError> {
    let mut url = Url::parse(base).map_err(|err| ProxyPathError::InvalidBase(err.to_string()))?;

    let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(ProxyPathError::DotSegment);
    }

    url.path_segments_mut()
        .map_err(|_| ProxyPathError::InvalidBase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    url.set_query(query);
    Ok(url)
}

/// Forwards `/api/proxy/{path}` to `{backend}/{path}` with the session's
/// bearer token and relays the backend's status, content type and body.
pub async fn proxy_to_backend(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(path): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = match upstream_url(&app_state.config.api_base_url, &path, uri.query()) {
        Ok(url) => url,
        Err(ProxyPathError::DotSegment) => {
            tracing::warn!(%method, path = %path, "rejected proxy path with dot segment");
            return JsonResponse::bad_request("Invalid proxy path").into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "backend base url cannot be proxied to");
            return JsonResponse::server_error("Proxy is misconfigured").into_response();
        }
    };

    let mut request = app_state
        .http_client
        .request(method.clone(), url)
        .bearer_auth(&claims.access_token);
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(&name) {
            request = request.header(name, value);
        }
    }
    if !body.is_empty() {
        request = request.body(body);
    }

    let upstream = match request.send().await {
        Ok(res) => res,
        Err(err) => {
            tracing::error!(error = %err, %method, path = %path, "backend proxy request failed");
            return JsonResponse::bad_gateway("Backend unavailable").into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, path = %path, "failed to read backend response");
            return JsonResponse::bad_gateway("Backend response could not be read").into_response();
        }
    };

    tracing::debug!(%method, path = %path, status = status.as_u16(), "proxied backend request");

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}
