use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::Utc;
use ethioguide_portal::{
    config::Config,
    responses::JsonResponse,
    routes::{self, root},
    services::backend::BackendClient,
    session::{SessionManager, SessionStore},
    utils::{csrf::CSRF_HEADER, jwt::SessionKeys},
    AppState,
};
use reqwest::Client;
#[cfg(not(feature = "tls"))]
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[cfg(feature = "tls")]
use axum_server::tls_rustls::RustlsConfig;

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter).with_target(true);

    // LOG_FORMAT=json for log shippers, human readable otherwise.
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing();

    let keys = SessionKeys::from_secret(&config.session_secret)
        .context("NEXTAUTH_SECRET is not usable as a session secret")?;

    // Stricter limiter for /api/auth/*
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_auth_seconds)
            .burst_size(config.rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .ok_or_else(|| anyhow!("invalid auth rate limiter settings"))?,
    );

    let governor_limiter = auth_governor_conf.limiter().clone();
    std::thread::spawn(move || loop {
        std::thread::sleep(PRUNE_INTERVAL);
        governor_limiter.retain_recent();
    });

    let http_client = Client::builder()
        .timeout(config.backend_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let backend = Arc::new(BackendClient::new(
        http_client.clone(),
        config.api_base_url.clone(),
    ));
    let store = SessionStore::new(
        keys,
        config.session_max_age_secs,
        config.auth_cookie_secure,
    );
    let sessions = SessionManager::new(backend, store);

    let refresher = sessions.refresher().clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = refresher.prune(Utc::now().timestamp());
            if removed > 0 {
                tracing::debug!(removed, "pruned idle refresh slots");
            }
        }
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static(CSRF_HEADER)])
        .allow_credentials(true);

    let addr: SocketAddr = config.bind_addr;
    info!(api = %config.api_base_url, origin = %config.frontend_origin, "starting session service");

    let state = AppState {
        sessions,
        http_client: Arc::new(http_client),
        config: Arc::new(config),
    };

    let auth_routes = routes::auth_routes().layer(GovernorLayer {
        config: auth_governor_conf.clone(),
    });

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth_routes)
        .merge(routes::protected_routes(&state))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    #[cfg(feature = "tls")]
    {
        let cert = std::env::var("DEV_CERT_LOCATION").context("DEV_CERT_LOCATION must be set")?;
        let key = std::env::var("DEV_KEY_LOCATION").context("DEV_KEY_LOCATION must be set")?;
        let tls_config = RustlsConfig::from_pem_file(cert, key)
            .await
            .context("failed to load TLS certs")?;

        info!("listening with TLS on https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(make_service)
            .await?;
    }

    #[cfg(not(feature = "tls"))]
    {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("listening on http://{}", addr);
        axum::serve(listener, make_service).await?;
    }

    Ok(())
}
