use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret used to sign and seal the session cookie.
    pub session_secret: String,
    /// Base URL of the remote REST backend, without a trailing slash.
    pub api_base_url: String,
    pub frontend_origin: String,
    pub bind_addr: SocketAddr,
    pub auth_cookie_secure: bool,
    pub session_max_age_secs: i64,
    pub backend_timeout: Duration,
    pub rate_limit_auth_seconds: u64,
    pub rate_limit_auth_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let session_secret = required("NEXTAUTH_SECRET")?;
        let api_base_url = required("NEXT_PUBLIC_API_URL")?
            .trim_end_matches('/')
            .to_string();

        let frontend_origin =
            env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Config {
            session_secret,
            api_base_url,
            frontend_origin,
            bind_addr: parsed("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 4000)))?,
            auth_cookie_secure: parsed("AUTH_COOKIE_SECURE", true)?,
            session_max_age_secs: positive("SESSION_MAX_AGE_SECS", DEFAULT_SESSION_MAX_AGE_SECS)?,
            backend_timeout: Duration::from_secs(positive(
                "BACKEND_TIMEOUT_SECS",
                DEFAULT_BACKEND_TIMEOUT_SECS,
            )?),
            rate_limit_auth_seconds: positive("RATE_LIMITER_AUTH_SECONDS", 1)?,
            rate_limit_auth_burst: positive("RATE_LIMITER_AUTH_BURST", 10)?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// Like `parsed`, but zero and negative values are rejected.
fn positive<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default + ToString,
{
    let value = parsed(key, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
