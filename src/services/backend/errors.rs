use thiserror::Error;

/// Sign-in failures. `Credentials` and `Social` carry the backend's own
/// message so the login form can show it unchanged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Credentials(String),
    #[error("{0}")]
    Social(String),
    #[error("backend response is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("backend returned unknown role `{0}`")]
    UnknownRole(String),
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("refresh response is missing access_token")]
    MissingAccessToken,
    #[error("refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
