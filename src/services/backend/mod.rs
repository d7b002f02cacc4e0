pub mod client;
pub mod errors;
#[cfg(test)]
pub mod mock_backend;
pub mod models;
pub mod service;

pub use client::BackendClient;
pub use errors::{AuthError, RefreshError};
pub use service::{AuthBackend, RefreshedToken};
