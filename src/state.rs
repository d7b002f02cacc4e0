use crate::config::Config;
use crate::session::SessionManager;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionManager,
    pub http_client: Arc<Client>,
    pub config: Arc<Config>,
}
