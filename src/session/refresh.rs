use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::claims::{SessionClaims, SessionError};
use crate::{services::backend::AuthBackend, utils::token::expiry_or_default};

/// Why the session is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Ordinary read: refresh only once the access token has expired.
    Read,
    /// Explicit update: refresh regardless of expiry.
    Update,
}

#[derive(Debug, Clone)]
struct CompletedRefresh {
    replaced_token: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: i64,
}

type FlightSlot = Arc<Mutex<Option<CompletedRefresh>>>;

/// Renews access tokens against the backend, at most one call at a time per
/// session id. The last successful result per session is remembered with
/// the token it replaced so concurrent requests carrying the same stale
/// cookie reuse it instead of calling the backend again.
#[derive(Clone)]
pub struct RefreshScheduler {
    backend: Arc<dyn AuthBackend>,
    flights: Arc<DashMap<String, FlightSlot>>,
}

impl RefreshScheduler {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            flights: Arc::new(DashMap::new()),
        }
    }

    pub fn should_refresh(claims: &SessionClaims, trigger: RefreshTrigger, now: i64) -> bool {
        trigger == RefreshTrigger::Update || claims.is_expired(now)
    }

    /// Refreshes `claims`. On failure the stale token is kept and the error
    /// flag is set; on success the error flag is cleared.
    pub async fn refresh(&self, mut claims: SessionClaims, now: i64) -> SessionClaims {
        let slot = self
            .flights
            .entry(claims.sid.clone())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let mut completed = slot.lock().await;

        if let Some(done) = completed
            .as_ref()
            .filter(|done| done.replaced_token == claims.access_token)
        {
            debug!(sid = %claims.sid, "reusing refresh completed by a concurrent request");
            apply(&mut claims, done);
            return claims;
        }

        match self.backend.refresh(&claims.access_token).await {
            Ok(refreshed) => {
                let done = CompletedRefresh {
                    replaced_token: claims.access_token.clone(),
                    expires_at: expiry_or_default(&refreshed.access_token, now),
                    access_token: refreshed.access_token,
                    refresh_token: refreshed.refresh_token,
                };
                apply(&mut claims, &done);
                info!(sid = %claims.sid, expires_at = done.expires_at, "access token refreshed");
                *completed = Some(done);
            }
            Err(err) => {
                warn!(sid = %claims.sid, error = %err, "access token refresh failed");
                claims.error = Some(SessionError::RefreshAccessToken);
                claims.error_details = Some(err.to_string());
            }
        }

        claims
    }

    /// Drops the single-flight slot for a session that has signed out.
    pub fn forget(&self, sid: &str) {
        self.flights.remove(sid);
    }

    /// Removes idle slots whose remembered token has already expired.
    /// Returns the number of slots removed.
    ///
    /// A slot is idle only when the map holds the sole handle to it. A caller
    /// that has cloned the slot but not yet locked it would otherwise lose it
    /// here, and the next caller would start a second backend call.
    pub fn prune(&self, now: i64) -> usize {
        let before = self.flights.len();
        self.flights.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(completed) => completed.as_ref().is_some_and(|done| done.expires_at >= now),
                Err(_) => true, // refresh in flight
            }
        });
        before.saturating_sub(self.flights.len())
    }

    pub fn tracked_sessions(&self) -> usize {
        self.flights.len()
    }
}

fn apply(claims: &mut SessionClaims, done: &CompletedRefresh) {
    claims.access_token = done.access_token.clone();
    if done.refresh_token.is_some() {
        claims.refresh_token = done.refresh_token.clone();
    }
    claims.access_token_expires = done.expires_at;
    claims.error = None;
    claims.error_details = None;
}
