use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use guardian_core::KeyValueStore;

pub const TOKEN_KEY: &str = "authToken";
pub const ISSUED_AT_KEY: &str = "authIssuedAt";
pub const EXPIRES_AT_KEY: &str = "authExpiresAt";

/// Anything that can tell whether the current session is authenticated.
pub trait Authenticator: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Validity window of a session token, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session token stored")]
    Missing,

    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate a session window against `now`.
pub fn validate_window(window: &SessionWindow, now: DateTime<Utc>) -> Result<(), SessionError> {
    if window.expires_at <= window.issued_at {
        return Err(SessionError::InvalidTimeWindow);
    }
    if now < window.issued_at {
        return Err(SessionError::NotYetValid);
    }
    if now >= window.expires_at {
        return Err(SessionError::Expired);
    }
    Ok(())
}

/// Persisted authentication state.
///
/// Token issuance is the backend's business; this only remembers what login
/// handed over and answers "is somebody signed in".
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Record a freshly issued token.
    pub fn begin(&self, token: &str, window: Option<SessionWindow>) {
        let token = token.trim();
        if token.is_empty() {
            tracing::warn!("ignoring login without a session token");
            return;
        }

        self.write(TOKEN_KEY, Some(token));
        let issued = window.map(|w| w.issued_at.to_rfc3339());
        let expires = window.map(|w| w.expires_at.to_rfc3339());
        self.write(ISSUED_AT_KEY, issued.as_deref());
        self.write(EXPIRES_AT_KEY, expires.as_deref());
        tracing::info!("session started");
    }

    /// Forget the session. Idempotent.
    pub fn end(&self) {
        self.write(TOKEN_KEY, None);
        self.write(ISSUED_AT_KEY, None);
        self.write(EXPIRES_AT_KEY, None);
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Stored window, if both timestamps are present and parse.
    pub fn window(&self) -> Option<SessionWindow> {
        let issued_at = parse_timestamp(&self.read(ISSUED_AT_KEY)?)?;
        let expires_at = parse_timestamp(&self.read(EXPIRES_AT_KEY)?)?;
        Some(SessionWindow {
            issued_at,
            expires_at,
        })
    }

    /// Check the session at `now`. A token without a window never expires.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.token().ok_or(SessionError::Missing)?;

        let has_timestamps =
            self.read(ISSUED_AT_KEY).is_some() || self.read(EXPIRES_AT_KEY).is_some();
        match self.window() {
            Some(window) => validate_window(&window, now),
            None if has_timestamps => {
                tracing::warn!("stored session window is unreadable; treating session as expired");
                Err(SessionError::Expired)
            }
            None => Ok(()),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read session state");
                None
            }
        }
    }

    fn write(&self, key: &str, value: Option<&str>) {
        if let Err(err) = self.store.put_opt(key, value) {
            tracing::warn!(key, error = %err, "failed to persist session state");
        }
    }
}

impl Authenticator for SessionService {
    fn is_authenticated(&self) -> bool {
        self.check(Utc::now()).is_ok()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
