//! Login and logout orchestration across session, org context and menu.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use guardian_auth::{LockRequest, OrgContextService, SessionService, SessionWindow, validate_window};

use crate::raw::{RawOption, parse_options};
use crate::service::MenuService;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("login response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("login response carries no session token")]
    MissingToken,

    #[error("login response has an invalid session window: {0}")]
    InvalidWindow(guardian_auth::SessionError),
}

/// Authentication payload returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub opciones_detalle: Value,
    #[serde(default, deserialize_with = "id_string")]
    pub organizacion_id: Option<String>,
    #[serde(default)]
    pub scope_nivel: Option<String>,
    #[serde(default, deserialize_with = "id_string")]
    pub seccion_principal_id: Option<String>,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Ids arrive as strings or numbers depending on the endpoint.
fn id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl LoginResponse {
    pub fn from_json(json: &str) -> Result<Self, LoginError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decoded option list; `None` when the payload had no list at all.
    pub fn options(&self) -> Option<Vec<RawOption>> {
        if self.opciones_detalle.is_null() {
            return None;
        }
        Some(parse_options(&self.opciones_detalle))
    }

    pub fn lock_request(&self) -> LockRequest {
        LockRequest {
            org_id: self.organizacion_id.clone(),
            scope_nivel: self.scope_nivel.clone(),
            seccion_principal_id: self.seccion_principal_id.clone(),
        }
    }

    /// Session window, when the backend reported an expiry.
    ///
    /// A missing `issuedAt` is taken as `now`.
    pub fn window(&self, now: DateTime<Utc>) -> Option<SessionWindow> {
        self.expires_at.map(|expires_at| SessionWindow {
            issued_at: self.issued_at.unwrap_or(now),
            expires_at,
        })
    }
}

/// Start a session from a successful login.
///
/// Order: session, then tenant lock (when asserted), then the menu, so the
/// first tree is already built for the asserted organization.
pub fn apply_login(
    response: &LoginResponse,
    session: &SessionService,
    org: &OrgContextService,
    menu: &MenuService,
) -> Result<(), LoginError> {
    if response.token.trim().is_empty() {
        return Err(LoginError::MissingToken);
    }

    let now = Utc::now();
    let window = response.window(now);
    if let Some(window) = &window {
        validate_window(window, now).map_err(LoginError::InvalidWindow)?;
    }

    session.begin(&response.token, window);

    let lock = response.lock_request();
    if lock.asserts_tenant() {
        org.lock(&lock);
    }

    let snapshot = menu.set_from_login(response.options());
    tracing::info!(
        org_id = ?snapshot.org_id,
        items = snapshot.tree.items.len(),
        "login applied"
    );
    Ok(())
}

/// End the session and drop all tenant and navigation state.
pub fn logout(session: &SessionService, org: &OrgContextService, menu: &MenuService) {
    session.end();
    org.clear();
    menu.clear();
    tracing::info!("logged out");
}
