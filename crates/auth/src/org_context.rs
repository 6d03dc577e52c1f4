//! Active tenant context (organization, scope level, section).
//!
//! The context is process-wide session state persisted to durable storage.
//! Once login asserts the tenant, the context is locked and every setter is a
//! silent no-op until [`OrgContextService::clear`] runs on logout.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use guardian_core::text::normalize_code;
use guardian_core::{KeyValueStore, OrgId, SectionId};
use guardian_events::{InMemoryStateBus, StateBus, Subscription};

pub const ORG_ID_KEY: &str = "currentOrgId";
pub const SCOPE_KEY: &str = "scopeNivel";
pub const SECTION_KEY: &str = "seccionPrincipalId";
pub const LOCKED_KEY: &str = "ctxLocked";

const LOCKED_SENTINEL: &str = "1";

/// Tenancy granularity of the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeLevel {
    Organizacion,
    Seccion,
    Other(String),
}

impl ScopeLevel {
    /// Parse a backend scope string. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = normalize_code(raw);
        match code.as_str() {
            "" => None,
            "ORGANIZACION" => Some(Self::Organizacion),
            "SECCION" => Some(Self::Seccion),
            _ => Some(Self::Other(code)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Organizacion => "ORGANIZACION",
            Self::Seccion => "SECCION",
            Self::Other(s) => s,
        }
    }
}

impl core::fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the tenant context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrgContext {
    pub org_id: Option<OrgId>,
    pub scope: Option<ScopeLevel>,
    pub seccion_id: Option<SectionId>,
    pub locked: bool,
}

/// Backend-asserted tenant data delivered with a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    pub org_id: Option<String>,
    pub scope_nivel: Option<String>,
    pub seccion_principal_id: Option<String>,
}

impl LockRequest {
    /// Whether the payload carries any tenant data at all.
    pub fn asserts_tenant(&self) -> bool {
        [&self.org_id, &self.scope_nivel, &self.seccion_principal_id]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Full replacement of org/scope/section (UI-initiated org switch).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextUpdate {
    pub org_id: Option<String>,
    pub scope: Option<String>,
    pub seccion_id: Option<String>,
}

pub struct OrgContextService {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<OrgContext>,
    org_bus: InMemoryStateBus<Option<OrgId>>,
    scope_bus: InMemoryStateBus<Option<ScopeLevel>>,
    seccion_bus: InMemoryStateBus<Option<SectionId>>,
}

impl OrgContextService {
    /// Load the context persisted by a previous session (if any).
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let read = |key: &str| match store.get(key) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read org context; using empty value");
                None
            }
        };

        let ctx = OrgContext {
            org_id: read(ORG_ID_KEY).and_then(OrgId::parse),
            scope: read(SCOPE_KEY).as_deref().and_then(ScopeLevel::parse),
            seccion_id: read(SECTION_KEY).and_then(SectionId::parse),
            locked: read(LOCKED_KEY).as_deref() == Some(LOCKED_SENTINEL),
        };

        Self {
            org_bus: InMemoryStateBus::with_initial(ctx.org_id.clone()),
            scope_bus: InMemoryStateBus::with_initial(ctx.scope.clone()),
            seccion_bus: InMemoryStateBus::with_initial(ctx.seccion_id.clone()),
            state: Mutex::new(ctx),
            store,
        }
    }

    pub fn value(&self) -> Option<OrgId> {
        self.state().org_id.clone()
    }

    pub fn scope(&self) -> Option<ScopeLevel> {
        self.state().scope.clone()
    }

    pub fn seccion(&self) -> Option<SectionId> {
        self.state().seccion_id.clone()
    }

    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    pub fn snapshot(&self) -> OrgContext {
        self.state().clone()
    }

    pub fn subscribe_org(&self) -> Subscription<Option<OrgId>> {
        self.org_bus.subscribe()
    }

    pub fn subscribe_scope(&self) -> Subscription<Option<ScopeLevel>> {
        self.scope_bus.subscribe()
    }

    pub fn subscribe_seccion(&self) -> Subscription<Option<SectionId>> {
        self.seccion_bus.subscribe()
    }

    /// Adopt the backend-asserted tenant and freeze the context.
    ///
    /// No-op when already locked. Returns whether the lock was taken.
    pub fn lock(&self, request: &LockRequest) -> bool {
        let mut state = self.state();
        if state.locked {
            tracing::debug!("org context already locked; ignoring lock request");
            return false;
        }

        let org = request.org_id.as_deref().and_then(OrgId::parse);
        let scope = request.scope_nivel.as_deref().and_then(ScopeLevel::parse);
        let seccion = request
            .seccion_principal_id
            .as_deref()
            .and_then(SectionId::parse);

        self.apply_org(&mut state, org);
        self.apply_scope(&mut state, scope);
        self.apply_seccion(&mut state, seccion);

        state.locked = true;
        self.persist(LOCKED_KEY, Some(LOCKED_SENTINEL));
        tracing::info!(
            org_id = ?state.org_id,
            scope = ?state.scope,
            seccion_id = ?state.seccion_id,
            "org context locked"
        );
        true
    }

    /// Switch organization. Ignored while locked.
    pub fn set(&self, org_id: Option<&str>) -> bool {
        let mut state = self.state();
        if self.refuse_if_locked(&state, "set") {
            return false;
        }
        self.apply_org(&mut state, org_id.and_then(OrgId::parse));
        true
    }

    pub fn set_scope(&self, scope: Option<&str>) -> bool {
        let mut state = self.state();
        if self.refuse_if_locked(&state, "set_scope") {
            return false;
        }
        self.apply_scope(&mut state, scope.and_then(ScopeLevel::parse));
        true
    }

    pub fn set_seccion(&self, seccion_id: Option<&str>) -> bool {
        let mut state = self.state();
        if self.refuse_if_locked(&state, "set_seccion") {
            return false;
        }
        self.apply_seccion(&mut state, seccion_id.and_then(SectionId::parse));
        true
    }

    pub fn set_context(&self, update: &ContextUpdate) -> bool {
        let mut state = self.state();
        if self.refuse_if_locked(&state, "set_context") {
            return false;
        }
        self.apply_org(&mut state, update.org_id.as_deref().and_then(OrgId::parse));
        self.apply_scope(&mut state, update.scope.as_deref().and_then(ScopeLevel::parse));
        self.apply_seccion(
            &mut state,
            update.seccion_id.as_deref().and_then(SectionId::parse),
        );
        true
    }

    /// Resolve the organization for a screen opened with `?id=...`.
    ///
    /// Order: query id (adopted unless locked), in-memory value, persisted
    /// value. While locked the locked organization always wins.
    pub fn ensure_from_query(&self, query_id: Option<&str>) -> Option<OrgId> {
        let mut state = self.state();

        if let Some(id) = query_id.and_then(OrgId::parse) {
            if state.locked {
                if state.org_id.as_ref() != Some(&id) {
                    tracing::debug!(requested = %id, "org context locked; keeping asserted organization");
                }
                return state.org_id.clone();
            }
            self.apply_org(&mut state, Some(id.clone()));
            return Some(id);
        }

        if let Some(current) = state.org_id.clone() {
            return Some(current);
        }

        let stored = match self.store.get(ORG_ID_KEY) {
            Ok(v) => v.and_then(OrgId::parse),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted org id");
                None
            }
        };
        if let Some(id) = stored.clone() {
            state.org_id = Some(id.clone());
            self.publish_org(Some(id));
        }
        stored
    }

    /// Logout: unlock, then null out org/scope/section.
    pub fn clear(&self) {
        let mut state = self.state();
        state.locked = false;
        self.persist(LOCKED_KEY, None);
        self.apply_org(&mut state, None);
        self.apply_scope(&mut state, None);
        self.apply_seccion(&mut state, None);
        tracing::info!("org context cleared");
    }

    fn state(&self) -> MutexGuard<'_, OrgContext> {
        // Poisoning only happens if a panic escaped while holding the lock; the
        // data is plain values, so recover it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refuse_if_locked(&self, state: &OrgContext, op: &str) -> bool {
        if state.locked {
            tracing::debug!(op, "org context locked; ignoring mutation");
        }
        state.locked
    }

    fn apply_org(&self, state: &mut OrgContext, org: Option<OrgId>) {
        self.persist(ORG_ID_KEY, org.as_ref().map(OrgId::as_str));
        if state.org_id != org {
            state.org_id = org.clone();
            self.publish_org(org);
        }
    }

    fn apply_scope(&self, state: &mut OrgContext, scope: Option<ScopeLevel>) {
        self.persist(SCOPE_KEY, scope.as_ref().map(ScopeLevel::as_str));
        if state.scope != scope {
            state.scope = scope.clone();
            if let Err(err) = self.scope_bus.publish(scope) {
                tracing::warn!(error = ?err, "failed to publish scope change");
            }
        }
    }

    fn apply_seccion(&self, state: &mut OrgContext, seccion: Option<SectionId>) {
        self.persist(SECTION_KEY, seccion.as_ref().map(SectionId::as_str));
        if state.seccion_id != seccion {
            state.seccion_id = seccion.clone();
            if let Err(err) = self.seccion_bus.publish(seccion) {
                tracing::warn!(error = ?err, "failed to publish section change");
            }
        }
    }

    fn publish_org(&self, org: Option<OrgId>) {
        if let Err(err) = self.org_bus.publish(org) {
            tracing::warn!(error = ?err, "failed to publish org change");
        }
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        if let Err(err) = self.store.put_opt(key, value) {
            tracing::warn!(key, error = %err, "failed to persist org context");
        }
    }
}
