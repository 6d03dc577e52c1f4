//! Route activation guards.
//!
//! Guards never throw: a denied navigation is a [`GuardDecision::Redirect`] to
//! a safer route. They read the last published access index, so a concurrent
//! menu rebuild is observed either entirely or not at all.

use std::sync::Arc;

use guardian_core::text::{parent_path, strip_query};

use crate::org_context::{OrgContextService, ScopeLevel};
use crate::routes;
use crate::session::Authenticator;

/// Read side of the navigation access index.
pub trait RouteAccess: Send + Sync {
    fn can_access_path(&self, path: &str) -> bool;

    fn can_access_code(&self, code: &str) -> bool;
}

impl<T> RouteAccess for Arc<T>
where
    T: RouteAccess + ?Sized,
{
    fn can_access_path(&self, path: &str) -> bool {
        (**self).can_access_path(path)
    }

    fn can_access_code(&self, code: &str) -> bool {
        (**self).can_access_code(code)
    }
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

impl GuardDecision {
    pub fn redirect(route: impl Into<String>) -> Self {
        Self::Redirect(route.into())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target, if the navigation was denied.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(route) => Some(route),
        }
    }

    /// Chain another check that only runs when this one allowed.
    pub fn and_then(self, next: impl FnOnce() -> GuardDecision) -> GuardDecision {
        match self {
            Self::Allow => next(),
            denied => denied,
        }
    }
}

pub trait RouteGuard {
    fn can_activate(&self, url: &str) -> GuardDecision;
}

/// Signed-in check; everything else builds on it.
pub struct AuthGuard {
    auth: Arc<dyn Authenticator>,
}

impl AuthGuard {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth }
    }
}

impl RouteGuard for AuthGuard {
    fn can_activate(&self, url: &str) -> GuardDecision {
        if self.auth.is_authenticated() {
            GuardDecision::Allow
        } else {
            tracing::debug!(url, "unauthenticated navigation; redirecting to login");
            GuardDecision::redirect(routes::LOGIN)
        }
    }
}

/// Requires an active organization (and section, for section-scoped sessions).
pub struct OrgRequiredGuard {
    auth: AuthGuard,
    org: Arc<OrgContextService>,
}

impl OrgRequiredGuard {
    pub fn new(auth: Arc<dyn Authenticator>, org: Arc<OrgContextService>) -> Self {
        Self {
            auth: AuthGuard::new(auth),
            org,
        }
    }
}

impl RouteGuard for OrgRequiredGuard {
    fn can_activate(&self, url: &str) -> GuardDecision {
        self.auth.can_activate(url).and_then(|| {
            let path = strip_query(url);
            if routes::CONTEXT_FREE.contains(&path) {
                return GuardDecision::Allow;
            }

            let ctx = self.org.snapshot();
            let Some(scope) = ctx.org_id.as_ref().and(ctx.scope.as_ref()) else {
                tracing::debug!(url, "no active organization; redirecting to org listing");
                return GuardDecision::redirect(routes::ORG_LISTING);
            };

            if *scope == ScopeLevel::Seccion
                && ctx.seccion_id.is_none()
                && path != routes::SECTION_LISTING
            {
                tracing::debug!(url, "section scope without a section; redirecting to section listing");
                return GuardDecision::redirect(routes::SECTION_LISTING);
            }

            GuardDecision::Allow
        })
    }
}

/// Allows only routes present in the access index; falls back to the dashboard.
pub struct PermissionGuard {
    auth: AuthGuard,
    access: Arc<dyn RouteAccess>,
}

impl PermissionGuard {
    pub fn new(auth: Arc<dyn Authenticator>, access: Arc<dyn RouteAccess>) -> Self {
        Self {
            auth: AuthGuard::new(auth),
            access,
        }
    }
}

impl RouteGuard for PermissionGuard {
    fn can_activate(&self, url: &str) -> GuardDecision {
        self.auth.can_activate(url).and_then(|| {
            if self.access.can_access_path(url) {
                GuardDecision::Allow
            } else {
                tracing::warn!(url, "route not granted; redirecting to dashboard");
                GuardDecision::redirect(routes::DASHBOARD)
            }
        })
    }
}

/// Like [`PermissionGuard`] but accepts a granted parent path (for
/// placeholder/catch-all children) and denies to the not-authorized page.
///
/// No route in the application table uses this guard today; its redirect
/// target intentionally differs from `PermissionGuard`'s.
pub struct MenuAccessGuard {
    auth: AuthGuard,
    access: Arc<dyn RouteAccess>,
}

impl MenuAccessGuard {
    pub fn new(auth: Arc<dyn Authenticator>, access: Arc<dyn RouteAccess>) -> Self {
        Self {
            auth: AuthGuard::new(auth),
            access,
        }
    }
}

impl RouteGuard for MenuAccessGuard {
    fn can_activate(&self, url: &str) -> GuardDecision {
        self.auth.can_activate(url).and_then(|| {
            if self.access.can_access_path(url) {
                return GuardDecision::Allow;
            }
            let parent = parent_path(url);
            if parent != "/" && self.access.can_access_path(&parent) {
                return GuardDecision::Allow;
            }
            tracing::warn!(url, "menu route not granted; redirecting to not-authorized");
            GuardDecision::redirect(routes::NOT_AUTHORIZED)
        })
    }
}
