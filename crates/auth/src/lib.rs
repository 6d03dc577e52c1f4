//! `guardian-auth`: session state, tenant context and route guards.
//!
//! This crate knows nothing about menus. Guards reach the navigation index
//! through the [`RouteAccess`] seam, implemented by the menu service.

pub mod guards;
pub mod org_context;
pub mod permissions;
pub mod routes;
pub mod session;

pub use guards::{
    AuthGuard, GuardDecision, MenuAccessGuard, OrgRequiredGuard, PermissionGuard, RouteAccess,
    RouteGuard,
};
pub use org_context::{ContextUpdate, LockRequest, OrgContext, OrgContextService, ScopeLevel};
pub use permissions::PermissionCode;
pub use session::{Authenticator, SessionError, SessionService, SessionWindow, validate_window};
