//! Process-wide wiring of the navigation services.

use std::sync::Arc;
use std::thread::JoinHandle;

use guardian_auth::{
    AuthGuard, Authenticator, MenuAccessGuard, OrgContextService, OrgRequiredGuard,
    PermissionGuard, RouteAccess, SessionService,
};
use guardian_core::KeyValueStore;
use guardian_observability::{Notifier, TracingNotifier};

use crate::config::MenuConfig;
use crate::login::{self, LoginError, LoginResponse};
use crate::service::MenuService;

/// The shared services every screen and guard talks to.
///
/// Cheap to clone; all members are reference counted.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionService>,
    org: Arc<OrgContextService>,
    menu: Arc<MenuService>,
    follower: Arc<JoinHandle<()>>,
}

impl AppContext {
    /// Wire services over `store` and restore whatever a previous run left.
    ///
    /// The menu follows the org context from here on: every switch of the
    /// active organization rebuilds the published tree.
    pub fn new(store: Arc<dyn KeyValueStore>, config: MenuConfig, notifier: Arc<dyn Notifier>) -> Self {
        let session = Arc::new(SessionService::new(store.clone()));
        let org = Arc::new(OrgContextService::new(store.clone()));
        let menu = Arc::new(MenuService::new(config, store.clone(), org.clone(), notifier));
        menu.restore();
        let follower = Arc::new(menu.follow_org_context());

        Self {
            store,
            session,
            org,
            menu,
            follower,
        }
    }

    /// Default process wiring: JSON tracing, flags from the environment, and
    /// notices written to the log.
    pub fn from_env(store: Arc<dyn KeyValueStore>) -> Self {
        guardian_observability::init();
        Self::new(store, MenuConfig::from_env(), Arc::new(TracingNotifier))
    }

    /// Whether the background org follower is still running.
    pub fn is_following_org(&self) -> bool {
        !self.follower.is_finished()
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn session(&self) -> &Arc<SessionService> {
        &self.session
    }

    pub fn org(&self) -> &Arc<OrgContextService> {
        &self.org
    }

    pub fn menu(&self) -> &Arc<MenuService> {
        &self.menu
    }

    pub fn login(&self, response: &LoginResponse) -> Result<(), LoginError> {
        login::apply_login(response, &self.session, &self.org, &self.menu)
    }

    pub fn logout(&self) {
        login::logout(&self.session, &self.org, &self.menu);
    }

    fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.session.clone()
    }

    fn access(&self) -> Arc<dyn RouteAccess> {
        self.menu.clone()
    }

    pub fn auth_guard(&self) -> AuthGuard {
        AuthGuard::new(self.authenticator())
    }

    pub fn org_required_guard(&self) -> OrgRequiredGuard {
        OrgRequiredGuard::new(self.authenticator(), self.org.clone())
    }

    pub fn permission_guard(&self) -> PermissionGuard {
        PermissionGuard::new(self.authenticator(), self.access())
    }

    pub fn menu_access_guard(&self) -> MenuAccessGuard {
        MenuAccessGuard::new(self.authenticator(), self.access())
    }
}
