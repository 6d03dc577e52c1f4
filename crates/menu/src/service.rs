//! Stateful owner of the granted options and the published navigation.
//!
//! Every mutation runs the same pipeline on the calling thread: filter,
//! persist, rebuild, publish, audit. Readers (guards, sidebars) only ever see
//! whole [`MenuSnapshot`]s swapped in behind an `RwLock`.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;

use guardian_auth::{OrgContextService, RouteAccess};
use guardian_core::{KeyValueStore, OrgId};
use guardian_events::{InMemoryStateBus, StateBus, Subscription};
use guardian_observability::Notifier;

use crate::audit::{self, AuditReport};
use crate::config::MenuConfig;
use crate::filter;
use crate::node::MenuNode;
use crate::raw::{self, RawOption};
use crate::tree::{MenuTree, build_tree};

/// Storage key of the filtered option list.
pub const RAW_OPTIONS_KEY: &str = "opcionesDetalleRaw";

const ORG_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One published state: the tree and the organization it was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuSnapshot {
    pub tree: MenuTree,
    pub org_id: Option<OrgId>,
}

pub struct MenuService {
    config: MenuConfig,
    store: Arc<dyn KeyValueStore>,
    org: Arc<OrgContextService>,
    notifier: Arc<dyn Notifier>,
    /// Filtered options; the lock also serializes rebuilds.
    raw: Mutex<Vec<RawOption>>,
    snapshot: RwLock<Arc<MenuSnapshot>>,
    tree_bus: InMemoryStateBus<Vec<MenuNode>>,
    items_bus: InMemoryStateBus<Vec<MenuNode>>,
    last_audit: Mutex<Option<AuditReport>>,
}

impl MenuService {
    pub fn new(
        config: MenuConfig,
        store: Arc<dyn KeyValueStore>,
        org: Arc<OrgContextService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            store,
            org,
            notifier,
            raw: Mutex::new(Vec::new()),
            snapshot: RwLock::new(Arc::new(MenuSnapshot::default())),
            tree_bus: InMemoryStateBus::with_initial(Vec::new()),
            items_bus: InMemoryStateBus::with_initial(Vec::new()),
            last_audit: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Replace the granted options with the list delivered at login.
    ///
    /// `None` (no `opcionesDetalle` in the payload) behaves like an empty list.
    pub fn set_from_login(&self, options: Option<Vec<RawOption>>) -> Arc<MenuSnapshot> {
        let received = options.as_ref().map_or(0, Vec::len);
        let filtered = filter::apply(raw::sanitize(options.unwrap_or_default()), &self.config);
        tracing::info!(received, retained = filtered.len(), "menu options received");

        let mut raw = self.raw_options_guard();
        *raw = filtered;
        self.persist(&raw);
        self.rebuild_with(&raw)
    }

    /// Reload the list persisted by a previous run.
    ///
    /// Unreadable JSON is discarded together with its storage entry. Returns
    /// the number of options restored.
    pub fn restore(&self) -> usize {
        let stored = match self.store.get(RAW_OPTIONS_KEY) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted menu options");
                None
            }
        };

        let options = match stored.as_deref().map(|json| serde_json::from_str::<serde_json::Value>(json)) {
            None => Vec::new(),
            Some(Ok(value)) => raw::parse_options(&value),
            Some(Err(err)) => {
                tracing::warn!(error = %err, "persisted menu options are corrupted; discarding");
                if let Err(err) = self.store.remove(RAW_OPTIONS_KEY) {
                    tracing::warn!(error = %err, "failed to remove corrupted menu options");
                }
                Vec::new()
            }
        };

        let filtered = filter::apply(options, &self.config);
        let restored = filtered.len();
        let mut raw = self.raw_options_guard();
        *raw = filtered;
        self.rebuild_with(&raw);
        tracing::debug!(restored, "menu options restored");
        restored
    }

    /// Forget everything (logout). Idempotent.
    pub fn clear(&self) {
        let mut raw = self.raw_options_guard();
        raw.clear();
        if let Err(err) = self.store.remove(RAW_OPTIONS_KEY) {
            tracing::warn!(error = %err, "failed to remove persisted menu options");
        }
        self.publish(Arc::new(MenuSnapshot::default()));
        *self.last_audit_guard() = None;
        tracing::info!("menu cleared");
    }

    /// Rebuild from the current options and the active organization.
    pub fn rebuild(&self) -> Arc<MenuSnapshot> {
        let raw = self.raw_options_guard();
        self.rebuild_with(&raw)
    }

    /// Rebuild only if the active organization moved since the last build.
    pub fn refresh_for_org(&self) -> bool {
        let current = self.org.value();
        if self.snapshot().org_id == current {
            return false;
        }
        tracing::debug!(org_id = ?current, "active organization changed; rebuilding menu");
        self.rebuild();
        true
    }

    /// Keep the menu in step with the org context from a background thread.
    ///
    /// The thread holds only a weak reference and exits once the service is
    /// dropped or the org context goes away.
    pub fn follow_org_context(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let updates = self.org.subscribe_org();

        std::thread::spawn(move || {
            loop {
                match updates.recv_timeout(ORG_POLL_INTERVAL) {
                    Ok(_) => {
                        // Coalesce bursts of org switches into one rebuild.
                        let _ = updates.latest();
                        match weak.upgrade() {
                            Some(service) => {
                                service.refresh_for_org();
                            }
                            None => break,
                        }
                    }
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                        if weak.strong_count() == 0 {
                            break;
                        }
                    }
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!("org context follower stopped");
        })
    }

    pub fn can_access_path(&self, path: &str) -> bool {
        self.snapshot().tree.index.can_access_path(path)
    }

    pub fn can_access_code(&self, code: &str) -> bool {
        self.snapshot().tree.index.can_access_code(code)
    }

    pub fn find_by_path(&self, path: &str) -> Option<MenuNode> {
        self.snapshot().tree.find_by_path(path).cloned()
    }

    pub fn tree(&self) -> Vec<MenuNode> {
        self.snapshot().tree.roots.clone()
    }

    pub fn items(&self) -> Vec<MenuNode> {
        self.snapshot().tree.items.clone()
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> Arc<MenuSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Options retained after filtering, as persisted.
    pub fn raw_options(&self) -> Vec<RawOption> {
        self.raw_options_guard().clone()
    }

    pub fn last_audit(&self) -> Option<AuditReport> {
        self.last_audit_guard().clone()
    }

    pub fn subscribe_tree(&self) -> Subscription<Vec<MenuNode>> {
        self.tree_bus.subscribe()
    }

    pub fn subscribe_items(&self) -> Subscription<Vec<MenuNode>> {
        self.items_bus.subscribe()
    }

    fn rebuild_with(&self, raw: &[RawOption]) -> Arc<MenuSnapshot> {
        let org_id = self.org.value();
        let tree = build_tree(raw, &self.config, org_id.as_ref().map(OrgId::as_str));
        let snapshot = Arc::new(MenuSnapshot { tree, org_id });
        self.publish(Arc::clone(&snapshot));

        let report = audit::audit(raw, &snapshot.tree);
        audit::report(&report, self.notifier.as_ref());
        *self.last_audit_guard() = Some(report);

        snapshot
    }

    fn publish(&self, snapshot: Arc<MenuSnapshot>) {
        let roots = snapshot.tree.roots.clone();
        let items = snapshot.tree.items.clone();
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        if let Err(err) = self.tree_bus.publish(roots) {
            tracing::warn!(error = ?err, "failed to publish menu tree");
        }
        if let Err(err) = self.items_bus.publish(items) {
            tracing::warn!(error = ?err, "failed to publish menu items");
        }
    }

    fn persist(&self, options: &[RawOption]) {
        let result = serde_json::to_string(options)
            .map_err(guardian_core::StorageError::from)
            .and_then(|json| self.store.set(RAW_OPTIONS_KEY, &json));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist menu options");
        }
    }

    fn raw_options_guard(&self) -> MutexGuard<'_, Vec<RawOption>> {
        self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn last_audit_guard(&self) -> MutexGuard<'_, Option<AuditReport>> {
        self.last_audit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RouteAccess for MenuService {
    fn can_access_path(&self, path: &str) -> bool {
        MenuService::can_access_path(self, path)
    }

    fn can_access_code(&self, code: &str) -> bool {
        MenuService::can_access_code(self, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::InMemoryStore;
    use guardian_observability::RecordingNotifier;

    struct Fixture {
        store: Arc<InMemoryStore>,
        org: Arc<OrgContextService>,
        notices: Arc<RecordingNotifier>,
        menu: Arc<MenuService>,
    }

    fn fixture(config: MenuConfig) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let org = Arc::new(OrgContextService::new(store.clone()));
        let notices = Arc::new(RecordingNotifier::new());
        let menu = Arc::new(MenuService::new(
            config,
            store.clone(),
            org.clone(),
            notices.clone(),
        ));
        Fixture {
            store,
            org,
            notices,
            menu,
        }
    }

    fn options() -> Vec<RawOption> {
        vec![
            RawOption::menu("Gestión de Roles").with_icon("badge"),
            RawOption::item("Crear Rol", Some("Gestión de Roles"), Some("/roles/nuevo"))
                .with_code("CREAR_ROL"),
            RawOption::item("Estrategias", Some("Gobernanza"), Some("/estrategias")),
            RawOption::item("", Some("Gestión de Roles"), Some("/vacio")),
        ]
    }

    #[test]
    fn set_from_login_filters_persists_and_publishes() {
        let fx = fixture(MenuConfig::default());
        let tree = fx.menu.subscribe_tree();
        assert_eq!(tree.try_recv().ok(), Some(Vec::new()));

        fx.menu.set_from_login(Some(options()));

        assert_eq!(fx.menu.raw_options().len(), 2);
        assert!(fx.store.entries().contains_key(RAW_OPTIONS_KEY));
        assert!(fx.menu.can_access_path("/crear-rol"));
        assert!(fx.menu.can_access_code("crear rol"));
        assert!(!fx.menu.can_access_path("/estrategias"));

        let published = tree.latest().unwrap_or_default();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].key, "gestion-de-roles");
    }

    #[test]
    fn audit_runs_after_rebuild() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(Some(options()));

        let report = fx.menu.last_audit().unwrap();
        assert_eq!(report.missing_in_ui, vec!["/roles/nuevo".to_string()]);
        assert!(report.extra_in_ui.is_empty());
        assert_eq!(fx.notices.len(), 1);
    }

    #[test]
    fn restore_reloads_persisted_options() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(Some(options()));

        let menu = MenuService::new(
            MenuConfig::default(),
            fx.store.clone(),
            fx.org.clone(),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(!menu.can_access_path("/crear-rol"));
        assert_eq!(menu.restore(), 2);
        assert!(menu.can_access_path("/crear-rol"));
    }

    #[test]
    fn corrupted_persisted_options_are_dropped() {
        let fx = fixture(MenuConfig::default());
        fx.store.set(RAW_OPTIONS_KEY, "{not json").unwrap();

        assert_eq!(fx.menu.restore(), 0);
        assert!(!fx.store.entries().contains_key(RAW_OPTIONS_KEY));
        assert!(fx.menu.tree().is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(Some(options()));

        fx.menu.clear();
        fx.menu.clear();
        assert!(fx.menu.items().is_empty());
        assert!(fx.menu.last_audit().is_none());
        assert!(!fx.store.entries().contains_key(RAW_OPTIONS_KEY));
    }

    #[test]
    fn org_change_rebuilds_query_suffix() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(Some(options()));
        assert_eq!(
            fx.menu.find_by_path("/crear-rol").and_then(|n| n.path),
            Some("/crear-rol".to_string())
        );
        assert!(!fx.menu.refresh_for_org());

        fx.org.set(Some("12"));
        assert!(fx.menu.refresh_for_org());
        assert_eq!(
            fx.menu.find_by_path("/crear-rol").and_then(|n| n.path),
            Some("/crear-rol?id=12".to_string())
        );
        assert!(!fx.menu.refresh_for_org());
    }

    #[test]
    fn follower_rebuilds_on_org_switch() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(Some(options()));
        let items = fx.menu.subscribe_items();
        let _follower = fx.menu.follow_org_context();

        fx.org.set(Some("44"));

        let mut rebuilt = false;
        for _ in 0..50 {
            if let Ok(items) = items.recv_timeout(Duration::from_millis(100)) {
                if items.iter().any(|n| n.path.as_deref() == Some("/crear-rol?id=44")) {
                    rebuilt = true;
                    break;
                }
            }
        }
        assert!(rebuilt);
    }

    #[test]
    fn missing_option_list_yields_empty_menu() {
        let fx = fixture(MenuConfig::default());
        fx.menu.set_from_login(None);
        assert!(fx.menu.tree().is_empty());
        assert!(fx.menu.last_audit().is_some_and(|r| r.is_clean()));
    }
}
