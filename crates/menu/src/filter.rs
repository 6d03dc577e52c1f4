//! Ingestion filters applied before the tree is built.

use guardian_core::text::normalize_key;

use crate::config::MenuConfig;
use crate::raw::RawOption;

/// Normalized name of the organization-management menu.
pub const ORG_MANAGEMENT_MENU: &str = "gestion-de-organizacion";

/// Items hidden together with the organization-management menu.
pub const ORG_MANAGEMENT_ITEMS: &[&str] = &[
    "crear-organizacion",
    "listar-organizaciones",
    "gestionar-organizacion",
    "editar-organizacion",
];

/// Menus/items that are never shown, by normalized name.
pub const BLOCKED_NAMES: &[&str] = &[
    "gestion-de-estrategias-de-gobernanza",
    "estrategias-de-gobernanza",
    "parametros-locales",
    "configuracion-de-parametros-locales",
];

/// Substrings that block a menu/item wherever they appear in its name or parent.
pub const BLOCKED_FRAGMENTS: &[&str] = &[
    "estrategia",
    "gobernanza",
    "parametros-locales",
    "parametro-local",
];

/// Apply both ingestion filters in order.
pub fn apply(options: Vec<RawOption>, config: &MenuConfig) -> Vec<RawOption> {
    let before = options.len();
    let options = if config.hide_org_management {
        hide_org_management(options)
    } else {
        options
    };
    let options = drop_blocked(options);

    let removed = before - options.len();
    if removed > 0 {
        tracing::debug!(removed, "filtered menu options");
    }
    options
}

/// Remove the organization-management menu and the items that belong to it.
pub fn hide_org_management(options: Vec<RawOption>) -> Vec<RawOption> {
    options
        .into_iter()
        .filter(|option| {
            let name = normalize_key(&option.nombre);
            if option.is_menu() {
                return name != ORG_MANAGEMENT_MENU;
            }
            let parent = option.parent().map(normalize_key).unwrap_or_default();
            parent != ORG_MANAGEMENT_MENU && !ORG_MANAGEMENT_ITEMS.contains(&name.as_str())
        })
        .collect()
}

/// Remove governance-strategy and local-parameter menus and items.
pub fn drop_blocked(options: Vec<RawOption>) -> Vec<RawOption> {
    options
        .into_iter()
        .filter(|option| {
            let name = normalize_key(&option.nombre);
            let parent = option.parent().map(normalize_key);
            !is_blocked(&name) && !parent.as_deref().is_some_and(is_blocked)
        })
        .collect()
}

fn is_blocked(key: &str) -> bool {
    BLOCKED_NAMES.contains(&key) || BLOCKED_FRAGMENTS.iter().any(|f| key.contains(f))
}
