//! Canonical front-end routes for known screens.
//!
//! The backend names screens consistently but its routes drift, so item names
//! (and sometimes parent names) decide the route the front end actually owns.
//! Matching is substring-based over normalized keys; the first rule wins.

use guardian_auth::routes;
use guardian_core::text::{has_query, strip_query};

/// One name-pattern → route mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRule {
    /// Every fragment must appear in the item name.
    pub name_all: &'static [&'static str],
    /// At least one fragment must appear in the item name (ignored if empty).
    pub name_any: &'static [&'static str],
    /// At least one fragment must appear in the parent name (ignored if empty).
    pub parent_any: &'static [&'static str],
    pub route: &'static str,
    /// Screen reads the organization from `?id=`.
    pub needs_org_id: bool,
}

impl CanonicalRule {
    const fn name(all: &'static [&'static str], route: &'static str, needs_org_id: bool) -> Self {
        Self {
            name_all: all,
            name_any: &[],
            parent_any: &[],
            route,
            needs_org_id,
        }
    }

    const fn name_any(
        all: &'static [&'static str],
        any: &'static [&'static str],
        route: &'static str,
        needs_org_id: bool,
    ) -> Self {
        Self {
            name_all: all,
            name_any: any,
            parent_any: &[],
            route,
            needs_org_id,
        }
    }

    const fn under(
        all: &'static [&'static str],
        parent_any: &'static [&'static str],
        route: &'static str,
        needs_org_id: bool,
    ) -> Self {
        Self {
            name_all: all,
            name_any: &[],
            parent_any,
            route,
            needs_org_id,
        }
    }

    pub fn matches(&self, name: &str, parent: &str) -> bool {
        self.name_all.iter().all(|f| name.contains(f))
            && (self.name_any.is_empty() || self.name_any.iter().any(|f| name.contains(f)))
            && (self.parent_any.is_empty() || self.parent_any.iter().any(|f| parent.contains(f)))
    }
}

/// Ordered rule table. More specific screens come before generic ones.
pub const RULES: &[CanonicalRule] = &[
    CanonicalRule::name(&["crear", "estrategia"], "/crear-estrategia", true),
    CanonicalRule::name(&["cambiar", "estrategia"], "/cambiar-estrategia", true),
    CanonicalRule::name_any(
        &["parametro"],
        &["configurar", "configuracion"],
        "/configurar-parametros",
        true,
    ),
    CanonicalRule::name(&["auditoria"], "/ver-auditoria", true),
    CanonicalRule::name(&["crear", "opcion", "menu"], routes::MENU_OPTION_CREATE, false),
    CanonicalRule::name(&["editar", "opcion", "menu"], routes::MENU_OPTION_EDIT, false),
    CanonicalRule::name_any(
        &["opcion", "menu"],
        &["listar", "gestionar"],
        routes::MENU_OPTION_LIST,
        false,
    ),
    CanonicalRule::name(&["asignar", "admin", "seccion"], "/asignar-admin-seccion", true),
    CanonicalRule::name(&["crear", "seccion"], "/crear-seccion", true),
    CanonicalRule::name(&["listar", "seccion"], routes::SECTION_LISTING, true),
    CanonicalRule::name(&["asignar", "vehiculo"], "/asignar-vehiculo", true),
    CanonicalRule::name_any(&["vehiculo"], &["crear", "registrar"], "/crear-vehiculo", true),
    CanonicalRule::name(&["editar", "vehiculo"], "/editar-vehiculo", true),
    CanonicalRule::name(&["listar", "vehiculo"], "/listar-vehiculos", true),
    CanonicalRule::name(&["crear", "rol"], "/crear-rol", true),
    CanonicalRule::name(&["gestionar", "rol"], "/gestionar-roles", true),
    CanonicalRule::name(&["listar", "rol"], "/listar-roles", true),
    CanonicalRule::name(&["crear", "organizacion"], "/crear-organizacion", false),
    CanonicalRule::name(&["listar", "organizacion"], routes::ORG_LISTING, false),
    CanonicalRule::name(&["gestionar", "organizacion"], "/gestionar-organizacion", true),
    // Generic verbs resolved by the parent menu.
    CanonicalRule::under(&["crear"], &["seccion"], "/crear-seccion", true),
    CanonicalRule::under(&["listar"], &["seccion"], routes::SECTION_LISTING, true),
    CanonicalRule::under(&["crear"], &["vehiculo"], "/crear-vehiculo", true),
    CanonicalRule::under(&["listar"], &["vehiculo"], "/listar-vehiculos", true),
    CanonicalRule::under(&["crear"], &["roles"], "/crear-rol", true),
    CanonicalRule::under(&["listar"], &["roles"], "/listar-roles", true),
];

/// First rule matching the normalized item name and parent name.
pub fn match_rule(name: &str, parent: &str) -> Option<&'static CanonicalRule> {
    RULES.iter().find(|rule| rule.matches(name, parent))
}

/// Route for an item after canonicalization.
///
/// Unknown screens keep their sanitized path. Org-scoped canonical routes get
/// `?id=<org>` when an organization is active.
pub fn canonicalize(
    name: &str,
    parent: &str,
    sanitized: Option<String>,
    org_id: Option<&str>,
) -> Option<String> {
    match match_rule(name, parent) {
        Some(rule) => {
            let route = if rule.needs_org_id {
                with_org_id(rule.route, org_id)
            } else {
                rule.route.to_string()
            };
            if sanitized.as_deref() != Some(route.as_str()) {
                tracing::trace!(name, from = ?sanitized, to = %route, "canonicalized item route");
            }
            Some(route)
        }
        None => sanitized,
    }
}

/// Append `?id=<org>` unless the route already carries a query string.
pub fn with_org_id(route: &str, org_id: Option<&str>) -> String {
    match org_id.filter(|id| !id.trim().is_empty()) {
        Some(id) if !has_query(route) => format!("{route}?id={}", id.trim()),
        _ => route.to_string(),
    }
}

/// Whether the (query-stripped) path is a front-end-owned canonical route.
pub fn is_canonical_route(path: &str) -> bool {
    let path = strip_query(path);
    RULES.iter().any(|rule| rule.route == path)
}
