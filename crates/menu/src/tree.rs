//! Pure navigation tree construction.
//!
//! Items reference their menu by *name*, and backend names drift (accents,
//! typos, stray punctuation). Parents are therefore resolved by normalized
//! key, exactly when possible and by nearest edit distance otherwise; parents
//! that resolve to nothing become synthesized menus.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use guardian_core::text::{compare_labels, levenshtein, normalize_key, sanitize_path};

use crate::canonical;
use crate::config::MenuConfig;
use crate::index::AccessIndex;
use crate::node::{MenuNode, NodeKind, flatten_items};
use crate::raw::RawOption;

/// Maximum edit distance at which two menu keys are considered the same menu.
///
/// Used both for parent resolution and for dropping empty near-duplicate menus.
pub const MENU_FUZZY_THRESHOLD: usize = 2;

/// Icon for menus synthesized from a parent name.
pub const FOLDER_ICON: &str = "folder";

/// Result of one rebuild: the tree, its items flattened, and the access index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MenuTree {
    pub roots: Vec<MenuNode>,
    pub items: Vec<MenuNode>,
    pub index: AccessIndex,
}

impl MenuTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First leaf whose query-stripped path equals the query-stripped input.
    pub fn find_by_path(&self, path: &str) -> Option<&MenuNode> {
        let wanted = guardian_core::text::strip_query(path);
        self.items.iter().find(|item| {
            item.is_leaf()
                && item
                    .path
                    .as_deref()
                    .is_some_and(|p| guardian_core::text::strip_query(p) == wanted)
        })
    }
}

/// Insertion-ordered menu map.
#[derive(Default)]
struct Menus {
    nodes: Vec<MenuNode>,
    by_key: HashMap<String, usize>,
}

impl Menus {
    fn get(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    fn insert(&mut self, node: MenuNode) -> usize {
        if let Some(idx) = self.get(&node.key) {
            return idx;
        }
        let idx = self.nodes.len();
        self.by_key.insert(node.key.clone(), idx);
        self.nodes.push(node);
        idx
    }

    fn fuzzy(&self, key: &str) -> Option<usize> {
        fuzzy_lookup(key, self.nodes.iter().map(|n| n.key.as_str())).and_then(|k| self.get(k))
    }
}

/// Exact key if present, else the nearest candidate within
/// [`MENU_FUZZY_THRESHOLD`]. Ties keep the first candidate seen.
pub fn fuzzy_lookup<'a>(target: &str, candidates: impl Iterator<Item = &'a str> + Clone) -> Option<&'a str> {
    if target.is_empty() {
        return None;
    }
    if let Some(exact) = candidates.clone().find(|c| *c == target) {
        return Some(exact);
    }

    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein(target, candidate);
        if distance <= MENU_FUZZY_THRESHOLD && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

fn explicit_menu(key: String, option: &RawOption) -> MenuNode {
    MenuNode {
        key,
        label: option.nombre.trim().to_string(),
        icon: option.icon().map(str::to_string),
        path: option.route().and_then(sanitize_path),
        kind: NodeKind::Menu,
        children: Vec::new(),
        source: Some(option.clone()),
    }
}

fn implicit_menu(key: String, label: &str) -> MenuNode {
    MenuNode {
        key,
        label: label.trim().to_string(),
        icon: Some(FOLDER_ICON.to_string()),
        path: None,
        kind: NodeKind::Menu,
        children: Vec::new(),
        source: None,
    }
}

/// Build the navigation tree and access index from the filtered option list.
///
/// `org_id` feeds the `?id=` suffix of org-scoped canonical routes.
pub fn build_tree(raw: &[RawOption], config: &MenuConfig, org_id: Option<&str>) -> MenuTree {
    // Explicit menus by key; a later duplicate wins unless it would drop an icon.
    let mut menu_options: Vec<(String, &RawOption)> = Vec::new();
    let mut menu_option_idx: HashMap<String, usize> = HashMap::new();
    for option in raw.iter().filter(|o| o.is_menu()) {
        let key = normalize_key(&option.nombre);
        if key.is_empty() {
            continue;
        }
        match menu_option_idx.get(&key).copied() {
            Some(idx) => {
                let previous = menu_options[idx].1;
                if !(previous.icon().is_some() && option.icon().is_none()) {
                    menu_options[idx].1 = option;
                }
            }
            None => {
                menu_option_idx.insert(key.clone(), menu_options.len());
                menu_options.push((key, option));
            }
        }
    }

    // Parent names referenced by items, first appearance wins the label.
    let mut referenced: Vec<(String, &str)> = Vec::new();
    let mut seen_parents: HashSet<String> = HashSet::new();
    for option in raw.iter().filter(|o| o.is_item()) {
        if let Some(parent) = option.parent() {
            let key = normalize_key(parent);
            if !key.is_empty() && seen_parents.insert(key.clone()) {
                referenced.push((key, parent));
            }
        }
    }

    let mut menus = Menus::default();
    for (key, label) in &referenced {
        let explicit = fuzzy_lookup(key, menu_options.iter().map(|(k, _)| k.as_str()));
        match explicit.and_then(|k| menu_option_idx.get(k).copied()) {
            Some(idx) => {
                let (menu_key, option) = &menu_options[idx];
                menus.insert(explicit_menu(menu_key.clone(), option));
            }
            None => {
                menus.insert(implicit_menu(key.clone(), label));
            }
        }
    }
    for (key, option) in &menu_options {
        if menus.get(key).is_none() {
            menus.insert(explicit_menu(key.clone(), option));
        }
    }

    let mut used_keys: HashSet<String> = HashSet::new();
    let mut top_level_items: Vec<MenuNode> = Vec::new();

    for option in raw.iter().filter(|o| o.is_item()) {
        let name_key = normalize_key(&option.nombre);
        if name_key.is_empty() {
            continue;
        }
        let parent_key = option.parent().map(normalize_key).filter(|k| !k.is_empty());

        let sanitized = option.route().and_then(sanitize_path);
        let path = if config.keep_literal_paths {
            sanitized
        } else {
            canonical::canonicalize(
                &name_key,
                parent_key.as_deref().unwrap_or(""),
                sanitized,
                org_id,
            )
        };

        let node = MenuNode {
            key: unique_key(&name_key, &mut used_keys),
            label: option.nombre.trim().to_string(),
            icon: option.icon().map(str::to_string),
            path,
            kind: NodeKind::Item,
            children: Vec::new(),
            source: Some(option.clone()),
        };

        match parent_key {
            Some(parent_key) => {
                let idx = match menus.fuzzy(&parent_key) {
                    Some(idx) => idx,
                    None => {
                        let label = option.parent().unwrap_or_default().to_string();
                        menus.insert(implicit_menu(parent_key, &label))
                    }
                };
                menus.nodes[idx].children.push(node);
            }
            None => top_level_items.push(node),
        }
    }

    let menus = drop_empty_duplicates(menus.nodes);

    let mut roots: Vec<MenuNode> = menus.into_iter().chain(top_level_items).collect();
    for root in &mut roots {
        sort_children(root);
    }
    roots.sort_by(|a, b| compare_labels(&a.label, &b.label));

    let items: Vec<MenuNode> = flatten_items(&roots).into_iter().cloned().collect();
    let index = AccessIndex::build(&roots, raw);

    tracing::debug!(
        menus = roots.iter().filter(|n| n.is_menu()).count(),
        items = items.len(),
        paths = index.paths().len(),
        "menu tree built"
    );

    MenuTree {
        roots,
        items,
        index,
    }
}

fn unique_key(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Remove childless menus that sit within [`MENU_FUZZY_THRESHOLD`] of a
/// populated menu; they are corrupted duplicates.
fn drop_empty_duplicates(menus: Vec<MenuNode>) -> Vec<MenuNode> {
    let populated: Vec<String> = menus
        .iter()
        .filter(|m| !m.children.is_empty())
        .map(|m| m.key.clone())
        .collect();

    menus
        .into_iter()
        .filter(|menu| {
            if !menu.children.is_empty() {
                return true;
            }
            let duplicate = populated
                .iter()
                .find(|other| **other != menu.key && levenshtein(&menu.key, other) <= MENU_FUZZY_THRESHOLD);
            if let Some(other) = duplicate {
                tracing::debug!(menu = %menu.key, kept = %other, "dropping empty duplicate menu");
            }
            duplicate.is_none()
        })
        .collect()
}

fn sort_children(node: &mut MenuNode) {
    node.children.sort_by(|a, b| compare_labels(&a.label, &b.label));
    for child in &mut node.children {
        sort_children(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canonical() -> MenuConfig {
        MenuConfig::default()
    }

    fn literal() -> MenuConfig {
        MenuConfig {
            keep_literal_paths: true,
            ..MenuConfig::default()
        }
    }

    fn menu<'a>(tree: &'a MenuTree, key: &str) -> &'a MenuNode {
        tree.roots
            .iter()
            .find(|n| n.key == key)
            .unwrap_or_else(|| panic!("menu {key} not found"))
    }

    #[test]
    fn items_attach_to_menus_by_normalized_name() {
        let raw = vec![
            RawOption::menu("Gestión de Usuarios").with_icon("people"),
            RawOption::item("Listar Usuarios", Some("Gestion de Usuarios"), Some("/usuarios")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        assert_eq!(tree.roots.len(), 1);
        let users = menu(&tree, "gestion-de-usuarios");
        assert_eq!(users.icon.as_deref(), Some("people"));
        assert_eq!(users.children.len(), 1);
        assert_eq!(users.children[0].path.as_deref(), Some("/usuarios"));
    }

    #[test]
    fn misspelled_parent_joins_nearest_menu() {
        let raw = vec![
            RawOption::menu("Gestión de Usuarios"),
            RawOption::item("Crear Usuario", Some("Gestion de Usuaros"), Some("/crear-usuario")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(menu(&tree, "gestion-de-usuarios").children[0].key, "crear-usuario");
    }

    #[test]
    fn unknown_parent_synthesizes_a_folder() {
        let raw = vec![RawOption::item("Reporte Diario", Some("Reportes"), Some("reportes/diario/"))];

        let tree = build_tree(&raw, &literal(), None);
        let reports = menu(&tree, "reportes");
        assert_eq!(reports.icon.as_deref(), Some(FOLDER_ICON));
        assert!(reports.source.is_none());
        assert_eq!(reports.children[0].path.as_deref(), Some("/reportes/diario"));
    }

    #[test]
    fn menu_icon_survives_later_duplicate_without_icon() {
        let raw = vec![
            RawOption::menu("Roles").with_icon("badge"),
            RawOption::menu("roles"),
            RawOption::item("Listar", Some("Roles"), Some("/listar-roles")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        assert_eq!(menu(&tree, "roles").icon.as_deref(), Some("badge"));
    }

    #[test]
    fn empty_near_duplicate_menu_is_removed() {
        let raw = vec![
            RawOption::menu("Vehiculos"),
            RawOption::menu("Vehiculoss"),
            RawOption::menu("Auditoria"),
            RawOption::item("Listar Vehículos", Some("Vehiculos"), Some("/listar-vehiculos")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        let keys: Vec<&str> = tree.roots.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["auditoria", "vehiculos"]);
    }

    #[test]
    fn children_and_roots_sorted_by_label() {
        let raw = vec![
            RawOption::menu("Vehículos"),
            RawOption::menu("Áreas"),
            RawOption::item("Listar", Some("Vehículos"), Some("/b")),
            RawOption::item("Asignar", Some("Vehículos"), Some("/a")),
            RawOption::item("Zonas", Some("Áreas"), Some("/z")),
            RawOption::item("Inicio", None, Some("/inicio")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        let labels: Vec<&str> = tree.roots.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Áreas", "Inicio", "Vehículos"]);
        let vehicles: Vec<&str> = menu(&tree, "vehiculos")
            .children
            .iter()
            .map(|n| n.label.as_str())
            .collect();
        assert_eq!(vehicles, vec!["Asignar", "Listar"]);
    }

    #[test]
    fn canonical_routes_replace_backend_paths() {
        let raw = vec![RawOption::item(
            "Crear Sección",
            Some("Gestión de Secciones"),
            Some("/some/legacy/path"),
        )];

        let tree = build_tree(&raw, &canonical(), None);
        assert_eq!(tree.items[0].path.as_deref(), Some("/crear-seccion"));

        let tree = build_tree(&raw, &canonical(), Some("7"));
        assert_eq!(tree.items[0].path.as_deref(), Some("/crear-seccion?id=7"));
        assert!(tree.index.can_access_path("/crear-seccion"));

        let tree = build_tree(&raw, &literal(), Some("7"));
        assert_eq!(tree.items[0].path.as_deref(), Some("/some/legacy/path"));
    }

    #[test]
    fn duplicate_item_names_get_unique_keys() {
        let raw = vec![
            RawOption::item("Listar", Some("Zonas"), Some("/zonas")),
            RawOption::item("Listar", Some("Puertas"), Some("/puertas")),
        ];

        let tree = build_tree(&raw, &literal(), None);
        let mut keys: Vec<&str> = tree.items.iter().map(|n| n.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["listar", "listar-2"]);
    }

    #[test]
    fn find_by_path_ignores_query() {
        let raw = vec![RawOption::item("Crear Rol", Some("Roles"), Some("/x"))];
        let tree = build_tree(&raw, &canonical(), Some("3"));
        let node = tree.find_by_path("/crear-rol").unwrap();
        assert_eq!(node.label, "Crear Rol");
        assert!(tree.find_by_path("/crear-rol?id=9").is_some());
        assert!(tree.find_by_path("/nope").is_none());
    }

    #[test]
    fn fuzzy_lookup_prefers_exact_then_first_nearest() {
        let keys = ["roles", "rolez", "rol"];
        assert_eq!(fuzzy_lookup("roles", keys.iter().copied()), Some("roles"));
        assert_eq!(fuzzy_lookup("rolex", keys.iter().copied()), Some("roles"));
        assert_eq!(fuzzy_lookup("usuarios", keys.iter().copied()), None);
        assert_eq!(fuzzy_lookup("", keys.iter().copied()), None);
    }

    fn arb_option() -> impl Strategy<Value = RawOption> {
        let names = prop::sample::select(vec![
            "Roles", "Rol", "Vehículos", "Secciones", "Crear", "Listar", "Auditoría", "Zonas",
        ]);
        (names.clone(), prop::option::of(names), prop::bool::ANY, prop::option::of("[a-z/]{1,12}"))
            .prop_map(|(name, parent, is_menu, route)| {
                if is_menu {
                    RawOption::menu(name)
                } else {
                    RawOption::item(name, parent, route.as_deref())
                }
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Building twice from the same input yields the same tree and index.
        #[test]
        fn build_is_deterministic(raw in prop::collection::vec(arb_option(), 0..20)) {
            let first = build_tree(&raw, &canonical(), Some("1"));
            let second = build_tree(&raw, &canonical(), Some("1"));
            prop_assert_eq!(first, second);
        }

        /// Every leaf path is accessible, and nothing else is.
        #[test]
        fn leaf_paths_are_exactly_the_accessible_paths(
            raw in prop::collection::vec(arb_option(), 0..20),
            candidate in "/[a-z-]{1,12}",
        ) {
            let tree = build_tree(&raw, &literal(), None);
            let leaf_paths: HashSet<String> = tree
                .items
                .iter()
                .filter_map(|n| n.path.as_deref())
                .map(|p| guardian_core::text::strip_query(p).to_string())
                .collect();

            for path in &leaf_paths {
                prop_assert!(tree.index.can_access_path(path));
            }
            prop_assert_eq!(tree.index.can_access_path(&candidate), leaf_paths.contains(&candidate));
        }

        /// Every item ends up somewhere in the tree.
        #[test]
        fn no_item_is_lost(raw in prop::collection::vec(arb_option(), 0..20)) {
            let tree = build_tree(&raw, &literal(), None);
            let expected = raw.iter().filter(|o| o.is_item()).count();
            prop_assert_eq!(tree.items.len(), expected);
        }
    }
}
