//! Pure string helpers used for name matching and route comparison.
//!
//! Backend-supplied menu names vary in accents, casing and punctuation, so every
//! lookup goes through one of the normalizers below before it is used as a key.

use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Remove combining marks after canonical decomposition (`"Sección"` → `"Seccion"`).
pub fn strip_diacritics(input: &str) -> String {
    input.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Slug-like key used for menu and item names.
///
/// Diacritics are stripped, the result is lowercased, and every run of
/// non-alphanumeric characters collapses to a single `-` with no leading or
/// trailing separator: `"Gestión de Secciones"` → `"gestion-de-secciones"`.
pub fn normalize_key(input: &str) -> String {
    collapse(&strip_diacritics(input).to_lowercase(), '-')
}

/// Permission-code form: uppercase, `_`-joined (`"crear sección"` → `"CREAR_SECCION"`).
pub fn normalize_code(input: &str) -> String {
    collapse(&strip_diacritics(input).to_uppercase(), '_')
}

fn collapse(input: &str, separator: char) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending && !out.is_empty() {
                out.push(separator);
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    out
}

/// Edit distance between two strings (insert/delete/substitute, unit cost).
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Non-empty `-`-separated tokens of a path segment or key.
pub fn tokens(input: &str) -> Vec<&str> {
    input.split('-').filter(|t| !t.is_empty()).collect()
}

/// Share of distinct tokens two keys have in common, relative to the larger set.
///
/// Returns `0.0` when either side has no tokens.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = tokens(a).into_iter().collect();
    let right: HashSet<&str> = tokens(b).into_iter().collect();
    let larger = left.len().max(right.len());
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f64 / larger as f64
}

/// Drop the query string and fragment from a route.
pub fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Whether the route carries a query string.
pub fn has_query(path: &str) -> bool {
    path.contains('?')
}

/// Canonical shape for a route string coming from the backend.
///
/// - forces a leading `/`
/// - collapses repeated slashes
/// - strips a literal `/dashboard` prefix segment
/// - strips the trailing slash unless the route is the root
///
/// Any query string is preserved untouched. Blank input yields `None`.
pub fn sanitize_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (path, query) = match raw.find('?') {
        Some(idx) => (&raw[..idx], &raw[idx..]),
        None => (raw, ""),
    };

    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }

    if out == "/dashboard" {
        out.truncate(1);
    } else if out.starts_with("/dashboard/") {
        out.replace_range(..("/dashboard".len()), "");
    }

    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }

    out.push_str(query);
    Some(out)
}

/// Last non-empty `/` segment of a route (query stripped).
pub fn last_segment(path: &str) -> &str {
    strip_query(path)
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

/// Route with its last segment removed (`"/a/b"` → `"/a"`, `"/a"` → `"/"`).
pub fn parent_path(path: &str) -> String {
    let trimmed = strip_query(path).trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Label ordering that ignores case and accents first, then falls back to the
/// raw text so the order is total.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let left = strip_diacritics(a).to_lowercase();
    let right = strip_diacritics(b).to_lowercase();
    left.cmp(&right).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_key_strips_accents_and_punctuation() {
        assert_eq!(normalize_key("Gestión de Secciones"), "gestion-de-secciones");
        assert_eq!(normalize_key("  Crear  Sección!! "), "crear-seccion");
        assert_eq!(normalize_key("Vehículos / Asignación"), "vehiculos-asignacion");
        assert_eq!(normalize_key("***"), "");
    }

    #[test]
    fn normalize_code_uses_uppercase_underscores() {
        assert_eq!(normalize_code("crear sección"), "CREAR_SECCION");
        assert_eq!(normalize_code("ver-auditoría"), "VER_AUDITORIA");
        assert_eq!(normalize_code("ROL_CREAR"), "ROL_CREAR");
    }

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("gestion-de-usuarios", "gestion-de-usuarioss"), 1);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn token_overlap_is_relative_to_larger_side() {
        assert_eq!(token_overlap("crear-seccion", "crear-seccion"), 1.0);
        assert_eq!(token_overlap("crear-seccion", "crear"), 0.5);
        assert_eq!(token_overlap("nueva", "crear-seccion"), 0.0);
        assert_eq!(token_overlap("", "crear"), 0.0);
    }

    #[test]
    fn sanitize_path_rules() {
        assert_eq!(sanitize_path("crear-rol").as_deref(), Some("/crear-rol"));
        assert_eq!(sanitize_path("/dashboard/crear-rol/").as_deref(), Some("/crear-rol"));
        assert_eq!(sanitize_path("//a///b//").as_deref(), Some("/a/b"));
        assert_eq!(sanitize_path("/dashboard").as_deref(), Some("/"));
        assert_eq!(sanitize_path("/dashboards").as_deref(), Some("/dashboards"));
        assert_eq!(sanitize_path("/").as_deref(), Some("/"));
        assert_eq!(sanitize_path("/x/?id=3").as_deref(), Some("/x?id=3"));
        assert_eq!(sanitize_path("   "), None);
    }

    #[test]
    fn query_helpers() {
        assert_eq!(strip_query("/a/b?id=1"), "/a/b");
        assert_eq!(strip_query("/a#top"), "/a");
        assert!(has_query("/a?x=1"));
        assert_eq!(last_segment("/orgs/5/crear?id=1"), "crear");
        assert_eq!(parent_path("/orgs/5"), "/orgs");
        assert_eq!(parent_path("/orgs"), "/");
    }

    #[test]
    fn labels_sort_ignoring_accents() {
        let mut labels = vec!["Vehículos", "Áreas", "roles", "Auditoría"];
        labels.sort_by(|a, b| compare_labels(a, b));
        assert_eq!(labels, vec!["Áreas", "Auditoría", "roles", "Vehículos"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Normalizing an already-normalized key is a no-op.
        #[test]
        fn normalize_key_is_idempotent(input in "[a-zA-Z0-9áéíóúñÁÉÍÓÚÑ _/.-]{0,40}") {
            let once = normalize_key(&input);
            prop_assert_eq!(normalize_key(&once), once);
        }

        /// A sanitized path always starts with a slash and never ends with one
        /// (except the root).
        #[test]
        fn sanitized_paths_are_well_formed(input in "[a-z/]{1,30}") {
            if let Some(path) = sanitize_path(&input) {
                prop_assert!(path.starts_with('/'));
                prop_assert!(path == "/" || !path.ends_with('/'));
                prop_assert!(!path.contains("//"));
            }
        }
    }
}
