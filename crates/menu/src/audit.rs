//! Diagnostic comparison of backend routes against rendered routes.
//!
//! The audit never influences access decisions; it only reports drift between
//! what the backend granted and what the navigation ended up linking to.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use guardian_core::text::{last_segment, levenshtein, sanitize_path, strip_query, token_overlap};
use guardian_observability::{Notice, Notifier};

use crate::canonical::is_canonical_route;
use crate::raw::RawOption;
use crate::tree::MenuTree;

/// Maximum edit distance between hyphen-stripped last segments.
pub const AUDIT_SEGMENT_THRESHOLD: usize = 3;

/// Minimum token overlap between last segments.
pub const AUDIT_TOKEN_OVERLAP: f64 = 0.5;

/// Examples listed inline in a notice before collapsing to `+N more`.
pub const MAX_INLINE_EXAMPLES: usize = 4;

/// Backend paths that were renamed on the front end.
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("/gestion-organizacion", "/gestionar-organizacion"),
    ("/listar-organizacion", "/listar-organizaciones"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    /// Backend paths with no rendered counterpart.
    pub missing_in_ui: Vec<String>,
    /// Rendered paths the backend never granted.
    pub extra_in_ui: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.missing_in_ui.is_empty() && self.extra_in_ui.is_empty()
    }

    /// Human-readable summary, one line per non-empty side.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if !self.missing_in_ui.is_empty() {
            lines.push(format!(
                "{} backend route(s) missing in navigation: {}",
                self.missing_in_ui.len(),
                examples(&self.missing_in_ui)
            ));
        }
        if !self.extra_in_ui.is_empty() {
            lines.push(format!(
                "{} navigation route(s) not granted by backend: {}",
                self.extra_in_ui.len(),
                examples(&self.extra_in_ui)
            ));
        }
        lines.join("\n")
    }
}

fn examples(paths: &[String]) -> String {
    let shown = paths
        .iter()
        .take(MAX_INLINE_EXAMPLES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match paths.len().saturating_sub(MAX_INLINE_EXAMPLES) {
        0 => shown,
        rest => format!("{shown} +{rest} more"),
    }
}

fn alias(path: String) -> String {
    LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == path)
        .map(|(_, current)| current.to_string())
        .unwrap_or(path)
}

/// Canonical raw-side path set: sanitized item routes, query-stripped, aliased.
fn raw_paths(raw: &[RawOption]) -> BTreeSet<String> {
    raw.iter()
        .filter(|o| o.is_item())
        .filter_map(RawOption::route)
        .filter_map(sanitize_path)
        .map(|p| alias(strip_query(&p).to_string()))
        .collect()
}

/// Whether two paths plausibly name the same screen.
pub fn paths_match(a: &str, b: &str) -> bool {
    if a.ends_with(b) || b.ends_with(a) {
        return true;
    }

    let seg_a = last_segment(a);
    let seg_b = last_segment(b);
    let flat_a = seg_a.replace('-', "");
    let flat_b = seg_b.replace('-', "");
    if flat_a.is_empty() || flat_b.is_empty() {
        return false;
    }
    if flat_a == flat_b || flat_a.contains(&flat_b) || flat_b.contains(&flat_a) {
        return true;
    }
    if token_overlap(seg_a, seg_b) >= AUDIT_TOKEN_OVERLAP {
        return true;
    }
    levenshtein(&flat_a, &flat_b) <= AUDIT_SEGMENT_THRESHOLD
}

/// Compare backend item routes with the tree's navigable leaf paths.
pub fn audit(raw: &[RawOption], tree: &MenuTree) -> AuditReport {
    let backend = raw_paths(raw);
    let rendered = tree.index.paths();

    let mut missing: Vec<String> = backend.difference(rendered).cloned().collect();
    let mut extra: Vec<String> = rendered.difference(&backend).cloned().collect();

    missing.retain(|m| {
        match extra.iter().position(|e| paths_match(m, e)) {
            Some(pos) => {
                extra.remove(pos);
                false
            }
            None => true,
        }
    });
    extra.retain(|e| !is_canonical_route(e));

    AuditReport {
        missing_in_ui: missing,
        extra_in_ui: extra,
        generated_at: Utc::now(),
    }
}

/// Log and surface a report. Clean reports are only traced at debug level.
pub fn report(report: &AuditReport, notifier: &dyn Notifier) {
    if report.is_clean() {
        tracing::debug!("menu audit clean");
        return;
    }

    tracing::warn!(
        missing = report.missing_in_ui.len(),
        extra = report.extra_in_ui.len(),
        missing_paths = ?report.missing_in_ui,
        extra_paths = ?report.extra_in_ui,
        "menu audit found route discrepancies"
    );
    notifier.notify(Notice::warning("Menu routes out of sync", report.summary()));
}
