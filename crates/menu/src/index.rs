use std::collections::BTreeSet;

use serde::Serialize;

use guardian_auth::PermissionCode;
use guardian_core::text::{normalize_key, strip_query};

use crate::node::MenuNode;
use crate::raw::RawOption;

/// Lookup sets derived from one tree build. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessIndex {
    paths: BTreeSet<String>,
    keys: BTreeSet<String>,
    codes: BTreeSet<PermissionCode>,
}

impl AccessIndex {
    /// Project `roots` (paths and keys) and the retained raw options (codes).
    pub fn build(roots: &[MenuNode], raw: &[RawOption]) -> Self {
        let mut index = Self::default();

        for root in roots {
            root.walk(&mut |node| {
                index.keys.insert(node.key.clone());
                if node.is_leaf() {
                    if let Some(path) = node.path.as_deref() {
                        index.paths.insert(strip_query(path).to_string());
                    }
                }
            });
        }

        index.codes = raw
            .iter()
            .filter_map(RawOption::code)
            .filter_map(PermissionCode::parse)
            .collect();

        index
    }

    pub fn can_access_path(&self, path: &str) -> bool {
        self.paths.contains(strip_query(path))
    }

    /// Permission code lookup, falling back to node keys for names used as codes.
    pub fn can_access_code(&self, code: &str) -> bool {
        if PermissionCode::parse(code).is_some_and(|c| self.codes.contains(&c)) {
            return true;
        }
        let key = normalize_key(code);
        !key.is_empty() && self.keys.contains(&key)
    }

    pub fn paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    pub fn codes(&self) -> &BTreeSet<PermissionCode> {
        &self.codes
    }
}
