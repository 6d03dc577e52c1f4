use serde::Serialize;

use crate::raw::RawOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Menu,
    Item,
}

/// A node of the navigation tree.
///
/// Menus group children and may carry a path of their own; only items with a
/// path are navigation targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub path: Option<String>,
    pub kind: NodeKind,
    pub children: Vec<MenuNode>,
    /// Originating option; `None` for menus synthesized from a parent name.
    #[serde(skip)]
    pub source: Option<RawOption>,
}

impl MenuNode {
    pub fn is_menu(&self) -> bool {
        self.kind == NodeKind::Menu
    }

    /// Item with a navigable path.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Item && self.path.is_some()
    }

    /// Depth-first walk over this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a MenuNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Every item node under `roots`, depth-first in display order.
pub fn flatten_items(roots: &[MenuNode]) -> Vec<&MenuNode> {
    let mut out = Vec::new();
    for root in roots {
        root.walk(&mut |node| {
            if node.kind == NodeKind::Item {
                out.push(node);
            }
        });
    }
    out
}
