//! `guardian-menu`: permission-driven navigation.
//!
//! Turns the flat option list granted at login into a navigation tree plus an
//! access index that route guards query.
//!
//! Pipeline: [`filter`] → [`tree::build_tree`] (with [`canonical`] route
//! rewriting) → [`index::AccessIndex`] → [`audit`].

pub mod audit;
pub mod canonical;
pub mod config;
pub mod context;
pub mod filter;
pub mod index;
pub mod login;
pub mod node;
pub mod raw;
pub mod service;
pub mod tree;

pub use audit::{AuditReport, audit};
pub use config::MenuConfig;
pub use context::AppContext;
pub use index::AccessIndex;
pub use login::{LoginError, LoginResponse, apply_login, logout};
pub use node::{MenuNode, NodeKind};
pub use raw::{OptionKind, RawOption};
pub use service::{MenuService, MenuSnapshot};
pub use tree::{MenuTree, build_tree};
