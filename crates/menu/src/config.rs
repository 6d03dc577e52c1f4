//! Menu pipeline configuration.

use serde::{Deserialize, Serialize};

pub const HIDE_ORG_MANAGEMENT_ENV: &str = "GUARDIAN_HIDE_ORG_MANAGEMENT";
pub const KEEP_LITERAL_PATHS_ENV: &str = "GUARDIAN_KEEP_LITERAL_PATHS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Hide the organization-management menu and its items.
    pub hide_org_management: bool,

    /// Keep backend routes as delivered instead of rewriting them onto
    /// canonical front-end routes.
    pub keep_literal_paths: bool,
}

impl MenuConfig {
    /// Read flags from the environment; unset or unrecognized values are `false`.
    pub fn from_env() -> Self {
        let config = Self {
            hide_org_management: env_flag(HIDE_ORG_MANAGEMENT_ENV),
            keep_literal_paths: env_flag(KEEP_LITERAL_PATHS_ENV),
        };
        tracing::debug!(?config, "menu config loaded");
        config
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
