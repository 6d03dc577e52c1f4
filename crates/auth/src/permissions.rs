use serde::{Deserialize, Serialize};

use guardian_core::text::normalize_code;

/// Permission code in its canonical alphabet (uppercase, `_`-joined).
///
/// Backend codes arrive as `"crear_seccion"`, `"CREAR-SECCION"` or
/// `"Crear Sección"`; all of them collapse to `CREAR_SECCION`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Normalize raw input; blank codes are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = normalize_code(raw);
        if code.is_empty() { None } else { Some(Self(code)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
