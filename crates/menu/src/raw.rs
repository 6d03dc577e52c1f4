//! Backend option descriptors as delivered in `opcionesDetalle`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionKind {
    #[serde(alias = "menu", alias = "Menu")]
    Menu,
    #[serde(alias = "item", alias = "Item")]
    Item,
}

/// One menu or menu item granted to the session, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOption {
    #[serde(default)]
    pub nombre: String,
    pub tipo: OptionKind,
    #[serde(default)]
    pub icono: Option<String>,
    #[serde(default)]
    pub ruta: Option<String>,
    #[serde(default)]
    pub padre_nombre: Option<String>,
    #[serde(default)]
    pub codigo: Option<String>,
}

impl RawOption {
    pub fn menu(nombre: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            tipo: OptionKind::Menu,
            icono: None,
            ruta: None,
            padre_nombre: None,
            codigo: None,
        }
    }

    pub fn item(nombre: impl Into<String>, padre: Option<&str>, ruta: Option<&str>) -> Self {
        Self {
            nombre: nombre.into(),
            tipo: OptionKind::Item,
            icono: None,
            ruta: ruta.map(str::to_string),
            padre_nombre: padre.map(str::to_string),
            codigo: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icono = Some(icon.to_string());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.codigo = Some(code.to_string());
        self
    }

    pub fn with_route(mut self, ruta: &str) -> Self {
        self.ruta = Some(ruta.to_string());
        self
    }

    pub fn is_menu(&self) -> bool {
        self.tipo == OptionKind::Menu
    }

    pub fn is_item(&self) -> bool {
        self.tipo == OptionKind::Item
    }

    /// Parent name, if present and not blank.
    pub fn parent(&self) -> Option<&str> {
        non_blank(self.padre_nombre.as_deref())
    }

    pub fn icon(&self) -> Option<&str> {
        non_blank(self.icono.as_deref())
    }

    pub fn route(&self) -> Option<&str> {
        non_blank(self.ruta.as_deref())
    }

    pub fn code(&self) -> Option<&str> {
        non_blank(self.codigo.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Drop entries without a usable name.
pub fn sanitize(options: Vec<RawOption>) -> Vec<RawOption> {
    options
        .into_iter()
        .filter(|o| !o.nombre.trim().is_empty())
        .collect()
}

/// Lenient decoding of an `opcionesDetalle` value.
///
/// Anything that is not an array yields an empty list; array entries that do
/// not decode (missing `tipo`, wrong shapes) are dropped individually.
pub fn parse_options(value: &Value) -> Vec<RawOption> {
    let Some(entries) = value.as_array() else {
        if !value.is_null() {
            tracing::warn!("option list is not an array; ignoring it");
        }
        return Vec::new();
    };

    let mut dropped = 0usize;
    let parsed: Vec<RawOption> = entries
        .iter()
        .filter_map(|entry| match RawOption::deserialize(entry) {
            Ok(option) => Some(option),
            Err(err) => {
                dropped += 1;
                tracing::debug!(error = %err, "dropping malformed option");
                None
            }
        })
        .collect();

    if dropped > 0 {
        tracing::warn!(dropped, "dropped malformed menu options");
    }
    sanitize(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_shape() {
        let value = json!([
            {"nombre": "Gestión de Secciones", "tipo": "MENU", "icono": "layers", "ruta": null, "padreNombre": null, "codigo": null},
            {"nombre": "Crear Sección", "tipo": "item", "icono": null, "ruta": "/crear-seccion", "padreNombre": "Gestión de Secciones", "codigo": "SECCION_CREAR"}
        ]);

        let options = parse_options(&value);
        assert_eq!(options.len(), 2);
        assert!(options[0].is_menu());
        assert_eq!(options[1].parent(), Some("Gestión de Secciones"));
        assert_eq!(options[1].code(), Some("SECCION_CREAR"));
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let value = json!([
            {"nombre": "", "tipo": "MENU"},
            {"nombre": "Sin tipo"},
            {"nombre": "   ", "tipo": "ITEM"},
            42,
            {"nombre": "Roles", "tipo": "MENU"}
        ]);

        let options = parse_options(&value);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].nombre, "Roles");
    }

    #[test]
    fn non_array_is_empty() {
        assert!(parse_options(&json!({"nombre": "x"})).is_empty());
        assert!(parse_options(&Value::Null).is_empty());
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let option = RawOption::item("Crear Rol", Some("  "), Some(""));
        assert_eq!(option.parent(), None);
        assert_eq!(option.route(), None);
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let option = RawOption::item("Crear Rol", Some("Roles"), Some("/crear-rol"));
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(value["padreNombre"], "Roles");
        assert_eq!(value["tipo"], "ITEM");
    }
}
