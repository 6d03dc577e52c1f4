//! Front-end route constants shared by guards and the canonical route table.

pub const LOGIN: &str = "/login";
pub const REGISTER: &str = "/registro";
pub const DASHBOARD: &str = "/dashboard";
pub const NOT_AUTHORIZED: &str = "/no-autorizado";

pub const ORG_LISTING: &str = "/listar-organizaciones";
pub const SECTION_LISTING: &str = "/listar-secciones";

pub const MENU_OPTION_CREATE: &str = "/crear-opcion-menu";
pub const MENU_OPTION_EDIT: &str = "/editar-opcion-menu";
pub const MENU_OPTION_LIST: &str = "/listar-opciones-menu";

/// Routes that never require an active organization context.
pub const CONTEXT_FREE: &[&str] = &[
    LOGIN,
    REGISTER,
    ORG_LISTING,
    MENU_OPTION_CREATE,
    MENU_OPTION_EDIT,
    MENU_OPTION_LIST,
];
