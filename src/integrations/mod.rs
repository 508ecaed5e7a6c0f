pub mod backend;
pub mod modrinth;

pub use backend::{LauncherBackend, ModrinthCatalogBackend};
