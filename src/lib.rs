pub mod config;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod minecraft;
pub mod state;
pub mod utils;

pub use error::{AppError, CommandError, Result};
pub use integrations::{LauncherBackend, ModrinthCatalogBackend};
pub use state::SyncSession;
