pub mod bulk_state;
pub mod config_state;
pub mod event_state;
pub mod installed_state;
pub mod log_state;
pub mod login_state;
pub mod mods_watch_state;
pub mod poll_state;
pub mod profile_state;
pub mod search_state;
pub mod session;

pub use session::{SyncSession, View};
