use directories::ProjectDirs;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::path::PathBuf;

pub static LAUNCHER_DIRECTORY: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("gg", "norisk", "NoRiskClientV3"));

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// HTTP Client with launcher agent
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    reqwest::ClientBuilder::new()
        .user_agent(APP_USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

// Extension trait for ProjectDirs to add root_dir functionality
pub trait ProjectDirsExt {
    fn root_dir(&self) -> PathBuf;
}

impl ProjectDirsExt for ProjectDirs {
    fn root_dir(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            // Roaming data lives one level above the app folder on Windows
            self.data_dir()
                .parent()
                .map(|parent| parent.to_path_buf())
                .unwrap_or_else(|| self.data_dir().to_path_buf())
        } else {
            self.data_dir().to_path_buf()
        }
    }
}

/// Launcher root directory, falling back to a relative folder when the
/// platform exposes no home directory.
pub fn launcher_root_dir() -> PathBuf {
    match LAUNCHER_DIRECTORY.as_ref() {
        Some(dirs) => dirs.root_dir(),
        None => PathBuf::from(".norisk-launcher"),
    }
}
