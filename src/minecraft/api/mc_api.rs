use crate::config::HTTP_CLIENT;
use crate::error::{AppError, Result};
use crate::minecraft::dto::version_manifest::{GameVersion, VersionManifest};
use log::{debug, error};

const VERSION_MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";

pub struct MinecraftApiService {
    manifest_url: String,
}

impl Default for MinecraftApiService {
    fn default() -> Self {
        Self::new()
    }
}

impl MinecraftApiService {
    pub fn new() -> Self {
        Self {
            manifest_url: VERSION_MANIFEST_URL.to_string(),
        }
    }

    pub fn with_manifest_url(manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
        }
    }

    pub async fn get_version_manifest(&self) -> Result<VersionManifest> {
        debug!("Fetching Minecraft version manifest from: {}", self.manifest_url);

        let response = HTTP_CLIENT
            .get(&self.manifest_url)
            .send()
            .await
            .map_err(AppError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Version manifest request failed with status {}", status);
            return Err(AppError::Other(format!(
                "Version manifest request returned {}",
                status
            )));
        }

        response.json::<VersionManifest>().await.map_err(AppError::Http)
    }

    /// Flat `{id, version_type}` catalog in manifest order (newest first).
    pub async fn get_game_versions(&self) -> Result<Vec<GameVersion>> {
        let manifest = self.get_version_manifest().await?;
        debug!(
            "Version manifest lists {} versions (latest release {})",
            manifest.versions.len(),
            manifest.latest.release
        );
        Ok(manifest.game_versions())
    }
}
