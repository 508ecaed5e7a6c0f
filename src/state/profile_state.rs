use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Vanilla,
    Forge,
    Fabric,
    Quilt,
    NeoForge,
}

impl ModLoader {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Vanilla => "vanilla",
            Self::Forge => "forge",
            Self::Fabric => "fabric",
            Self::Quilt => "quilt",
            Self::NeoForge => "neoforge",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "vanilla" => Ok(ModLoader::Vanilla),
            "forge" => Ok(ModLoader::Forge),
            "fabric" => Ok(ModLoader::Fabric),
            "quilt" => Ok(ModLoader::Quilt),
            "neoforge" => Ok(ModLoader::NeoForge),
            _ => Err(AppError::InvalidModLoader(s.to_string())),
        }
    }

    pub fn supports_mods(&self) -> bool {
        !matches!(self, ModLoader::Vanilla)
    }
}

impl std::fmt::Display for ModLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LoaderDescriptor {
    pub loader: ModLoader,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Profile {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub game_version: String, // not guaranteed to be dotted numeric
    pub loader: LoaderDescriptor,
    #[serde(default)]
    pub memory_mb: Option<u32>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub settings_sync: bool,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub game_version: Option<String>,
    pub loader: Option<LoaderDescriptor>,
    pub memory_mb: Option<u32>,
    pub icon: Option<String>,
    pub settings_sync: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        game_version: impl Into<String>,
        loader: ModLoader,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            game_version: game_version.into(),
            loader: LoaderDescriptor {
                loader,
                version: None,
            },
            memory_mb: None,
            icon: None,
            settings_sync: true,
        }
    }

    pub fn apply_update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(game_version) = update.game_version {
            self.game_version = game_version;
        }
        if let Some(loader) = update.loader {
            self.loader = loader;
        }
        if let Some(memory_mb) = update.memory_mb {
            self.memory_mb = Some(memory_mb);
        }
        if let Some(icon) = update.icon {
            self.icon = Some(icon);
        }
        if let Some(settings_sync) = update.settings_sync {
            self.settings_sync = settings_sync;
        }
    }
}

/// The one profile the UI currently works against, if any.
#[derive(Clone, Default)]
pub struct ActiveProfile {
    inner: Arc<RwLock<Option<Profile>>>,
}

impl ActiveProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Profile> {
        self.inner.read().await.clone()
    }

    pub async fn id(&self) -> Option<Uuid> {
        self.inner.read().await.as_ref().map(|profile| profile.id)
    }

    pub async fn require_id(&self) -> Result<Uuid> {
        self.id().await.ok_or(AppError::NoActiveProfile)
    }

    /// Replaces the active profile and returns the previous one.
    pub async fn replace(&self, profile: Option<Profile>) -> Option<Profile> {
        let mut guard = self.inner.write().await;
        std::mem::replace(&mut *guard, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_loader_from_str_is_case_insensitive() {
        assert_eq!(ModLoader::from_str("NeoForge").unwrap(), ModLoader::NeoForge);
        assert_eq!(ModLoader::from_str("fabric").unwrap(), ModLoader::Fabric);
        assert!(ModLoader::from_str("liteloader").is_err());
    }

    #[test]
    fn test_apply_update_only_touches_given_fields() {
        let mut profile = Profile::new("Survival", "1.20.1", ModLoader::Fabric);
        let id = profile.id;
        profile.apply_update(ProfileUpdate {
            game_version: Some("1.21.1".to_string()),
            memory_mb: Some(4096),
            ..Default::default()
        });

        assert_eq!(profile.id, id);
        assert_eq!(profile.name, "Survival");
        assert_eq!(profile.game_version, "1.21.1");
        assert_eq!(profile.loader.loader, ModLoader::Fabric);
        assert_eq!(profile.memory_mb, Some(4096));
        assert!(profile.settings_sync);
    }

    #[test]
    fn test_profile_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "5c7f9a54-1d73-4d3c-8a0e-1f2b3c4d5e6f",
            "name": "Vanilla",
            "game_version": "1.21.4",
            "loader": { "loader": "vanilla" }
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.loader.loader, ModLoader::Vanilla);
        assert_eq!(profile.loader.version, None);
        assert!(!profile.settings_sync);
    }
}
