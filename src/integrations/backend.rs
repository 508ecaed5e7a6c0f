//! Command contract of the launcher backend.
//!
//! Everything durable (profile storage, downloads, file moves, OAuth token
//! exchange) lives behind [`LauncherBackend`]. The sync engine only ever sees
//! the shapes defined here.

use crate::error::Result;
use crate::integrations::modrinth::ModrinthApi;
use crate::minecraft::api::mc_api::MinecraftApiService;
use crate::minecraft::dto::version_manifest::GameVersion;
use crate::state::profile_state::{Profile, ProfileUpdate};
use crate::utils::profile_utils::ContentType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Remote content descriptor as returned by a catalog search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CatalogItem {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub client_side: Option<String>,
    #[serde(default)]
    pub server_side: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Catalog the item was found in; installs go back to the same one.
    #[serde(default)]
    pub source: ContentSource,
}

/// Local content descriptor as reported for one profile folder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct InstalledItem {
    pub filename: String,
    #[serde(default)]
    pub mod_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub has_update: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Downloads,
    Follows,
    Newest,
    Updated,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Downloads => "downloads",
            SortBy::Follows => "follows",
            SortBy::Newest => "newest",
            SortBy::Updated => "updated",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    pub query: String,
    pub content_type: ContentType,
    pub game_version: Option<String>,
    pub loader: Option<String>,
    pub categories: Vec<String>,
    pub sort_by: SortBy,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    #[default]
    Modrinth,
    CurseForge,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_microsoft: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeviceCodeFlow {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds between polls requested by the identity provider.
    pub interval: u64,
    /// Seconds until the device code expires, when the provider reports it.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    #[default]
    Latest,
    Debug,
    Crash,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Latest => "latest",
            LogType::Debug => "debug",
            LogType::Crash => "crash",
        }
    }
}

#[async_trait]
pub trait LauncherBackend: Send + Sync {
    async fn list_installed_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
    ) -> Result<Vec<InstalledItem>>;

    async fn search_catalog(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>>;

    async fn install_item(
        &self,
        profile_id: Uuid,
        item_id: &str,
        version_id: Option<&str>,
        source: ContentSource,
    ) -> Result<()>;

    async fn toggle_item(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
        enable: bool,
    ) -> Result<()>;

    async fn delete_item(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
    ) -> Result<()>;

    async fn bulk_toggle_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
        enable: bool,
    ) -> Result<()>;

    async fn bulk_delete_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
    ) -> Result<()>;

    async fn get_active_account(&self) -> Result<Option<Account>>;

    async fn begin_device_login(&self) -> Result<DeviceCodeFlow>;

    /// `Ok(None)` while the user has not finished authorizing.
    async fn poll_device_login(&self, device_code: &str) -> Result<Option<Account>>;

    async fn get_game_version_catalog(&self) -> Result<Vec<GameVersion>>;

    async fn get_profile_logs(&self, profile_id: Uuid, log_type: LogType) -> Result<String>;

    async fn update_profile(&self, profile_id: Uuid, update: &ProfileUpdate) -> Result<Profile>;
}

/// Answers catalog and version queries straight from Modrinth and Mojang,
/// forwarding every profile-bound command to `inner`.
pub struct ModrinthCatalogBackend<B> {
    inner: B,
    modrinth: ModrinthApi,
    minecraft: MinecraftApiService,
}

impl<B: LauncherBackend> ModrinthCatalogBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            modrinth: ModrinthApi::new(),
            minecraft: MinecraftApiService::new(),
        }
    }

    pub fn with_services(inner: B, modrinth: ModrinthApi, minecraft: MinecraftApiService) -> Self {
        Self {
            inner,
            modrinth,
            minecraft,
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: LauncherBackend> LauncherBackend for ModrinthCatalogBackend<B> {
    async fn list_installed_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
    ) -> Result<Vec<InstalledItem>> {
        self.inner.list_installed_items(profile_id, content_type).await
    }

    async fn search_catalog(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        self.modrinth.search_projects(query).await
    }

    async fn install_item(
        &self,
        profile_id: Uuid,
        item_id: &str,
        version_id: Option<&str>,
        source: ContentSource,
    ) -> Result<()> {
        self.inner
            .install_item(profile_id, item_id, version_id, source)
            .await
    }

    async fn toggle_item(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
        enable: bool,
    ) -> Result<()> {
        self.inner
            .toggle_item(profile_id, content_type, filename, enable)
            .await
    }

    async fn delete_item(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
    ) -> Result<()> {
        self.inner.delete_item(profile_id, content_type, filename).await
    }

    async fn bulk_toggle_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
        enable: bool,
    ) -> Result<()> {
        self.inner
            .bulk_toggle_items(profile_id, content_type, filenames, enable)
            .await
    }

    async fn bulk_delete_items(
        &self,
        profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
    ) -> Result<()> {
        self.inner
            .bulk_delete_items(profile_id, content_type, filenames)
            .await
    }

    async fn get_active_account(&self) -> Result<Option<Account>> {
        self.inner.get_active_account().await
    }

    async fn begin_device_login(&self) -> Result<DeviceCodeFlow> {
        self.inner.begin_device_login().await
    }

    async fn poll_device_login(&self, device_code: &str) -> Result<Option<Account>> {
        self.inner.poll_device_login(device_code).await
    }

    async fn get_game_version_catalog(&self) -> Result<Vec<GameVersion>> {
        self.minecraft.get_game_versions().await
    }

    async fn get_profile_logs(&self, profile_id: Uuid, log_type: LogType) -> Result<String> {
        self.inner.get_profile_logs(profile_id, log_type).await
    }

    async fn update_profile(&self, profile_id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        self.inner.update_profile(profile_id, update).await
    }
}
