#![allow(dead_code)]

use async_trait::async_trait;
use launcher_content_sync::error::{AppError, Result};
use launcher_content_sync::integrations::backend::{
    Account, CatalogItem, CatalogQuery, ContentSource, DeviceCodeFlow, InstalledItem,
    LauncherBackend, LogType,
};
use launcher_content_sync::minecraft::dto::version_manifest::GameVersion;
use launcher_content_sync::state::config_state::{ConfigManager, SyncConfig};
use launcher_content_sync::state::profile_state::{ModLoader, Profile, ProfileUpdate};
use launcher_content_sync::utils::profile_utils::ContentType;
use launcher_content_sync::SyncSession;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListInstalled(ContentType),
    Search(CatalogQuery),
    Install(String, Option<String>, ContentSource),
    Toggle(String, bool),
    Delete(String),
    BulkToggle(Vec<String>, bool),
    BulkDelete(Vec<String>),
    ActiveAccount,
    BeginLogin,
    PollLogin(String),
    VersionCatalog,
    Logs(LogType),
    UpdateProfile,
}

#[derive(Debug, Clone)]
pub enum LoginStep {
    Pending,
    Success(Account),
    Fail(String),
}

/// In-memory launcher backend that records every command it receives.
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<Call>>,
    pub installed: Mutex<HashMap<ContentType, Vec<InstalledItem>>>,
    pub catalog: Mutex<Vec<CatalogItem>>,
    /// Command names that fail, e.g. `"list_installed_items"`.
    pub failing: Mutex<HashSet<&'static str>>,
    pub login_steps: Mutex<VecDeque<LoginStep>>,
    pub login_interval: Mutex<u64>,
    pub login_expires_in: Mutex<Option<u64>>,
    pub account: Mutex<Option<Account>>,
    pub logs: Mutex<String>,
    pub versions: Mutex<Vec<GameVersion>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.login_interval.lock().unwrap() = 5;
        Arc::new(backend)
    }

    pub fn set_installed(&self, content_type: ContentType, items: Vec<InstalledItem>) {
        self.installed.lock().unwrap().insert(content_type, items);
    }

    pub fn set_catalog(&self, items: Vec<CatalogItem>) {
        *self.catalog.lock().unwrap() = items;
    }

    pub fn fail(&self, command: &'static str) {
        self.failing.lock().unwrap().insert(command);
    }

    pub fn recover(&self, command: &'static str) {
        self.failing.lock().unwrap().remove(command);
    }

    pub fn push_login_steps(&self, steps: impl IntoIterator<Item = LoginStep>) {
        self.login_steps.lock().unwrap().extend(steps);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| matches(*call)).count()
    }

    pub fn searches(&self) -> Vec<CatalogQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, command: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(command) {
            return Err(AppError::backend(command, "mock failure"));
        }
        Ok(())
    }

    fn with_items<T>(
        &self,
        content_type: ContentType,
        f: impl FnOnce(&mut Vec<InstalledItem>) -> T,
    ) -> T {
        let mut installed = self.installed.lock().unwrap();
        f(installed.entry(content_type).or_default())
    }
}

#[async_trait]
impl LauncherBackend for MockBackend {
    async fn list_installed_items(
        &self,
        _profile_id: Uuid,
        content_type: ContentType,
    ) -> Result<Vec<InstalledItem>> {
        self.record(Call::ListInstalled(content_type));
        self.check("list_installed_items")?;
        Ok(self.with_items(content_type, |items| items.clone()))
    }

    async fn search_catalog(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        self.record(Call::Search(query.clone()));
        self.check("search_catalog")?;
        Ok(self.catalog.lock().unwrap().clone())
    }

    async fn install_item(
        &self,
        _profile_id: Uuid,
        item_id: &str,
        version_id: Option<&str>,
        source: ContentSource,
    ) -> Result<()> {
        self.record(Call::Install(
            item_id.to_string(),
            version_id.map(str::to_string),
            source,
        ));
        self.check("install_item")?;
        self.with_items(ContentType::Mod, |items| {
            items.push(InstalledItem {
                filename: format!("{}-1.0.0.jar", item_id),
                mod_id: Some(item_id.to_string()),
                ..Default::default()
            })
        });
        Ok(())
    }

    async fn toggle_item(
        &self,
        _profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
        enable: bool,
    ) -> Result<()> {
        self.record(Call::Toggle(filename.to_string(), enable));
        self.check("toggle_item")?;
        self.with_items(content_type, |items| {
            for item in items.iter_mut().filter(|item| item.filename == filename) {
                item.disabled = !enable;
            }
        });
        Ok(())
    }

    async fn delete_item(
        &self,
        _profile_id: Uuid,
        content_type: ContentType,
        filename: &str,
    ) -> Result<()> {
        self.record(Call::Delete(filename.to_string()));
        self.check("delete_item")?;
        self.with_items(content_type, |items| items.retain(|item| item.filename != filename));
        Ok(())
    }

    async fn bulk_toggle_items(
        &self,
        _profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
        enable: bool,
    ) -> Result<()> {
        self.record(Call::BulkToggle(filenames.to_vec(), enable));
        self.check("bulk_toggle_items")?;
        self.with_items(content_type, |items| {
            for item in items.iter_mut().filter(|item| filenames.contains(&item.filename)) {
                item.disabled = !enable;
            }
        });
        Ok(())
    }

    async fn bulk_delete_items(
        &self,
        _profile_id: Uuid,
        content_type: ContentType,
        filenames: &[String],
    ) -> Result<()> {
        self.record(Call::BulkDelete(filenames.to_vec()));
        self.check("bulk_delete_items")?;
        self.with_items(content_type, |items| {
            items.retain(|item| !filenames.contains(&item.filename))
        });
        Ok(())
    }

    async fn get_active_account(&self) -> Result<Option<Account>> {
        self.record(Call::ActiveAccount);
        self.check("get_active_account")?;
        Ok(self.account.lock().unwrap().clone())
    }

    async fn begin_device_login(&self) -> Result<DeviceCodeFlow> {
        self.record(Call::BeginLogin);
        self.check("begin_device_login")?;
        Ok(DeviceCodeFlow {
            device_code: "device-123".to_string(),
            user_code: "ABCD-EFGH".to_string(),
            verification_uri: "https://microsoft.com/link".to_string(),
            interval: *self.login_interval.lock().unwrap(),
            expires_in: *self.login_expires_in.lock().unwrap(),
        })
    }

    async fn poll_device_login(&self, device_code: &str) -> Result<Option<Account>> {
        self.record(Call::PollLogin(device_code.to_string()));
        let step = self.login_steps.lock().unwrap().pop_front();
        match step.unwrap_or(LoginStep::Pending) {
            LoginStep::Pending => Ok(None),
            LoginStep::Success(account) => Ok(Some(account)),
            LoginStep::Fail(message) => Err(AppError::LoginFailed(message)),
        }
    }

    async fn get_game_version_catalog(&self) -> Result<Vec<GameVersion>> {
        self.record(Call::VersionCatalog);
        self.check("get_game_version_catalog")?;
        Ok(self.versions.lock().unwrap().clone())
    }

    async fn get_profile_logs(&self, _profile_id: Uuid, log_type: LogType) -> Result<String> {
        self.record(Call::Logs(log_type));
        self.check("get_profile_logs")?;
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn update_profile(&self, profile_id: Uuid, update: &ProfileUpdate) -> Result<Profile> {
        self.record(Call::UpdateProfile);
        self.check("update_profile")?;
        let mut profile = Profile::new("Updated", "1.21.1", ModLoader::Vanilla);
        profile.id = profile_id;
        profile.apply_update(update.clone());
        Ok(profile)
    }
}

pub fn installed(filename: &str, mod_id: Option<&str>, name: Option<&str>) -> InstalledItem {
    InstalledItem {
        filename: filename.to_string(),
        mod_id: mod_id.map(str::to_string),
        name: name.map(str::to_string),
        ..Default::default()
    }
}

pub fn catalog(id: &str, slug: &str, name: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn account(username: &str) -> Account {
    Account {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        is_microsoft: true,
    }
}

/// Config held in memory only; nothing is written unless a test saves it.
pub fn in_memory_config() -> Arc<ConfigManager> {
    Arc::new(ConfigManager::new(PathBuf::from("target/test-config/unused.json")))
}

pub fn session(backend: &Arc<MockBackend>) -> SyncSession {
    let backend: Arc<dyn LauncherBackend> = backend.clone();
    SyncSession::new(backend, in_memory_config())
}

/// Session whose config is persisted in a temporary directory. Keep the
/// returned guard alive for the duration of the test.
pub async fn session_with_config(
    backend: &Arc<MockBackend>,
    config: SyncConfig,
) -> (SyncSession, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(ConfigManager::new(dir.path().join("content_sync_config.json")));
    manager.set_config(config).await.unwrap();

    let backend: Arc<dyn LauncherBackend> = backend.clone();
    (SyncSession::new(backend, manager), dir)
}
