use crate::error::{AppError, Result};
use crate::integrations::backend::{CatalogItem, LauncherBackend};
use crate::minecraft::dto::version_manifest::GameVersion;
use crate::state::bulk_state::BulkOperationCoordinator;
use crate::state::config_state::ConfigManager;
use crate::state::event_state::{EventState, EventType};
use crate::state::installed_state::{CatalogEntry, InstalledListing, InstalledStateMatcher};
use crate::state::login_state::DeviceLoginManager;
use crate::state::log_state::LogViewer;
use crate::state::mods_watch_state::ModsFolderWatcher;
use crate::state::poll_state::PollSupervisor;
use crate::state::profile_state::{ActiveProfile, ModLoader, Profile, ProfileUpdate};
use crate::state::search_state::{BrowseOrigin, SearchController};
use crate::utils::profile_utils::ContentType;
use crate::utils::version_utils::filter_versions;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case", tag = "view", content = "content_type")]
pub enum View {
    #[default]
    Home,
    ProfileContent(ContentType),
    ProfileLogs,
    ContentBrowser,
    Accounts,
    Settings,
}

/// Everything one launcher window works against: the active profile, the
/// pollers and the controllers built on top of them.
pub struct SyncSession {
    backend: Arc<dyn LauncherBackend>,
    config: Arc<ConfigManager>,
    events: EventState,
    profile: ActiveProfile,
    supervisor: Arc<PollSupervisor>,
    matcher: Arc<InstalledStateMatcher>,
    listing: Arc<InstalledListing>,
    watcher: ModsFolderWatcher,
    logs: LogViewer,
    login: DeviceLoginManager,
    bulk: BulkOperationCoordinator,
    search: Arc<SearchController>,
    view: RwLock<View>,
}

impl SyncSession {
    pub fn new(backend: Arc<dyn LauncherBackend>, config: Arc<ConfigManager>) -> Self {
        info!("Initializing content sync session...");
        let events = EventState::new();
        let profile = ActiveProfile::new();
        let supervisor = Arc::new(PollSupervisor::new());

        let matcher = Arc::new(InstalledStateMatcher::new(Arc::clone(&backend), events.clone()));
        let listing = Arc::new(InstalledListing::new(
            Arc::clone(&backend),
            events.clone(),
            profile.clone(),
        ));
        let watcher = ModsFolderWatcher::new(
            Arc::clone(&backend),
            Arc::clone(&listing),
            Arc::clone(&matcher),
            profile.clone(),
            Arc::clone(&supervisor),
            Arc::clone(&config),
        );
        let logs = LogViewer::new(
            Arc::clone(&backend),
            profile.clone(),
            events.clone(),
            Arc::clone(&supervisor),
            Arc::clone(&config),
        );
        let login = DeviceLoginManager::new(
            Arc::clone(&backend),
            events.clone(),
            Arc::clone(&supervisor),
            Arc::clone(&config),
        );
        let bulk = BulkOperationCoordinator::new(
            Arc::clone(&backend),
            Arc::clone(&listing),
            Arc::clone(&matcher),
            profile.clone(),
            events.clone(),
        );
        let search = Arc::new(SearchController::new(
            Arc::clone(&backend),
            Arc::clone(&matcher),
            events.clone(),
            Arc::clone(&config),
        ));

        Self {
            backend,
            config,
            events,
            profile,
            supervisor,
            matcher,
            listing,
            watcher,
            logs,
            login,
            bulk,
            search,
            view: RwLock::new(View::Home),
        }
    }

    pub fn events(&self) -> &EventState {
        &self.events
    }

    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    pub fn active_profile(&self) -> &ActiveProfile {
        &self.profile
    }

    pub fn supervisor(&self) -> &Arc<PollSupervisor> {
        &self.supervisor
    }

    pub fn matcher(&self) -> &Arc<InstalledStateMatcher> {
        &self.matcher
    }

    pub fn listing(&self) -> &Arc<InstalledListing> {
        &self.listing
    }

    pub fn watcher(&self) -> &ModsFolderWatcher {
        &self.watcher
    }

    pub fn logs(&self) -> &LogViewer {
        &self.logs
    }

    pub fn login(&self) -> &DeviceLoginManager {
        &self.login
    }

    pub fn bulk(&self) -> &BulkOperationCoordinator {
        &self.bulk
    }

    pub fn search(&self) -> &Arc<SearchController> {
        &self.search
    }

    pub async fn view(&self) -> View {
        *self.view.read().await
    }

    /// Switches the profile everything works against. View pollers restart
    /// against the new profile; the listing and installed state are rebuilt.
    pub async fn set_active_profile(&self, profile: Option<Profile>) -> Result<()> {
        self.watcher.stop();
        self.logs.close().await;

        let profile_id = profile.as_ref().map(|p| p.id);
        match &profile {
            Some(p) => info!("Active profile is now '{}' ({})", p.name, p.id),
            None => info!("Active profile cleared"),
        }
        self.profile.replace(profile).await;

        self.bulk.clear_selection().await;
        self.listing.clear().await;
        let reloaded = self.listing.reload().await;
        self.matcher.refresh_all(profile_id).await;

        if matches!(self.view().await, View::ProfileContent(_)) && profile_id.is_some() {
            self.watcher.start().await;
        }
        reloaded
    }

    pub async fn update_active_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        let profile_id = self.profile.require_id().await?;
        if update.is_empty() {
            return self.profile.get().await.ok_or(AppError::NoActiveProfile);
        }

        let updated = self.backend.update_profile(profile_id, &update).await?;
        debug!("Profile {} updated", profile_id);
        self.profile.replace(Some(updated.clone())).await;
        Ok(updated)
    }

    /// Moves to `view`, stopping pollers that belong to the view being left.
    /// Only installable content types have a profile content view.
    pub async fn navigate(&self, view: View) -> Result<()> {
        if let View::ProfileContent(content_type) = view {
            if !content_type.installable() {
                return Err(AppError::InvalidInput(format!(
                    "{} has no installed listing",
                    content_type
                )));
            }
        }

        let previous = std::mem::replace(&mut *self.view.write().await, view);
        debug!("Navigating from {:?} to {:?}", previous, view);

        if matches!(previous, View::ProfileContent(_)) {
            self.watcher.stop();
        }
        if previous == View::ProfileLogs && view != View::ProfileLogs {
            self.logs.close().await;
        }

        if let View::ProfileContent(content_type) = view {
            if self.listing.set_content_type(content_type).await {
                self.bulk.clear_selection().await;
            }
            let reloaded = self.listing.reload().await;
            if self.profile.id().await.is_some() {
                self.watcher.start().await;
            }
            reloaded?;
        }
        Ok(())
    }

    pub async fn open_content_browser(
        &self,
        origin: BrowseOrigin,
        content_type: ContentType,
    ) -> Result<Vec<CatalogEntry>> {
        let active = self.profile.get().await;
        if origin == BrowseOrigin::Profile && active.is_none() {
            return Err(AppError::NoActiveProfile);
        }

        self.navigate(View::ContentBrowser).await?;
        self.matcher.refresh_all(active.as_ref().map(|p| p.id)).await;

        match (origin, active) {
            (BrowseOrigin::Profile, Some(profile)) => {
                self.search.enter_from_profile(&profile, content_type).await
            }
            _ => self.search.enter_from_main_menu(content_type).await,
        }
    }

    pub async fn install(
        &self,
        item: &CatalogItem,
        version_id: Option<&str>,
        content_type: ContentType,
    ) -> Result<()> {
        let profile_id = self.profile.require_id().await?;
        info!(
            "Installing {} '{}' from {:?} into profile {}",
            content_type, item.slug, item.source, profile_id
        );

        if let Err(e) = self
            .backend
            .install_item(profile_id, &item.id, version_id, item.source)
            .await
        {
            error!("Install of '{}' failed: {}", item.slug, e);
            self.events
                .error(Some(profile_id), format!("Failed to install {}", item.name), &e);
            return Err(e);
        }

        self.matcher.refresh(Some(profile_id), content_type).await;
        self.search.refresh_installed_flags().await;
        if self.listing.content_type().await == content_type {
            if let Err(e) = self.listing.reload().await {
                warn!("Listing reload after install failed: {}", e);
            }
        }

        self.events.emit_simple(
            EventType::ContentInstalled,
            Some(profile_id),
            format!("Installed {}", item.name),
        );
        Ok(())
    }

    pub async fn toggle_item(&self, filename: &str, enable: bool) -> Result<()> {
        let profile_id = self.profile.require_id().await?;
        let content_type = self.listing.content_type().await;

        if let Err(e) = self
            .backend
            .toggle_item(profile_id, content_type, filename, enable)
            .await
        {
            error!("Toggle of '{}' failed: {}", filename, e);
            self.events
                .error(Some(profile_id), format!("Failed to toggle {}", filename), &e);
            return Err(e);
        }
        self.listing.reload().await
    }

    pub async fn delete_item(&self, filename: &str) -> Result<()> {
        let profile_id = self.profile.require_id().await?;
        let content_type = self.listing.content_type().await;

        if let Err(e) = self.backend.delete_item(profile_id, content_type, filename).await {
            error!("Delete of '{}' failed: {}", filename, e);
            self.events
                .error(Some(profile_id), format!("Failed to delete {}", filename), &e);
            return Err(e);
        }

        self.matcher.refresh(Some(profile_id), content_type).await;
        self.search.refresh_installed_flags().await;
        self.listing.reload().await
    }

    /// Game versions selectable for a profile using `loader`.
    pub async fn filter_game_versions(&self, loader: ModLoader) -> Result<Vec<GameVersion>> {
        let all = self.backend.get_game_version_catalog().await?;
        let config = self.config.get_config().await;
        let versions = filter_versions(
            &all,
            loader,
            config.include_snapshots,
            &config.version_policy(),
        );
        debug!(
            "{} of {} game versions usable with {}",
            versions.len(),
            all.len(),
            loader
        );
        Ok(versions)
    }

    pub async fn shutdown(&self) {
        info!("Shutting down content sync session");
        self.login.cancel_login().await;
        self.supervisor.stop_all();
    }
}
