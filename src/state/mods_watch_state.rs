use crate::integrations::backend::LauncherBackend;
use crate::state::config_state::ConfigManager;
use crate::state::installed_state::{listing_fingerprint, InstalledListing, InstalledStateMatcher};
use crate::state::poll_state::{PollSupervisor, PollerKey, TickOutcome};
use crate::state::profile_state::ActiveProfile;
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Reloads the installed listing and the installed-state matcher whenever the
/// profile's content folder changes underneath it (files added, removed,
/// enabled or disabled from outside).
pub struct ModsFolderWatcher {
    backend: Arc<dyn LauncherBackend>,
    listing: Arc<InstalledListing>,
    matcher: Arc<InstalledStateMatcher>,
    profile: ActiveProfile,
    supervisor: Arc<PollSupervisor>,
    config: Arc<ConfigManager>,
}

impl ModsFolderWatcher {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        listing: Arc<InstalledListing>,
        matcher: Arc<InstalledStateMatcher>,
        profile: ActiveProfile,
        supervisor: Arc<PollSupervisor>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            backend,
            listing,
            matcher,
            profile,
            supervisor,
            config,
        }
    }

    /// (Re)starts watching. The current listing seeds the fingerprint, so the
    /// first tick only reloads on an actual change.
    pub async fn start(&self) {
        let every = self.config.get_config().await.mods_watch_interval();
        let seed = self.listing.fingerprint().await;
        info!("Watching installed content every {:?}", every);

        let backend = Arc::clone(&self.backend);
        let listing = Arc::clone(&self.listing);
        let matcher = Arc::clone(&self.matcher);
        let profile = self.profile.clone();

        self.supervisor
            .start_seeded(PollerKey::ModsWatcher, every, Some(seed), move |tick| {
                let backend = Arc::clone(&backend);
                let listing = Arc::clone(&listing);
                let matcher = Arc::clone(&matcher);
                let profile = profile.clone();
                async move {
                    let Some(profile_id) = profile.id().await else {
                        return TickOutcome::Continue;
                    };
                    let content_type = listing.content_type().await;

                    let items = match backend
                        .list_installed_items(profile_id, content_type)
                        .await
                    {
                        Ok(items) => items,
                        Err(e) => {
                            trace!("Folder check skipped: {}", e);
                            return TickOutcome::Continue;
                        }
                    };

                    let current = listing_fingerprint(&items);
                    let previous = tick.replace_fingerprint(current.clone()).await;
                    if previous.as_deref() == Some(current.as_str()) {
                        return TickOutcome::Continue;
                    }

                    debug!(
                        "Installed {} changed for profile {}, reloading listing",
                        content_type, profile_id
                    );
                    if let Err(e) = listing.reload().await {
                        warn!("Listing reload after folder change failed: {}", e);
                    }
                    matcher.refresh(Some(profile_id), content_type).await;
                    TickOutcome::Continue
                }
            });
    }

    pub fn stop(&self) {
        self.supervisor.stop(PollerKey::ModsWatcher);
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.is_running(PollerKey::ModsWatcher)
    }
}
