use crate::error::Result;
use crate::integrations::backend::{LauncherBackend, LogType};
use crate::state::config_state::ConfigManager;
use crate::state::event_state::{EventState, EventType};
use crate::state::poll_state::{PollSupervisor, PollerKey, TickOutcome};
use crate::state::profile_state::ActiveProfile;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct LogView {
    log_type: LogType,
    content: String,
    active: bool,
    auto_refresh: bool,
}

/// Handles that a refresh needs, cloneable into the poll body.
#[derive(Clone)]
struct LogLoader {
    backend: Arc<dyn LauncherBackend>,
    profile: ActiveProfile,
    events: EventState,
    view: Arc<RwLock<LogView>>,
}

impl LogLoader {
    async fn load(&self) -> Result<String> {
        let profile_id = self.profile.require_id().await?;
        let log_type = self.view.read().await.log_type;

        let content = self.backend.get_profile_logs(profile_id, log_type).await?;
        debug!(
            "Loaded {} log for profile {} ({} bytes)",
            log_type.as_str(),
            profile_id,
            content.len()
        );

        self.view.write().await.content = content.clone();
        self.events.emit_simple(
            EventType::LogContentUpdated,
            Some(profile_id),
            format!("{} log updated", log_type.as_str()),
        );
        Ok(content)
    }
}

pub struct LogViewer {
    loader: LogLoader,
    supervisor: Arc<PollSupervisor>,
    config: Arc<ConfigManager>,
}

impl LogViewer {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        profile: ActiveProfile,
        events: EventState,
        supervisor: Arc<PollSupervisor>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            loader: LogLoader {
                backend,
                profile,
                events,
                view: Arc::new(RwLock::new(LogView::default())),
            },
            supervisor,
            config,
        }
    }

    /// Shows `log_type` and loads it once. Keeps auto refresh as it was.
    pub async fn open(&self, log_type: LogType) -> Result<String> {
        let auto_refresh = {
            let mut view = self.loader.view.write().await;
            view.log_type = log_type;
            view.active = true;
            view.auto_refresh
        };

        let content = self.loader.load().await?;
        if auto_refresh {
            self.start_refresh().await;
        }
        Ok(content)
    }

    pub async fn close(&self) {
        self.loader.view.write().await.active = false;
        self.supervisor.stop(PollerKey::LogsRefresh);
    }

    pub async fn reload(&self) -> Result<String> {
        self.loader.load().await
    }

    pub async fn set_auto_refresh(&self, enabled: bool) {
        let active = {
            let mut view = self.loader.view.write().await;
            view.auto_refresh = enabled;
            view.active
        };

        if enabled && active {
            self.start_refresh().await;
        } else {
            self.supervisor.stop(PollerKey::LogsRefresh);
        }
    }

    pub async fn content(&self) -> String {
        self.loader.view.read().await.content.clone()
    }

    pub async fn log_type(&self) -> LogType {
        self.loader.view.read().await.log_type
    }

    pub async fn is_active(&self) -> bool {
        self.loader.view.read().await.active
    }

    pub async fn auto_refresh(&self) -> bool {
        self.loader.view.read().await.auto_refresh
    }

    async fn start_refresh(&self) {
        let every = self.config.get_config().await.logs_refresh_interval();
        let loader = self.loader.clone();

        self.supervisor.start(PollerKey::LogsRefresh, every, move |_tick| {
            let loader = loader.clone();
            async move {
                if !loader.view.read().await.active {
                    return TickOutcome::Continue;
                }
                if let Err(e) = loader.load().await {
                    warn!("Log refresh failed, keeping previous content: {}", e);
                }
                TickOutcome::Continue
            }
        });
    }
}
