use crate::error::{AppError, Result};
use crate::integrations::backend::{Account, DeviceCodeFlow, LauncherBackend};
use crate::state::config_state::ConfigManager;
use crate::state::event_state::{EventState, EventType};
use crate::state::poll_state::{PollSupervisor, PollerKey, TickOutcome};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A device-code login the user is currently completing in their browser.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceLoginSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub interval_secs: u64,
    pub started_at: DateTime<Utc>,
    /// Seconds after which polling gives up.
    pub max_duration_secs: u64,
    #[serde(skip_serializing)]
    deadline: Instant,
}

impl DeviceLoginSession {
    fn from_flow(flow: DeviceCodeFlow, default_interval: u64, max_duration: u64) -> Self {
        let interval_secs = if flow.interval == 0 {
            default_interval.max(1)
        } else {
            flow.interval
        };
        let max_duration_secs = flow
            .expires_in
            .map_or(max_duration, |expires_in| expires_in.min(max_duration));

        Self {
            device_code: flow.device_code,
            user_code: flow.user_code,
            verification_uri: flow.verification_uri,
            interval_secs,
            started_at: Utc::now(),
            max_duration_secs,
            deadline: Instant::now() + Duration::from_secs(max_duration_secs),
        }
    }
}

#[derive(Clone)]
struct LoginPoller {
    backend: Arc<dyn LauncherBackend>,
    events: EventState,
    session: Arc<RwLock<Option<DeviceLoginSession>>>,
    account: Arc<RwLock<Option<Account>>>,
}

impl LoginPoller {
    /// Clears the session if it still belongs to `device_code`. Returns whether
    /// it did, so a cancelled or replaced login is never finished twice.
    async fn take_session(&self, device_code: &str) -> bool {
        let mut session = self.session.write().await;
        match session.as_ref() {
            Some(current) if current.device_code == device_code => {
                *session = None;
                true
            }
            _ => false,
        }
    }

    async fn tick(&self, device_code: &str) -> TickOutcome {
        let deadline = match self.session.read().await.as_ref() {
            Some(current) if current.device_code == device_code => {
                (current.deadline, current.max_duration_secs)
            }
            _ => return TickOutcome::Stop,
        };

        if Instant::now() >= deadline.0 {
            if self.take_session(device_code).await {
                let err = AppError::LoginTimedOut(deadline.1);
                warn!("{}", err);
                self.events.error(None, "Login timed out", &err);
                self.events
                    .emit_simple(EventType::LoginClosed, None, "Login dialog closed");
            }
            return TickOutcome::Stop;
        }

        match self.backend.poll_device_login(device_code).await {
            Ok(Some(account)) => {
                if self.take_session(device_code).await {
                    info!("Device login completed for {}", account.username);
                    let message = format!("Logged in as {}", account.username);
                    *self.account.write().await = Some(account);
                    self.events.emit_simple(EventType::AccountLogin, None, message);
                    self.events
                        .emit_simple(EventType::LoginClosed, None, "Login dialog closed");
                }
                TickOutcome::Stop
            }
            Ok(None) => {
                debug!("Device login still pending");
                TickOutcome::Continue
            }
            Err(e) => {
                if self.take_session(device_code).await {
                    error!("Device login failed: {}", e);
                    self.events.error(None, "Login failed", &e);
                    self.events
                        .emit_simple(EventType::LoginClosed, None, "Login dialog closed");
                }
                TickOutcome::Stop
            }
        }
    }
}

/// Drives the device-code account login and holds the active account.
pub struct DeviceLoginManager {
    poller: LoginPoller,
    supervisor: Arc<PollSupervisor>,
    config: Arc<ConfigManager>,
}

impl DeviceLoginManager {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        events: EventState,
        supervisor: Arc<PollSupervisor>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            poller: LoginPoller {
                backend,
                events,
                session: Arc::new(RwLock::new(None)),
                account: Arc::new(RwLock::new(None)),
            },
            supervisor,
            config,
        }
    }

    /// Requests a device code and starts polling for its completion. A login
    /// already in progress is cancelled first.
    pub async fn begin_login(&self) -> Result<DeviceLoginSession> {
        self.cancel_login().await;

        let flow = match self.poller.backend.begin_device_login().await {
            Ok(flow) => flow,
            Err(e) => {
                error!("Could not start device login: {}", e);
                self.poller.events.error(None, "Could not start login", &e);
                return Err(e);
            }
        };

        let config = self.config.get_config().await;
        let session = DeviceLoginSession::from_flow(
            flow,
            config.login_default_interval_secs,
            config.login_max_duration_secs,
        );
        info!(
            "Device login started: code {} at {}, polling every {}s for at most {}s",
            session.user_code,
            session.verification_uri,
            session.interval_secs,
            session.max_duration_secs
        );

        *self.poller.session.write().await = Some(session.clone());
        self.poller.events.emit_simple(
            EventType::LoginStarted,
            None,
            format!("Enter {} at {}", session.user_code, session.verification_uri),
        );

        let poller = self.poller.clone();
        let device_code = session.device_code.clone();
        self.supervisor.start(
            PollerKey::LoginPoll,
            Duration::from_secs(session.interval_secs),
            move |_tick| {
                let poller = poller.clone();
                let device_code = device_code.clone();
                async move { poller.tick(&device_code).await }
            },
        );

        Ok(session)
    }

    /// Abandons the pending login without contacting the backend.
    pub async fn cancel_login(&self) {
        self.supervisor.stop(PollerKey::LoginPoll);
        if self.poller.session.write().await.take().is_some() {
            info!("Device login cancelled");
            self.poller
                .events
                .emit_simple(EventType::LoginClosed, None, "Login dialog closed");
        }
    }

    pub async fn current_login(&self) -> Option<DeviceLoginSession> {
        self.poller.session.read().await.clone()
    }

    pub async fn is_login_pending(&self) -> bool {
        self.poller.session.read().await.is_some()
    }

    pub async fn load_active_account(&self) -> Result<Option<Account>> {
        let account = self.poller.backend.get_active_account().await?;
        *self.poller.account.write().await = account.clone();
        Ok(account)
    }

    pub async fn active_account(&self) -> Option<Account> {
        self.poller.account.read().await.clone()
    }
}
