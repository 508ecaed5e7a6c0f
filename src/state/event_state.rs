use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    InstalledListReloaded,
    InstalledStateRefreshed,
    SearchResultsUpdated,
    LogContentUpdated,
    LoginStarted,
    AccountLogin,
    LoginClosed,
    ContentInstalled,
    BulkActionCompleted,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct EventPayload {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub target_id: Option<Uuid>,
    pub message: String,
    pub error: Option<String>,
}

impl EventPayload {
    pub fn new(event_type: EventType, target_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            target_id,
            message: message.into(),
            error: None,
        }
    }
}

/// Fan-out of state events to whichever views are listening.
#[derive(Clone)]
pub struct EventState {
    sender: broadcast::Sender<EventPayload>,
}

impl Default for EventState {
    fn default() -> Self {
        Self::new()
    }
}

impl EventState {
    pub fn new() -> Self {
        info!("Initializing EventState...");
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventPayload> {
        self.sender.subscribe()
    }

    pub fn emit(&self, payload: EventPayload) {
        debug!("Emitting {:?}: {}", payload.event_type, payload.message);
        // No receivers just means no view is open
        let _ = self.sender.send(payload);
    }

    pub fn emit_simple(
        &self,
        event_type: EventType,
        target_id: Option<Uuid>,
        message: impl Into<String>,
    ) {
        self.emit(EventPayload::new(event_type, target_id, message));
    }

    pub fn warn(&self, target_id: Option<Uuid>, message: impl Into<String>) {
        self.emit(EventPayload::new(EventType::Warning, target_id, message));
    }

    pub fn error(&self, target_id: Option<Uuid>, message: impl Into<String>, error: impl ToString) {
        let mut payload = EventPayload::new(EventType::Error, target_id, message);
        payload.error = Some(error.to_string());
        self.emit(payload);
    }
}
