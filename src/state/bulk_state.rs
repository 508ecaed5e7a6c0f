use crate::error::Result;
use crate::integrations::backend::LauncherBackend;
use crate::state::event_state::{EventState, EventType};
use crate::state::installed_state::{InstalledListing, InstalledStateMatcher};
use crate::state::profile_state::ActiveProfile;
use crate::utils::profile_utils::ContentType;
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

impl BulkAction {
    fn verb(&self) -> &'static str {
        match self {
            BulkAction::Activate => "enabled",
            BulkAction::Deactivate => "disabled",
            BulkAction::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "count")]
pub enum BulkOutcome {
    NothingSelected,
    Applied(usize),
}

#[derive(Debug, Default)]
struct Selection {
    /// Content type the filenames were picked from.
    content_type: Option<ContentType>,
    filenames: HashSet<String>,
}

/// Multi-select over the installed listing and the actions applied to it.
pub struct BulkOperationCoordinator {
    backend: Arc<dyn LauncherBackend>,
    listing: Arc<InstalledListing>,
    matcher: Arc<InstalledStateMatcher>,
    profile: ActiveProfile,
    events: EventState,
    selection: Mutex<Selection>,
}

impl BulkOperationCoordinator {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        listing: Arc<InstalledListing>,
        matcher: Arc<InstalledStateMatcher>,
        profile: ActiveProfile,
        events: EventState,
    ) -> Self {
        Self {
            backend,
            listing,
            matcher,
            profile,
            events,
            selection: Mutex::new(Selection::default()),
        }
    }

    /// Locks the selection, dropping it first if the listing moved on to
    /// another content type.
    async fn current_selection(&self) -> tokio::sync::MutexGuard<'_, Selection> {
        let content_type = self.listing.content_type().await;
        let mut selection = self.selection.lock().await;
        if selection.content_type != Some(content_type) {
            selection.filenames.clear();
            selection.content_type = Some(content_type);
        }
        selection
    }

    /// Flips `filename` in the selection; returns whether it is now selected.
    pub async fn toggle_selection(&self, filename: &str) -> bool {
        let mut selection = self.current_selection().await;
        if selection.filenames.remove(filename) {
            false
        } else {
            selection.filenames.insert(filename.to_string());
            true
        }
    }

    pub async fn select_all(&self, selected: bool) {
        let filenames = if selected {
            self.listing.filenames().await
        } else {
            Vec::new()
        };
        let mut selection = self.current_selection().await;
        selection.filenames = filenames.into_iter().collect();
    }

    /// Selected filenames, sorted.
    pub async fn selection(&self) -> Vec<String> {
        let selection = self.current_selection().await;
        let mut filenames: Vec<String> = selection.filenames.iter().cloned().collect();
        filenames.sort();
        filenames
    }

    pub async fn clear_selection(&self) {
        self.selection.lock().await.filenames.clear();
    }

    pub async fn activate(&self) -> Result<BulkOutcome> {
        self.apply(BulkAction::Activate).await
    }

    pub async fn deactivate(&self) -> Result<BulkOutcome> {
        self.apply(BulkAction::Deactivate).await
    }

    pub async fn delete(&self) -> Result<BulkOutcome> {
        self.apply(BulkAction::Delete).await
    }

    async fn apply(&self, action: BulkAction) -> Result<BulkOutcome> {
        let filenames = self.selection().await;
        let profile_id = self.profile.id().await;

        if filenames.is_empty() {
            warn!("Bulk {:?} requested with nothing selected", action);
            self.events.warn(profile_id, "No items selected");
            return Ok(BulkOutcome::NothingSelected);
        }

        let profile_id = self.profile.require_id().await?;
        let content_type = self.listing.content_type().await;
        info!(
            "Bulk {:?} of {} {} in profile {}",
            action,
            filenames.len(),
            content_type,
            profile_id
        );

        let result = match action {
            BulkAction::Activate => {
                self.backend
                    .bulk_toggle_items(profile_id, content_type, &filenames, true)
                    .await
            }
            BulkAction::Deactivate => {
                self.backend
                    .bulk_toggle_items(profile_id, content_type, &filenames, false)
                    .await
            }
            BulkAction::Delete => {
                self.backend
                    .bulk_delete_items(profile_id, content_type, &filenames)
                    .await
            }
        };

        if let Err(e) = result {
            error!("Bulk {:?} failed: {}", action, e);
            self.events.error(
                Some(profile_id),
                format!("Failed to apply action to {} items", filenames.len()),
                &e,
            );
            return Err(e);
        }

        self.clear_selection().await;
        if let Err(e) = self.listing.reload().await {
            warn!("Listing reload after bulk {:?} failed: {}", action, e);
        }
        if action == BulkAction::Delete {
            self.matcher.refresh(Some(profile_id), content_type).await;
        }

        self.events.emit_simple(
            EventType::BulkActionCompleted,
            Some(profile_id),
            format!("{} {} items", action.verb(), filenames.len()),
        );
        Ok(BulkOutcome::Applied(filenames.len()))
    }
}
