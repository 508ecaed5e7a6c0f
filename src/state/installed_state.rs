use crate::error::Result;
use crate::integrations::backend::{CatalogItem, InstalledItem, LauncherBackend};
use crate::state::event_state::{EventState, EventType};
use crate::state::profile_state::ActiveProfile;
use crate::utils::identity_utils::identity_tokens;
use crate::utils::profile_utils::ContentType;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A catalog search hit together with its installed badge.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogEntry {
    pub item: CatalogItem,
    pub installed: bool,
}

/// Deterministic summary of a listing: `filename:disabled` pairs, sorted.
pub fn listing_fingerprint(items: &[InstalledItem]) -> String {
    let mut pairs: Vec<String> = items
        .iter()
        .map(|item| format!("{}:{}", item.filename, item.disabled))
        .collect();
    pairs.sort();
    pairs.join("|")
}

/// Answers "is this catalog item already installed in the active profile".
pub struct InstalledStateMatcher {
    backend: Arc<dyn LauncherBackend>,
    events: EventState,
    tokens: DashMap<ContentType, HashSet<String>>,
}

impl InstalledStateMatcher {
    pub fn new(backend: Arc<dyn LauncherBackend>, events: EventState) -> Self {
        Self {
            backend,
            events,
            tokens: DashMap::new(),
        }
    }

    /// Rebuilds the token set for `content_type`. Without a profile, or when
    /// the backend fails, the set is left empty.
    pub async fn refresh(&self, profile_id: Option<Uuid>, content_type: ContentType) {
        self.tokens.insert(content_type, HashSet::new());

        let Some(profile_id) = profile_id else {
            debug!("No active profile, installed set for {} stays empty", content_type);
            return;
        };

        match self.backend.list_installed_items(profile_id, content_type).await {
            Ok(items) => {
                let tokens: HashSet<String> = items.iter().flat_map(identity_tokens).collect();
                info!(
                    "Installed set for {} in profile {}: {} items, {} tokens",
                    content_type,
                    profile_id,
                    items.len(),
                    tokens.len()
                );
                self.tokens.insert(content_type, tokens);
                self.events.emit_simple(
                    EventType::InstalledStateRefreshed,
                    Some(profile_id),
                    format!("Installed state for {} refreshed", content_type),
                );
            }
            Err(e) => {
                error!(
                    "Failed to list installed {} for profile {}: {}",
                    content_type, profile_id, e
                );
            }
        }
    }

    pub async fn refresh_all(&self, profile_id: Option<Uuid>) {
        let refreshes = ContentType::INSTALLABLE
            .into_iter()
            .map(|content_type| self.refresh(profile_id, content_type));
        futures::future::join_all(refreshes).await;
    }

    pub fn is_installed(&self, item: &CatalogItem, content_type: ContentType) -> bool {
        let Some(stored) = self.tokens.get(&content_type) else {
            return false;
        };

        let hit = identity_tokens(item).into_iter().find(|token| stored.contains(token));
        if let Some(token) = &hit {
            debug!(
                "Catalog item '{}' matched installed {} via token '{}'",
                item.slug, content_type, token
            );
        }
        hit.is_some()
    }

    pub fn annotate(
        &self,
        items: Vec<CatalogItem>,
        content_type: ContentType,
    ) -> Vec<CatalogEntry> {
        items
            .into_iter()
            .map(|item| {
                let installed = self.is_installed(&item, content_type);
                CatalogEntry { item, installed }
            })
            .collect()
    }

    pub fn clear(&self) {
        self.tokens.clear();
    }
}

/// The installed items shown for the active profile's current content tab.
pub struct InstalledListing {
    backend: Arc<dyn LauncherBackend>,
    events: EventState,
    profile: ActiveProfile,
    content_type: RwLock<ContentType>,
    items: RwLock<Vec<InstalledItem>>,
}

impl InstalledListing {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        events: EventState,
        profile: ActiveProfile,
    ) -> Self {
        Self {
            backend,
            events,
            profile,
            content_type: RwLock::new(ContentType::Mod),
            items: RwLock::new(Vec::new()),
        }
    }

    pub async fn content_type(&self) -> ContentType {
        *self.content_type.read().await
    }

    /// Switches the listed content type; returns whether it changed.
    pub async fn set_content_type(&self, content_type: ContentType) -> bool {
        let mut current = self.content_type.write().await;
        if *current == content_type {
            return false;
        }
        *current = content_type;
        self.items.write().await.clear();
        true
    }

    pub async fn items(&self) -> Vec<InstalledItem> {
        self.items.read().await.clone()
    }

    pub async fn filenames(&self) -> Vec<String> {
        self.items
            .read()
            .await
            .iter()
            .map(|item| item.filename.clone())
            .collect()
    }

    pub async fn fingerprint(&self) -> String {
        listing_fingerprint(&self.items.read().await)
    }

    /// Filenames the backend flagged with a newer version available, sorted.
    pub async fn updates_available(&self) -> Vec<String> {
        let mut filenames: Vec<String> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.has_update)
            .map(|item| item.filename.clone())
            .collect();
        filenames.sort();
        filenames
    }

    pub async fn update_count(&self) -> usize {
        self.items.read().await.iter().filter(|item| item.has_update).count()
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    /// Replaces the items with a fresh backend listing. On failure the last
    /// good listing is kept.
    pub async fn reload(&self) -> Result<()> {
        let content_type = self.content_type().await;
        let Some(profile_id) = self.profile.id().await else {
            self.clear().await;
            return Ok(());
        };

        match self.backend.list_installed_items(profile_id, content_type).await {
            Ok(items) => {
                debug!(
                    "Reloaded {} installed {} for profile {}",
                    items.len(),
                    content_type,
                    profile_id
                );
                *self.items.write().await = items;
                self.events.emit_simple(
                    EventType::InstalledListReloaded,
                    Some(profile_id),
                    format!("Installed {} reloaded", content_type),
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Keeping previous {} listing for profile {}: {}",
                    content_type, profile_id, e
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(filename: &str, disabled: bool) -> InstalledItem {
        InstalledItem {
            filename: filename.to_string(),
            disabled,
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        let a = vec![item("b.jar", false), item("a.jar", true)];
        let b = vec![item("a.jar", true), item("b.jar", false)];
        assert_eq!(listing_fingerprint(&a), listing_fingerprint(&b));
        assert_eq!(listing_fingerprint(&a), "a.jar:true|b.jar:false");
    }

    #[test]
    fn test_fingerprint_tracks_disabled_flag() {
        let before = vec![item("sodium.jar", false)];
        let after = vec![item("sodium.jar", true)];
        assert_ne!(listing_fingerprint(&before), listing_fingerprint(&after));
    }
}
