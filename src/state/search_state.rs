use crate::error::Result;
use crate::integrations::backend::{CatalogQuery, LauncherBackend, SortBy};
use crate::state::config_state::ConfigManager;
use crate::state::event_state::{EventState, EventType};
use crate::state::installed_state::{CatalogEntry, InstalledStateMatcher};
use crate::state::profile_state::Profile;
use crate::utils::profile_utils::{derive_defaults, reset_to_default, ContentType, FilterDefaults};
use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Where the content browser was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrowseOrigin {
    Profile,
    #[default]
    MainMenu,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterState {
    pub content_type: ContentType,
    pub origin: BrowseOrigin,
    /// Empty means any version.
    pub version: String,
    /// Empty means any loader.
    pub loader: String,
    pub categories: Vec<String>,
    pub sort_by: SortBy,
    pub query: String,
    pub page: u32,
    pub loader_filter_visible: bool,
}

impl FilterState {
    fn seeded(content_type: ContentType, origin: BrowseOrigin, defaults: FilterDefaults) -> Self {
        Self {
            content_type,
            origin,
            version: defaults.version,
            loader: defaults.loader,
            categories: Vec::new(),
            sort_by: SortBy::default(),
            query: String::new(),
            page: 0,
            loader_filter_visible: content_type.loader_applies(),
        }
    }

    fn to_query(&self, page_size: u32) -> CatalogQuery {
        // Relevance has nothing to rank on without a query
        let sort_by = if self.query.is_empty() && self.sort_by == SortBy::Relevance {
            SortBy::Downloads
        } else {
            self.sort_by
        };

        CatalogQuery {
            query: self.query.clone(),
            content_type: self.content_type,
            game_version: Some(self.version.clone()).filter(|v| !v.is_empty()),
            loader: Some(self.loader.clone())
                .filter(|l| !l.is_empty() && self.content_type.loader_applies()),
            categories: self.categories.clone(),
            sort_by,
            offset: self.page.saturating_mul(page_size),
            limit: page_size,
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::seeded(ContentType::Mod, BrowseOrigin::MainMenu, reset_to_default())
    }
}

/// Filters, paging and debounced query input of the content browser.
pub struct SearchController {
    backend: Arc<dyn LauncherBackend>,
    matcher: Arc<InstalledStateMatcher>,
    events: EventState,
    config: Arc<ConfigManager>,
    filters: RwLock<FilterState>,
    /// Profile the browser was entered from.
    source_profile: RwLock<Option<Profile>>,
    results: RwLock<Vec<CatalogEntry>>,
    debounce_generation: AtomicU64,
    request_seq: AtomicU64,
}

impl SearchController {
    pub fn new(
        backend: Arc<dyn LauncherBackend>,
        matcher: Arc<InstalledStateMatcher>,
        events: EventState,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            backend,
            matcher,
            events,
            config,
            filters: RwLock::new(FilterState::default()),
            source_profile: RwLock::new(None),
            results: RwLock::new(Vec::new()),
            debounce_generation: AtomicU64::new(0),
            request_seq: AtomicU64::new(0),
        }
    }

    pub async fn filter_state(&self) -> FilterState {
        self.filters.read().await.clone()
    }

    pub async fn results(&self) -> Vec<CatalogEntry> {
        self.results.read().await.clone()
    }

    pub async fn loader_filter_visible(&self) -> bool {
        self.filters.read().await.loader_filter_visible
    }

    pub async fn enter_from_profile(
        &self,
        profile: &Profile,
        content_type: ContentType,
    ) -> Result<Vec<CatalogEntry>> {
        info!(
            "Opening content browser for profile '{}' ({} {})",
            profile.name, profile.loader.loader, profile.game_version
        );
        *self.source_profile.write().await = Some(profile.clone());
        *self.filters.write().await = FilterState::seeded(
            content_type,
            BrowseOrigin::Profile,
            derive_defaults(profile, content_type),
        );
        self.load_popular(0).await
    }

    pub async fn enter_from_main_menu(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<CatalogEntry>> {
        info!("Opening content browser from main menu");
        *self.source_profile.write().await = None;
        *self.filters.write().await =
            FilterState::seeded(content_type, BrowseOrigin::MainMenu, reset_to_default());
        self.load_popular(0).await
    }

    /// Queries shorter than the configured minimum fall back to the popular list.
    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<CatalogEntry>> {
        let query = query.trim();
        let min_len = self.config.get_config().await.search_min_query_len;
        if query.chars().count() < min_len {
            return self.load_popular(page).await;
        }

        {
            let mut filters = self.filters.write().await;
            filters.query = query.to_string();
            filters.page = page;
        }
        self.run_query().await
    }

    pub async fn load_popular(&self, page: u32) -> Result<Vec<CatalogEntry>> {
        {
            let mut filters = self.filters.write().await;
            filters.query.clear();
            filters.page = page;
        }
        self.run_query().await
    }

    pub async fn next_page(&self) -> Result<Vec<CatalogEntry>> {
        let (query, page) = self.position().await;
        self.search(&query, page.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<Vec<CatalogEntry>> {
        let (query, page) = self.position().await;
        self.search(&query, page.saturating_sub(1)).await
    }

    /// Resets query, page and categories for the new type and shows its
    /// popular list. Version and loader are derived again from the source
    /// profile, or stay empty when browsing from the main menu.
    pub async fn switch_content_type(
        &self,
        content_type: ContentType,
    ) -> Result<Vec<CatalogEntry>> {
        self.cancel_pending_input();

        let profile = self.source_profile.read().await.clone();
        {
            let mut filters = self.filters.write().await;
            let origin = filters.origin;
            let defaults = match (&profile, origin) {
                (Some(profile), BrowseOrigin::Profile) => derive_defaults(profile, content_type),
                _ => reset_to_default(),
            };
            *filters = FilterState::seeded(content_type, origin, defaults);
        }
        debug!("Content browser switched to {}", content_type);
        self.load_popular(0).await
    }

    pub async fn set_version(&self, version: impl Into<String>) -> Result<Vec<CatalogEntry>> {
        self.filters.write().await.version = version.into();
        self.replay_first_page().await
    }

    pub async fn set_loader(&self, loader: impl Into<String>) -> Result<Vec<CatalogEntry>> {
        self.filters.write().await.loader = loader.into();
        self.replay_first_page().await
    }

    pub async fn set_categories(&self, categories: Vec<String>) -> Result<Vec<CatalogEntry>> {
        self.filters.write().await.categories = categories;
        self.replay_first_page().await
    }

    pub async fn set_sort(&self, sort_by: SortBy) -> Result<Vec<CatalogEntry>> {
        self.filters.write().await.sort_by = sort_by;
        self.replay_first_page().await
    }

    /// Searches for `text` once typing has paused for the debounce period.
    /// Every keystroke supersedes the previous pending search.
    pub fn on_query_input(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let generation = self.debounce_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let controller = Arc::clone(self);

        tokio::spawn(async move {
            let delay = controller.config.get_config().await.search_debounce();
            tokio::time::sleep(delay).await;

            if controller.debounce_generation.load(Ordering::SeqCst) != generation {
                trace!("Query input '{}' superseded", text);
                return;
            }
            if let Err(e) = controller.search(&text, 0).await {
                debug!("Debounced search for '{}' failed: {}", text, e);
            }
        })
    }

    /// Re-evaluates the installed badge of the stored results, e.g. after an
    /// install or delete.
    pub async fn refresh_installed_flags(&self) {
        let content_type = self.filters.read().await.content_type;
        let count = {
            let mut results = self.results.write().await;
            for entry in results.iter_mut() {
                entry.installed = self.matcher.is_installed(&entry.item, content_type);
            }
            results.len()
        };
        self.events.emit_simple(
            EventType::SearchResultsUpdated,
            None,
            format!("{} results", count),
        );
    }

    fn cancel_pending_input(&self) {
        self.debounce_generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn position(&self) -> (String, u32) {
        let filters = self.filters.read().await;
        (filters.query.clone(), filters.page)
    }

    async fn replay_first_page(&self) -> Result<Vec<CatalogEntry>> {
        let (query, _) = self.position().await;
        self.search(&query, 0).await
    }

    async fn run_query(&self) -> Result<Vec<CatalogEntry>> {
        let page_size = self.config.get_config().await.search_page_size;
        let query = self.filters.read().await.to_query(page_size);
        let seq = self.request_seq.fetch_add(1, Ordering::SeqCst) + 1;

        debug!(
            "Searching {} '{}' (version {:?}, loader {:?}, offset {})",
            query.content_type, query.query, query.game_version, query.loader, query.offset
        );

        let items = match self.backend.search_catalog(&query).await {
            Ok(items) => items,
            Err(e) => {
                error!("Catalog search failed: {}", e);
                self.events.error(None, "Search failed", &e);
                return Err(e);
            }
        };

        let entries = self.matcher.annotate(items, query.content_type);
        // A newer request was issued while this one was in flight
        if self.request_seq.load(Ordering::SeqCst) != seq {
            trace!("Dropping stale search response #{}", seq);
            return Ok(entries);
        }

        *self.results.write().await = entries.clone();
        self.events.emit_simple(
            EventType::SearchResultsUpdated,
            None,
            format!("{} results", entries.len()),
        );
        Ok(entries)
    }
}
