use crate::config::HTTP_CLIENT;
use crate::error::{AppError, Result};
use crate::integrations::backend::{CatalogItem, CatalogQuery, ContentSource};
use log;
use serde::{Deserialize, Serialize};

// Base URL for Modrinth API v2
const MODRINTH_API_BASE_URL: &str = "https://api.modrinth.com/v2";

// Modrinth reports loaders as plain categories on search hits
const KNOWN_LOADERS: [&str; 5] = ["fabric", "forge", "quilt", "neoforge", "minecraft"];

// Structures for deserializing Modrinth API responses (Search)
// Based on https://docs.modrinth.com/api-spec/#tag/projects/operation/searchProjects

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModrinthSearchResponse {
    pub hits: Vec<ModrinthSearchHit>,
    pub offset: u32,
    pub limit: u32,
    pub total_hits: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModrinthSearchHit {
    pub project_id: String,
    pub project_type: String,
    pub slug: String,
    pub author: Option<String>,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(default)]
    pub display_categories: Vec<String>,
    pub client_side: String, // "required", "optional", "unsupported"
    pub server_side: String,
    pub downloads: u64,
    pub icon_url: Option<String>,
    pub latest_version: Option<String>,
}

impl From<ModrinthSearchHit> for CatalogItem {
    fn from(hit: ModrinthSearchHit) -> Self {
        let loaders = hit
            .categories
            .iter()
            .filter(|category| KNOWN_LOADERS.contains(&category.as_str()))
            .cloned()
            .collect();
        let categories = hit
            .categories
            .into_iter()
            .filter(|category| !KNOWN_LOADERS.contains(&category.as_str()))
            .collect();

        CatalogItem {
            id: hit.project_id,
            slug: hit.slug,
            name: hit.title,
            author: hit.author,
            description: hit.description,
            downloads: hit.downloads,
            categories,
            loaders,
            client_side: Some(hit.client_side),
            server_side: Some(hit.server_side),
            icon_url: hit.icon_url,
            source: ContentSource::Modrinth,
        }
    }
}

/// Builds the `facets` parameter: an AND of single-value OR groups,
/// e.g. `[["project_type:mod"],["versions:1.20.1"],["categories:fabric"]]`.
pub fn build_facets(query: &CatalogQuery) -> String {
    let mut facets: Vec<String> =
        vec![format!("project_type:{}", query.content_type.project_type())];

    if let Some(gv) = query.game_version.as_deref().filter(|gv| !gv.is_empty()) {
        facets.push(format!("versions:{}", gv));
    }
    if let Some(ld) = query.loader.as_deref().filter(|ld| !ld.is_empty()) {
        facets.push(format!("categories:{}", ld.to_lowercase()));
    }
    for category in query.categories.iter().filter(|c| !c.is_empty()) {
        facets.push(format!("categories:{}", category.to_lowercase()));
    }

    let facet_list: Vec<String> = facets.iter().map(|f| format!("[\"{}\"]", f)).collect();
    format!("[{}]", facet_list.join(","))
}

pub fn build_search_params(query: &CatalogQuery) -> Vec<(String, String)> {
    let limit = if query.limit == 0 { 20 } else { query.limit };
    vec![
        ("query".to_string(), query.query.clone()),
        ("limit".to_string(), limit.to_string()),
        ("offset".to_string(), query.offset.to_string()),
        ("index".to_string(), query.sort_by.as_str().to_string()),
        ("facets".to_string(), build_facets(query)),
    ]
}

pub struct ModrinthApi {
    base_url: String,
}

impl Default for ModrinthApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ModrinthApi {
    pub fn new() -> Self {
        Self {
            base_url: MODRINTH_API_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub async fn search_projects(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>> {
        let base_url = format!("{}/search", self.base_url);
        let params = build_search_params(query);

        let final_url = reqwest::Url::parse_with_params(&base_url, &params)
            .map_err(|e| AppError::ModrinthApi(format!("Failed to build search URL: {}", e)))?;

        log::info!("Searching Modrinth: {}", final_url);

        let response = HTTP_CLIENT
            .get(final_url)
            .send()
            .await
            .map_err(|e| AppError::ModrinthApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            log::error!("Modrinth API error ({}): {}", status, error_text);
            return Err(AppError::ModrinthApi(format!(
                "Modrinth API returned error {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<ModrinthSearchResponse>()
            .await
            .map_err(|e| AppError::ModrinthApi(format!("Failed to parse response: {}", e)))?;

        log::debug!(
            "Modrinth search returned {} of {} hits (offset {})",
            body.hits.len(),
            body.total_hits,
            body.offset
        );

        Ok(body.hits.into_iter().map(CatalogItem::from).collect())
    }
}
