//! Fuzzy identity tokens for cross-referencing catalog entries with installed
//! files.
//!
//! Catalog metadata and local files rarely agree on one identifier, so every
//! item is reduced to a set of lowercase candidate tokens and two items are
//! considered the same when their sets intersect. Short generic first words
//! ("the", "better") can collide; tokens of two characters or less are never
//! derived from names or filenames for that reason, but false positives remain
//! possible.

use crate::integrations::backend::{CatalogItem, InstalledItem};
use std::collections::BTreeSet;

const DISABLED_SUFFIX: &str = ".disabled";
const ARCHIVE_SUFFIXES: [&str; 2] = [".jar", ".zip"];
const MIN_PARTIAL_TOKEN_LEN: usize = 3;

/// Fields an item can contribute to its identity.
pub trait IdentitySource {
    /// Explicit catalog identifiers (project id, slug).
    fn catalog_ids(&self) -> Vec<&str>;
    fn display_name(&self) -> Option<&str>;
    fn file_name(&self) -> Option<&str>;
}

impl IdentitySource for CatalogItem {
    fn catalog_ids(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.slug.as_str()]
    }

    fn display_name(&self) -> Option<&str> {
        Some(self.name.as_str())
    }

    fn file_name(&self) -> Option<&str> {
        None
    }
}

impl IdentitySource for InstalledItem {
    fn catalog_ids(&self) -> Vec<&str> {
        self.mod_id.as_deref().into_iter().collect()
    }

    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn file_name(&self) -> Option<&str> {
        Some(self.filename.as_str())
    }
}

pub fn identity_tokens(item: &impl IdentitySource) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    for id in item.catalog_ids() {
        insert_token(&mut tokens, id.trim().to_lowercase());
    }

    if let Some(name) = item.display_name() {
        name_tokens(name, &mut tokens);
    }

    if let Some(filename) = item.file_name() {
        if let Some(token) = filename_token(filename) {
            tokens.insert(token);
        }
    }

    tokens
}

fn insert_token(tokens: &mut BTreeSet<String>, token: String) {
    if !token.is_empty() {
        tokens.insert(token);
    }
}

fn name_tokens(name: &str, tokens: &mut BTreeSet<String>) {
    let lowered = name.trim().to_lowercase();
    if lowered.is_empty() {
        return;
    }

    let words: Vec<&str> = lowered.split_whitespace().collect();
    insert_token(tokens, words.join("-"));
    if let Some(first) = words.first() {
        if first.chars().count() >= MIN_PARTIAL_TOKEN_LEN {
            tokens.insert(first.to_string());
        }
    }
    tokens.insert(lowered);
}

/// `Sodium-Fabric-0.5.8.jar.disabled` -> `sodium`
pub fn filename_token(filename: &str) -> Option<String> {
    let mut stem = filename.trim().to_lowercase();
    if stem.ends_with(DISABLED_SUFFIX) {
        stem.truncate(stem.len() - DISABLED_SUFFIX.len());
    }
    if let Some(suffix) = ARCHIVE_SUFFIXES.iter().find(|suffix| stem.ends_with(*suffix)) {
        stem.truncate(stem.len() - suffix.len());
    }

    let head = stem.split('-').next().unwrap_or_default();
    (head.chars().count() >= MIN_PARTIAL_TOKEN_LEN).then(|| head.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_catalog_item_tokens() {
        let item = CatalogItem {
            id: "AANobbMI".to_string(),
            slug: "sodium".to_string(),
            name: "Sodium Extra  Plus".to_string(),
            ..Default::default()
        };
        assert_eq!(
            identity_tokens(&item),
            set(&["aanobbmi", "sodium", "sodium extra  plus", "sodium-extra-plus"])
        );
    }

    #[test]
    fn test_installed_item_tokens_from_all_fields() {
        let item = InstalledItem {
            filename: "Iris-mc1.20.4-1.6.17.JAR.disabled".to_string(),
            mod_id: Some("YL57xq9U".to_string()),
            name: Some("Iris Shaders".to_string()),
            disabled: true,
            ..Default::default()
        };
        assert_eq!(
            identity_tokens(&item),
            set(&["yl57xq9u", "iris shaders", "iris-shaders", "iris"])
        );
    }

    #[test]
    fn test_short_first_word_is_skipped() {
        let item = InstalledItem {
            filename: "ok-1.0.jar".to_string(),
            name: Some("EE Tweaks".to_string()),
            ..Default::default()
        };
        assert_eq!(identity_tokens(&item), set(&["ee tweaks", "ee-tweaks"]));
    }

    #[test]
    fn test_degenerate_items_contribute_nothing() {
        let item = InstalledItem {
            filename: ".jar".to_string(),
            mod_id: Some("  ".to_string()),
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(identity_tokens(&item).is_empty());
    }

    #[test]
    fn test_filename_token_strips_known_suffixes() {
        assert_eq!(filename_token("fabric-api-0.92.0+1.20.4.jar").as_deref(), Some("fabric"));
        assert_eq!(filename_token("Faithful-32x.ZIP").as_deref(), Some("faithful"));
        assert_eq!(filename_token("lithium.jar.disabled").as_deref(), Some("lithium"));
        assert_eq!(filename_token("ab.jar"), None);
    }

    #[test]
    fn test_tokens_are_deterministic() {
        let item = InstalledItem {
            filename: "create-1.20.1-0.5.1.jar".to_string(),
            name: Some("Create".to_string()),
            ..Default::default()
        };
        assert_eq!(identity_tokens(&item), identity_tokens(&item.clone()));
    }
}
