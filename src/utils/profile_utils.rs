use crate::state::profile_state::Profile;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Mod,
    Modpack,
    ResourcePack,
    ShaderPack,
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::Mod
    }
}

impl ContentType {
    /// Content types listed per profile (modpacks become profiles instead).
    pub const INSTALLABLE: [ContentType; 3] = [
        ContentType::Mod,
        ContentType::ResourcePack,
        ContentType::ShaderPack,
    ];

    /// Whether a loader filter means anything for this content type.
    pub fn loader_applies(&self) -> bool {
        matches!(self, ContentType::Mod | ContentType::Modpack)
    }

    pub fn installable(&self) -> bool {
        !matches!(self, ContentType::Modpack)
    }

    /// Modrinth `project_type` facet value.
    pub fn project_type(&self) -> &'static str {
        match self {
            ContentType::Mod => "mod",
            ContentType::Modpack => "modpack",
            ContentType::ResourcePack => "resourcepack",
            ContentType::ShaderPack => "shader",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.project_type())
    }
}

/// Version/loader pair seeded into the content browser. Empty means "all".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDefaults {
    pub version: String,
    pub loader: String,
}

/// Default filters when browsing content for `profile`.
pub fn derive_defaults(profile: &Profile, content_type: ContentType) -> FilterDefaults {
    let loader = if content_type.loader_applies() && profile.loader.loader.supports_mods() {
        profile.loader.loader.as_str().to_string()
    } else {
        String::new()
    };

    FilterDefaults {
        version: profile.game_version.clone(),
        loader,
    }
}

/// Default filters when browsing outside any profile.
pub fn reset_to_default() -> FilterDefaults {
    FilterDefaults::default()
}
