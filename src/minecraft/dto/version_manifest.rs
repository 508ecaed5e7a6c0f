use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<Version>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    pub time: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl VersionType {
    /// Unknown manifest types are treated as releases.
    pub fn from_manifest(raw: &str) -> Self {
        match raw {
            "snapshot" => VersionType::Snapshot,
            "old_beta" => VersionType::OldBeta,
            "old_alpha" => VersionType::OldAlpha,
            _ => VersionType::Release,
        }
    }
}

/// One entry of the flat game version catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersion {
    pub id: String,
    pub version_type: VersionType,
}

impl GameVersion {
    pub fn release(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_type: VersionType::Release,
        }
    }

    pub fn snapshot(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version_type: VersionType::Snapshot,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.version_type == VersionType::Snapshot
    }
}

impl From<&Version> for GameVersion {
    fn from(version: &Version) -> Self {
        Self {
            id: version.id.clone(),
            version_type: VersionType::from_manifest(&version.version_type),
        }
    }
}

impl VersionManifest {
    pub fn game_versions(&self) -> Vec<GameVersion> {
        self.versions.iter().map(GameVersion::from).collect()
    }
}
