use crate::minecraft::dto::version_manifest::GameVersion;
use crate::state::profile_state::ModLoader;
use serde::{Deserialize, Serialize};

/// Inclusive `major.minor.patch` range of game versions a loader supports.
///
/// The NeoForge bounds are a point-in-time fact about which game releases the
/// loader publishes builds for; the ceiling moves with every new release and
/// is read from the launcher config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionWindow {
    pub major: u32,
    /// Lowest supported `(minor, patch)`.
    pub floor: (u32, u32),
    /// Highest supported `(minor, patch)`.
    pub ceiling: (u32, u32),
}

impl VersionWindow {
    pub const NEOFORGE: VersionWindow = VersionWindow {
        major: 1,
        floor: (20, 2),
        ceiling: (21, 11),
    };

    /// Requires exactly three numeric components; `1.21` is rejected.
    pub fn contains(&self, version_id: &str) -> bool {
        match parse_triple(version_id) {
            Some((major, minor, patch)) => {
                major == self.major
                    && (minor, patch) >= self.floor
                    && (minor, patch) <= self.ceiling
            }
            None => false,
        }
    }
}

impl Default for VersionWindow {
    fn default() -> Self {
        VersionWindow::NEOFORGE
    }
}

fn parse_triple(version_id: &str) -> Option<(u32, u32, u32)> {
    let mut parts = version_id.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

/// Per-loader version restrictions on top of the snapshot rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoaderVersionPolicy {
    pub neoforge: VersionWindow,
}

impl LoaderVersionPolicy {
    pub fn window_for(&self, loader: ModLoader) -> Option<&VersionWindow> {
        match loader {
            ModLoader::NeoForge => Some(&self.neoforge),
            _ => None,
        }
    }
}

/// Versions from `all` usable with `loader`, in their original order.
pub fn filter_versions(
    all: &[GameVersion],
    loader: ModLoader,
    include_snapshots: bool,
    policy: &LoaderVersionPolicy,
) -> Vec<GameVersion> {
    let window = policy.window_for(loader);

    all.iter()
        .filter(|version| {
            if version.is_snapshot() {
                return include_snapshots;
            }
            window.map_or(true, |window| window.contains(&version.id))
        })
        .cloned()
        .collect()
}
