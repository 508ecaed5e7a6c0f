pub mod version_manifest;

pub use version_manifest::VersionManifest;
