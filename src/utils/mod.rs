pub mod identity_utils; // Fuzzy identity tokens shared by catalog and installed items
pub mod profile_utils;
pub mod version_utils; // Loader-specific game version windows
