use launcher_content_sync::state::config_state::{ConfigManager, SyncConfig};
use launcher_content_sync::utils::version_utils::VersionWindow;

#[tokio::test]
async fn test_missing_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("content_sync_config.json");
    let manager = ConfigManager::new(path.clone());

    let config = manager.load().await.unwrap();
    assert_eq!(config, SyncConfig::default());
    assert!(path.exists());

    let raw = std::fs::read_to_string(&path).unwrap();
    let on_disk: SyncConfig = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk.mods_watch_interval_ms, 2000);
    assert_eq!(on_disk.login_max_duration_secs, 900);
}

#[tokio::test]
async fn test_saved_config_is_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content_sync_config.json");

    let manager = ConfigManager::new(path.clone());
    manager
        .set_config(SyncConfig {
            include_snapshots: true,
            neoforge_window: VersionWindow {
                ceiling: (22, 1),
                ..VersionWindow::NEOFORGE
            },
            ..Default::default()
        })
        .await
        .unwrap();

    let reloaded = ConfigManager::new(path).load().await.unwrap();
    assert!(reloaded.include_snapshots);
    assert_eq!(reloaded.neoforge_window.ceiling, (22, 1));
    assert_eq!(reloaded.version_policy().neoforge.floor, (20, 2));
}

#[tokio::test]
async fn test_invalid_file_is_backed_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content_sync_config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let manager = ConfigManager::new(path.clone());
    let config = manager.load().await.unwrap();

    assert_eq!(config, SyncConfig::default());
    let backup = path.with_extension("json.backup");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_invalid_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("content_sync_config.json"));

    let result = manager
        .set_config(SyncConfig {
            search_page_size: 0,
            ..Default::default()
        })
        .await;
    assert!(result.is_err());
    assert_eq!(manager.get_config().await.search_page_size, 20);
}
