use launcher_content_sync::logging::{setup_logging, LogSettings};

#[tokio::test]
async fn test_setup_creates_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = LogSettings::new(dir.path().join("logs")).without_console();

    setup_logging(&settings).await.unwrap();
    log::info!("content sync logging test");

    assert!(settings.log_file().exists());
}
