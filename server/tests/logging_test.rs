use mdenhance_server::logging::{self, LOG_FILE};

#[test]
fn init_appends_to_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    std::fs::create_dir_all(&log_dir).unwrap();
    std::fs::write(log_dir.join(LOG_FILE), "previous run\n").unwrap();

    std::env::remove_var("RUST_LOG");
    logging::init(&log_dir).unwrap();
    tracing::info!(target: "enhance", task_type = "segment_text", "Received enhance request");

    let contents = std::fs::read_to_string(log_dir.join(LOG_FILE)).unwrap();
    assert!(contents.starts_with("previous run\n"), "log was truncated");
    assert!(contents.contains("Received enhance request"));
    assert!(contents.contains("segment_text"));
    assert!(!contents.contains("\u{1b}["), "file output must not carry ANSI codes");

    // a second subscriber cannot be installed in the same process
    assert!(logging::init(&log_dir).is_err());
}
