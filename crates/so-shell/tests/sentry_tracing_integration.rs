use sentry::Level;
use so_shell::bootstrap::tracing::init_tracing_subscriber;

#[test]
fn test_sentry_tracing_integration() {
    std::env::set_var("SENTRY_DSN", "https://public@example.com/1");
    std::env::set_var("RUST_LOG", "info");

    let log_dir = tempfile::tempdir().expect("Failed to create log dir");
    let log_file = log_dir.path().join("shoutout-test.log");
    init_tracing_subscriber(Some(&log_file)).expect("Failed to init tracing");

    let events = sentry::test::with_captured_events(|| {
        tracing::error!("Profile upsert failed");
    });

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::Error);
    assert_eq!(events[0].message.as_deref(), Some("Profile upsert failed"));

    let events = sentry::test::with_captured_events(|| {
        tracing::warn!("Stub profile creation failed");
        tracing::error!("Session probe failed");
    });

    assert_eq!(events.len(), 1);
    let breadcrumbs: Vec<_> = events[0]
        .breadcrumbs
        .iter()
        .filter(|b| b.message.as_deref() == Some("Stub profile creation failed"))
        .collect();

    assert_eq!(breadcrumbs.len(), 1);
    assert_eq!(breadcrumbs[0].level, Level::Warning);

    assert!(log_file.exists());
}
