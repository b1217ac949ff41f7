use blockwatch::config::Config;
use blockwatch::error::{FetchError, TrackerError};
use blockwatch::init::build_tracker;
use blockwatch::tracker::RunOutcome;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MARKER_1: &str = "Mon, 15 Jan 2024 08:30:00 GMT";
const MARKER_2: &str = "Tue, 16 Jan 2024 11:00:00 GMT";

const BODY_1: &str = "# Phishing Army | The Blocklist to filter Phishing\n\
                      # Last Update: 2024-01-15\n\
                      \n\
                      login-paypa1.example\n\
                      secure-bank.example\n";

const BODY_2: &str = "# Phishing Army | The Blocklist to filter Phishing\n\
                      # Last Update: 2024-01-16\n\
                      \n\
                      secure-bank.example\n\
                      verify-account.example\n\
                      login-paypa1.example\n\
                      apple-id-reset.example\n\
                      verify-account.example\n";

fn test_config(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.source.name = "Test List".to_string();
    config.source.url = format!("{}/list.txt", server.uri());
    config.source.probe_timeout_secs = 2;
    config.source.fetch_timeout_secs = 2;
    config.state.marker_path = dir.path().join("last_modified.txt");
    config.state.snapshot_path = dir.path().join("cache.txt");
    config.state.report_path = dir.path().join("out/new.txt");
    config
}

fn read_optional(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn read_state(config: &Config) -> (Option<String>, Option<String>, Option<String>) {
    (
        read_optional(&config.state.marker_path),
        read_optional(&config.state.snapshot_path),
        read_optional(&config.state.report_path),
    )
}

async fn mount_head(server: &MockServer, marker: &str) {
    Mock::given(method("HEAD"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200).insert_header("Last-Modified", marker))
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, body: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bootstrap_then_unchanged_then_new_entries() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir);
    let tracker = build_tracker(&config).unwrap();

    // 1. First run establishes the baseline
    mount_head(&server, MARKER_1).await;
    mount_get(&server, BODY_1, 1).await;

    let outcome = tracker.run().await.unwrap();
    assert!(matches!(
        outcome,
        RunOutcome::Updated {
            new_entries: 0,
            bootstrap: true,
            ..
        }
    ));
    let (marker, snapshot, report) = read_state(&config);
    assert_eq!(marker.as_deref(), Some(MARKER_1));
    assert_eq!(snapshot.as_deref(), Some(BODY_1));
    assert!(report.unwrap().ends_with("# Total new records: 0\n\n"));
    server.verify().await;

    // 2. Same Last-Modified: nothing is downloaded or rewritten
    server.reset().await;
    mount_head(&server, MARKER_1).await;
    mount_get(&server, BODY_2, 0).await;

    let before = read_state(&config);
    let outcome = tracker.run().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Unchanged { .. }));
    assert_eq!(read_state(&config), before);
    server.verify().await;

    // 3. New Last-Modified: only appended entries are reported
    server.reset().await;
    mount_head(&server, MARKER_2).await;
    mount_get(&server, BODY_2, 1).await;

    let outcome = tracker.run().await.unwrap();
    assert!(matches!(
        outcome,
        RunOutcome::Updated {
            new_entries: 2,
            bootstrap: false,
            ..
        }
    ));
    let (marker, snapshot, report) = read_state(&config);
    assert_eq!(marker.as_deref(), Some(MARKER_2));
    assert_eq!(snapshot.as_deref(), Some(BODY_2));

    let report = report.unwrap();
    let (header, entries) = report.split_once("\n\n").unwrap();
    assert!(header.starts_with("# New records added to Test List\n"));
    assert!(header.contains(&format!("# Source: {}/list.txt\n", server.uri())));
    assert!(header.contains("# Blocklist Last-Modified: Tue, 16 Jan 2024 11:00:00 GMT\n"));
    assert!(header.contains("# Blocklist Last-Modified (epoch): 1705402800\n"));
    assert!(header.ends_with("# Total new records: 2"));
    assert_eq!(entries, "apple-id-reset.example\nverify-account.example\n");
}

#[tokio::test]
async fn test_fetch_failure_leaves_files_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir);

    fs::write(&config.state.marker_path, MARKER_1).unwrap();
    fs::write(&config.state.snapshot_path, BODY_1).unwrap();
    fs::create_dir_all(config.state.report_path.parent().unwrap()).unwrap();
    fs::write(&config.state.report_path, "previous report\n").unwrap();
    let before = read_state(&config);

    mount_head(&server, MARKER_2).await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = build_tracker(&config).unwrap().run().await.unwrap_err();

    assert!(matches!(err, TrackerError::Fetch(FetchError::Status(503))));
    assert_eq!(read_state(&config), before);
}

#[tokio::test]
async fn test_probe_failure_falls_back_to_full_fetch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir);

    fs::write(&config.state.marker_path, MARKER_1).unwrap();
    fs::write(&config.state.snapshot_path, BODY_1).unwrap();

    Mock::given(method("HEAD"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Last-Modified", MARKER_2)
                .set_body_string(BODY_2),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = build_tracker(&config).unwrap().run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Updated { new_entries: 2, .. }));
    let (marker, _, _) = read_state(&config);
    assert_eq!(marker.as_deref(), Some(MARKER_2));
}

#[tokio::test]
async fn test_missing_header_and_legacy_epoch_marker() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server, &dir);

    // Marker written by an older deployment as a bare epoch
    fs::write(&config.state.marker_path, "1705307400").unwrap();
    fs::write(&config.state.snapshot_path, BODY_1).unwrap();

    Mock::given(method("HEAD"))
        .and(path("/list.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_get(&server, BODY_2, 1).await;

    let outcome = build_tracker(&config).unwrap().run().await.unwrap();

    assert!(matches!(
        outcome,
        RunOutcome::Updated {
            new_entries: 2,
            marker: None,
            ..
        }
    ));
    let (marker, _, report) = read_state(&config);
    assert!(marker.is_none());
    assert!(report
        .unwrap()
        .contains("# Blocklist Last-Modified: Unknown\n"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server, &dir);
    config.source.max_body_bytes = 16;

    mount_head(&server, MARKER_1).await;
    mount_get(&server, BODY_1, 1).await;

    let err = build_tracker(&config).unwrap().run().await.unwrap_err();

    assert!(matches!(
        err,
        TrackerError::Fetch(FetchError::TooLarge { limit: 16 })
    ));
    assert_eq!(read_state(&config), (None, None, None));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server, &dir);
    config.source.fetch_timeout_secs = 1;

    mount_head(&server, MARKER_1).await;
    Mock::given(method("GET"))
        .and(path("/list.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(BODY_1)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = build_tracker(&config).unwrap().run().await.unwrap_err();

    assert!(matches!(err, TrackerError::Fetch(FetchError::Transport(_))));
    assert_eq!(read_state(&config), (None, None, None));
}
