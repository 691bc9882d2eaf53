use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use inventory_ingest::IngestError;
use inventory_ingest::ingestion::{
    IngestContext, IngestObserver, IngestOptions, IngestSeverity, IngestStats, ingest_inventory,
};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestStats>>,
    warnings: Mutex<Vec<String>>,
    failures: Mutex<Vec<IngestSeverity>>,
    alerts: Mutex<Vec<IngestSeverity>>,
}

impl IngestObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestContext, stats: IngestStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_warning(&self, _ctx: &IngestContext, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn on_failure(&self, _ctx: &IngestContext, severity: IngestSeverity, _error: &IngestError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestContext, severity: IngestSeverity, _error: &IngestError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("inventory-ingest-obs-{name}-{nanos}.{ext}"))
}

fn options_with(observer: Arc<RecordingObserver>) -> IngestOptions {
    IngestOptions {
        observer: Some(observer),
        alert_at_or_above: IngestSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let report = ingest_inventory(
        "tests/fixtures/does_not_exist.csv",
        "csv",
        "o",
        None,
        &options_with(obs.clone()),
    );

    assert!(!report.success);
    // Missing file -> Io -> Critical -> both callbacks fire.
    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![IngestSeverity::Critical]
    );
    assert_eq!(
        obs.alerts.lock().unwrap().clone(),
        vec![IngestSeverity::Critical]
    );
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn observer_failure_without_alert_for_unsupported_type() {
    let obs = Arc::new(RecordingObserver::default());
    let path = tmp_file("unsupported", "docx");
    std::fs::write(&path, b"x").unwrap();

    let _ = ingest_inventory(&path, "docx", "o", None, &options_with(obs.clone()));

    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![IngestSeverity::Error]
    );
    assert!(obs.alerts.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn observer_is_warned_about_skipped_unsafe_archive_members() {
    use std::io::Write;

    let obs = Arc::new(RecordingObserver::default());
    let path = tmp_file("unsafe-member", "zip");
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        zip.start_file("inventory.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"Material,Qty,Price\nTeak Door,2,4000\n")
            .unwrap();
        zip.start_file("AA/evil.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"nope").unwrap();
        zip.finish().unwrap();
    }
    // Rewrite the second member's name into a traversal path. The writer
    // won't emit one itself, so patch the stored name bytes directly (same
    // length, so offsets stay valid).
    let needle = b"AA/evil.txt";
    let patched: Vec<u8> = {
        let mut bytes = buffer.clone();
        for start in 0..bytes.len().saturating_sub(needle.len()) {
            if &bytes[start..start + needle.len()] == needle {
                bytes[start..start + 3].copy_from_slice(b"../");
            }
        }
        bytes
    };
    std::fs::write(&path, &patched).unwrap();

    let report = ingest_inventory(&path, "zip", "o", None, &options_with(obs.clone()));

    // The bad member is skipped and reported; the good rows still import.
    assert!(report.success);
    assert_eq!(report.successful_rows, 1);
    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].contains("unsafe path"),
        "warning was {:?}",
        warnings[0]
    );
    assert!(obs.failures.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let path = tmp_file("stats", "csv");
    std::fs::write(&path, "Material,Qty,Price\nDoor,1,10\n,1,10\n").unwrap();

    let report = ingest_inventory(&path, "csv", "o", None, &options_with(obs.clone()));

    assert!(report.success);
    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![IngestStats {
            total_rows: 2,
            successful_rows: 1,
            failed_rows: 1,
        }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());

    let _ = std::fs::remove_file(&path);
}
