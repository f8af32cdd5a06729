use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use unspool_app::Monitor;
use unspool_config::{IngestConfig, StabilitySettings};
use unspool_ingest::MemorySink;
use unspool_test_support::assert::eventually;
use unspool_test_support::fixtures::{IngestWorkspace, write_zip_archive};

fn fast_config(workspace: &IngestWorkspace) -> IngestConfig {
    IngestConfig::new(workspace.monitor(), workspace.destination()).with_stability(
        StabilitySettings {
            interval: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(50),
        },
    )
}

#[test]
fn archive_moved_into_folder_is_extracted_and_copied() -> Result<()> {
    let workspace = IngestWorkspace::new()?;
    let sink = Arc::new(MemorySink::new());
    let monitor = Monitor::start(fast_config(&workspace), sink.clone())?;
    assert!(monitor.is_running());

    let staged = workspace.root().join("pack.zip");
    write_zip_archive(
        &staged,
        &[
            ("pack/readme.txt", b"hello".as_slice()),
            ("pack/img/cover.jpg", b"jpeg".as_slice()),
        ],
    )?;
    fs::rename(&staged, workspace.monitor().join("pack.zip"))?;

    let copied = eventually(Duration::from_secs(15), || {
        workspace.destination().join("cover.jpg").is_file()
            && workspace.destination().join("readme.txt").is_file()
    });
    let processed = monitor.stop()?;

    assert!(copied, "sink lines: {:?}", sink.lines());
    assert_eq!(processed, 1);
    assert!(workspace.monitor().join("pack").is_dir());
    assert!(sink.contains("Found new ZIP file: pack.zip"));
    assert!(sink.contains("Stopped monitoring."));
    Ok(())
}

#[test]
fn renamed_download_is_handled_once() -> Result<()> {
    let workspace = IngestWorkspace::new()?;
    let partial = workspace.monitor().join("broken.zip.crdownload");
    fs::write(&partial, b"this is not a zip archive")?;
    let sink = Arc::new(MemorySink::new());
    let monitor = Monitor::start(fast_config(&workspace), sink.clone())?;

    fs::rename(&partial, workspace.monitor().join("broken.zip"))?;

    let reported = eventually(Duration::from_secs(15), || {
        sink.contains("broken.zip is not a valid archive")
    });
    std::thread::sleep(Duration::from_secs(1));
    let processed = monitor.stop()?;

    assert!(reported, "sink lines: {:?}", sink.lines());
    assert_eq!(processed, 0);
    let lines = sink.lines();
    let count = |needle: &str| lines.iter().filter(|line| line.contains(needle)).count();
    assert_eq!(count("Found new ZIP file: broken.zip"), 1, "lines: {lines:?}");
    assert_eq!(count("is not a valid archive"), 1, "lines: {lines:?}");
    Ok(())
}

#[test]
fn non_archives_are_ignored() -> Result<()> {
    let workspace = IngestWorkspace::new()?;
    let sink = Arc::new(MemorySink::new());
    let monitor = Monitor::start(fast_config(&workspace), sink.clone())?;

    fs::write(workspace.monitor().join("notes.txt"), b"plain")?;
    std::thread::sleep(Duration::from_millis(500));
    let processed = monitor.stop()?;

    assert_eq!(processed, 0);
    assert!(!sink.contains("Found new"));
    Ok(())
}

#[test]
fn dropping_the_handle_stops_the_worker() -> Result<()> {
    let workspace = IngestWorkspace::new()?;
    let sink = Arc::new(MemorySink::new());
    let monitor = Monitor::start(fast_config(&workspace), sink.clone())?;
    drop(monitor);
    assert!(sink.contains("Stopped monitoring."));
    Ok(())
}
