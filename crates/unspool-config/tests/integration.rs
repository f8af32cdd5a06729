use std::fs;

use anyhow::Result;
use unspool_config::{
    ConfigError, CopyPolicy, ExtensionSet, IngestConfig, PriorityGroups, read_config_file,
    write_config_file,
};

#[test]
fn settings_document_round_trips_through_disk() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let monitor = temp.path().join("downloads");
    let destination = temp.path().join("library");
    fs::create_dir_all(&monitor)?;
    fs::create_dir_all(&destination)?;

    let policy = CopyPolicy {
        extension_filter: Some(ExtensionSet::parse("jpg,.PNG")),
        extension_filter_enabled: false,
        priority_groups: PriorityGroups::parse("vector-ai,eps;raster-png"),
        priority_enabled: true,
        whole_folder_copy: false,
        delete_archive_after_extract: true,
        delete_extracted_after_copy: true,
    };
    let config = IngestConfig::new(&monitor, &destination).with_policy(policy);

    let path = temp.path().join("nested").join("unspool.conf");
    write_config_file(&path, &config)?;
    let loaded = read_config_file(&path)?;

    assert_eq!(loaded, config);
    loaded.validate()?;
    Ok(())
}

#[test]
fn legacy_document_is_understood() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("unspool.conf");
    fs::write(
        &path,
        "monitor_folder=C:/Users/me/Downloads\n\
         dest_folder=D:/Assets\n\
         delete_after_zip=True\n\
         delete_after_extracted=False\n\
         file_exts=.ai, .EPS\n\
         logic_input=1-ai;2-png,jpg\n\
         copy_enabled=False\n\
         logic_enabled=True\n\
         copy_whole_folder=False\n\
         window_geometry=800x600\n",
    )?;

    let config = read_config_file(&path)?;
    let policy = &config.policy;
    assert!(policy.delete_archive_after_extract);
    assert!(!policy.delete_extracted_after_copy);
    assert!(!policy.extension_filter_enabled);
    assert!(policy.priority_active());
    assert_eq!(policy.priority_groups.len(), 2);
    let filter = policy
        .extension_filter()
        .ok_or_else(|| anyhow::anyhow!("expected extension filter"))?;
    assert!(filter.contains("eps"));
    assert!(filter.contains("AI"));

    let json = serde_json::to_value(&config)?;
    assert_eq!(json["policy"]["priority_enabled"], true);
    Ok(())
}

#[test]
fn missing_document_reports_io_error() {
    let result = read_config_file(std::path::Path::new("/definitely/missing/unspool.conf"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}
