//! Integration tests for loading configuration files from disk.

mod common;

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use common::ConfigBuilder;
use jobwatch::{
    init_logging, load_config, load_config_from_str, AppContext, ConfigError, LogFormat,
    LoggingConfig,
};

#[test]
fn test_round_trip_through_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    let builder = ConfigBuilder::new()
        .worker_count(4)
        .allowed_apps(&["com.whatsapp"])
        .display_name("com.whatsapp", "WA");
    fs::write(&path, builder.to_json()).unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.worker_count, 4);
    assert_eq!(config.classifier.allowed_apps, vec!["com.whatsapp"]);
    assert_eq!(
        config.classifier.display_names.get("com.whatsapp").map(String::as_str),
        Some("WA")
    );
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
    assert!(config.worker_count > 0);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.classifier.keywords.iter().any(|k| k == "fresher"));
}

#[test]
fn test_missing_version_is_parse_error() {
    let err = load_config_from_str(r#"{"workerCount": 2}"#).unwrap_err();
    assert!(matches!(err, ConfigError::ParseJson(_)));
}

#[test]
fn test_malformed_json() {
    let err = load_config_from_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::ParseJson(_)));
}

#[test]
fn test_validation_errors_from_file() {
    let temp = TempDir::new().unwrap();
    let cases = [
        ("version.json", ConfigBuilder::new().version("0.9").to_json()),
        ("workers.json", ConfigBuilder::new().worker_count(0).to_json()),
        ("apps.json", ConfigBuilder::new().allowed_apps(&[]).to_json()),
        ("keywords.json", ConfigBuilder::new().keywords(&[]).to_json()),
    ];

    for (name, json) in cases {
        let path = temp.path().join(name);
        fs::write(&path, json).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { .. }),
            "Case '{}': expected validation error, got {:?}",
            name,
            err
        );
    }
}

#[test]
fn test_database_path_tilde_expansion() {
    let config = ConfigBuilder::new().database_path("~/jobs/db.sqlite").build();
    let home = dirs::home_dir().unwrap();
    assert_eq!(
        config.resolved_database_path(),
        Some(home.join("jobs").join("db.sqlite"))
    );
}

#[test]
fn test_context_uses_configured_database() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("nested").join("jobs.db");
    let config = ConfigBuilder::new()
        .database_path(&db_path.to_string_lossy())
        .build();

    let ctx = AppContext::initialize(config).unwrap();
    ctx.finish();

    assert!(db_path.exists());
}

#[test]
#[serial]
fn test_init_logging_twice_reports_error() {
    let logging = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
    };
    let _ = init_logging(&logging);
    assert!(init_logging(&logging).is_err());
}
