//! Integration tests for configuration loading and validation
//!
//! Note: Every test here takes the shared lock because load_config reads
//! MERCATOR_* override variables from the process environment.

use mercator::config::load_config;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that touch environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("MERCATOR_APPLICATION_LOG_LEVEL");
    std::env::remove_var("MERCATOR_APPLICATION_DRY_RUN");
    std::env::remove_var("MERCATOR_SOURCE_DATA_DIR");
    std::env::remove_var("MERCATOR_SOURCE_TRANSACTIONS_FILE");
    std::env::remove_var("MERCATOR_SOURCE_FX_RATES_FILE");
    std::env::remove_var("MERCATOR_SOURCE_HOLIDAYS_FILE");
    std::env::remove_var("MERCATOR_WAREHOUSE_DB_PATH");
    std::env::remove_var("MERCATOR_PIPELINE_MODE");
    std::env::remove_var("MERCATOR_VALIDATION_FX_ROUND_TRIP_TOLERANCE");
    std::env::remove_var("MERCATOR_VALIDATION_MAX_SAMPLE_KEYS");
    std::env::remove_var("MERCATOR_LOGGING_LOCAL_ENABLED");
    std::env::remove_var("MERCATOR_LOGGING_LOCAL_PATH");
    std::env::remove_var("MERCATOR_LOGGING_JSON_FORMAT");
    std::env::remove_var("TEST_WAREHOUSE_DIR");
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[application]
log_level = "debug"
dry_run = true

[source]
data_dir = "fixtures/extracts"
transactions_file = "retail_2011.csv"
fx_rates_file = "boe_gbp_eur.csv"
holidays_file = "england_wales_holidays.csv"

[warehouse]
db_path = "/tmp/mercator/retail.db"

[pipeline]
mode = "incremental"

[validation]
fx_round_trip_tolerance = 1e-9
max_sample_keys = 10

[logging]
local_enabled = true
local_path = "/tmp/mercator/logs"
json_format = true
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify application config
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    // Verify source config and its path helpers
    assert_eq!(config.source.data_dir, "fixtures/extracts");
    assert_eq!(config.source.transactions_file, "retail_2011.csv");
    assert_eq!(
        config.source.transactions_path(),
        PathBuf::from("fixtures/extracts").join("retail_2011.csv")
    );
    assert_eq!(
        config.source.fx_rates_path(),
        PathBuf::from("fixtures/extracts").join("boe_gbp_eur.csv")
    );
    assert_eq!(
        config.source.holidays_path(),
        PathBuf::from("fixtures/extracts").join("england_wales_holidays.csv")
    );

    // Verify warehouse config
    assert_eq!(config.warehouse.db_path, "/tmp/mercator/retail.db");

    // Verify pipeline config
    assert_eq!(config.pipeline.mode, "incremental");

    // Verify validation config
    assert_eq!(config.validation.fx_round_trip_tolerance, 1e-9);
    assert_eq!(config.validation.max_sample_keys, 10);

    // Verify logging config
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/tmp/mercator/logs");
    assert!(config.logging.json_format);
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[source]
data_dir = "data/raw"

[warehouse]
db_path = "warehouse/retail.db"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify defaults are applied
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.source.transactions_file, "transactions.csv");
    assert_eq!(config.source.fx_rates_file, "ecb_gbp_eur.csv");
    assert_eq!(config.source.holidays_file, "uk_bank_holidays.csv");
    assert_eq!(config.pipeline.mode, "rebuild");
    assert_eq!(config.validation.fx_round_trip_tolerance, 1e-6);
    assert_eq!(config.validation.max_sample_keys, 5);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "logs");
    assert!(!config.logging.json_format);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_WAREHOUSE_DIR", "/var/lib/mercator");

    let toml_content = r#"
[source]
data_dir = "data/raw"

[warehouse]
db_path = "${TEST_WAREHOUSE_DIR}/retail.db"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.warehouse.db_path, "/var/lib/mercator/retail.db");

    std::env::remove_var("TEST_WAREHOUSE_DIR");
}

#[test]
fn test_missing_env_var_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::remove_var("TEST_UNSET_WAREHOUSE_DIR");

    let toml_content = r#"
[source]
data_dir = "data/raw"

[warehouse]
db_path = "${TEST_UNSET_WAREHOUSE_DIR}/retail.db"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let result = load_config(temp_file.path());
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(
        message.contains("TEST_UNSET_WAREHOUSE_DIR"),
        "error should name the missing variable: {message}"
    );
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MERCATOR_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("MERCATOR_PIPELINE_MODE", "incremental");
    std::env::set_var("MERCATOR_VALIDATION_MAX_SAMPLE_KEYS", "20");

    let toml_content = r#"
[application]
log_level = "info"

[source]
data_dir = "data/raw"

[warehouse]
db_path = "warehouse/retail.db"

[pipeline]
mode = "rebuild"

[validation]
max_sample_keys = 5
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path()).expect("Failed to load config");

    // Verify env var overrides took effect
    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.pipeline.mode, "incremental");
    assert_eq!(config.validation.max_sample_keys, 20);

    std::env::remove_var("MERCATOR_APPLICATION_LOG_LEVEL");
    std::env::remove_var("MERCATOR_PIPELINE_MODE");
    std::env::remove_var("MERCATOR_VALIDATION_MAX_SAMPLE_KEYS");
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[application]
log_level = "verbose"

[source]
data_dir = "data/raw"

[warehouse]
db_path = "warehouse/retail.db"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let result = load_config(temp_file.path());
    assert!(result.is_err());
}

#[test]
fn test_override_can_break_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MERCATOR_PIPELINE_MODE", "partial");

    let toml_content = r#"
[source]
data_dir = "data/raw"

[warehouse]
db_path = "warehouse/retail.db"

[pipeline]
mode = "rebuild"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    // overrides land before validation, so a bad override is caught too
    let result = load_config(temp_file.path());
    assert!(result.is_err());

    std::env::remove_var("MERCATOR_PIPELINE_MODE");
}
