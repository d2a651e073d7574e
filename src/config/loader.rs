//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MercatorConfig;
use crate::domain::errors::MercatorError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MercatorConfig
/// 4. Applies environment variable overrides (MERCATOR_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use mercator::config::loader::load_config;
///
/// let config = load_config("mercator.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MercatorConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(MercatorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        MercatorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: MercatorConfig = toml::from_str(&contents)
        .map_err(|e| MercatorError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config);

    // Validate configuration
    config.validate().map_err(|e| {
        MercatorError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Arguments
///
/// * `input` - String containing ${VAR} placeholders
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MercatorError::Configuration(format!("Invalid placeholder pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(MercatorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using MERCATOR_* prefix
///
/// Environment variables follow the pattern: MERCATOR_<SECTION>_<KEY>
/// For example: MERCATOR_WAREHOUSE_DB_PATH, MERCATOR_PIPELINE_MODE
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
fn apply_env_overrides(config: &mut MercatorConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("MERCATOR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("MERCATOR_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Source overrides
    if let Ok(val) = std::env::var("MERCATOR_SOURCE_DATA_DIR") {
        config.source.data_dir = val;
    }
    if let Ok(val) = std::env::var("MERCATOR_SOURCE_TRANSACTIONS_FILE") {
        config.source.transactions_file = val;
    }
    if let Ok(val) = std::env::var("MERCATOR_SOURCE_FX_RATES_FILE") {
        config.source.fx_rates_file = val;
    }
    if let Ok(val) = std::env::var("MERCATOR_SOURCE_HOLIDAYS_FILE") {
        config.source.holidays_file = val;
    }

    // Warehouse overrides
    if let Ok(val) = std::env::var("MERCATOR_WAREHOUSE_DB_PATH") {
        config.warehouse.db_path = val;
    }

    // Pipeline overrides
    if let Ok(val) = std::env::var("MERCATOR_PIPELINE_MODE") {
        config.pipeline.mode = val;
    }

    // Validation overrides
    if let Ok(val) = std::env::var("MERCATOR_VALIDATION_FX_ROUND_TRIP_TOLERANCE") {
        if let Ok(tolerance) = val.parse() {
            config.validation.fx_round_trip_tolerance = tolerance;
        }
    }
    if let Ok(val) = std::env::var("MERCATOR_VALIDATION_MAX_SAMPLE_KEYS") {
        if let Ok(keys) = val.parse() {
            config.validation.max_sample_keys = keys;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MERCATOR_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MERCATOR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("MERCATOR_LOGGING_JSON_FORMAT") {
        config.logging.json_format = val.parse().unwrap_or(false);
    }
}
