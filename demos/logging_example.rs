//! Example demonstrating the Mercator logging system
//!
//! This example shows how to:
//! - Initialize structured logging
//! - Use the stage logging macros
//!
//! Run with:
//! ```bash
//! cargo run --example logging_example
//! ```

use mercator::config::LoggingConfig;
use mercator::logging::init_logging;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create a logging configuration with a local daily-rotated file
    let config = LoggingConfig {
        local_enabled: true,
        local_path: "/tmp/mercator_example".to_string(),
        json_format: true,
    };

    // Initialize logging (keep the guard alive for the duration of the program)
    let _guard = init_logging("info", &config)?;

    // Log some basic messages
    tracing::info!("Mercator logging example started");
    tracing::debug!("This is a debug message");
    tracing::warn!("This is a warning message");

    // Use structured logging with fields
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = "development",
        "Application initialized"
    );

    // Demonstrate stage logging macros
    mercator::log_stage_start!("facts");

    // Simulate some work
    std::thread::sleep(Duration::from_millis(100));

    mercator::log_stage_complete!("facts", 541_909, Duration::from_millis(100));

    // Demonstrate error logging
    let error = mercator::domain::MercatorError::Configuration("Example error".to_string());
    mercator::log_error_with_context!(&error, "Demonstrating error logging");

    tracing::info!("Mercator logging example completed");

    println!("\nLogging example completed successfully.");
    println!("Check logs in: /tmp/mercator_example/mercator.log");

    Ok(())
}
