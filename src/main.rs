use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{error, info, warn};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};
use ta_grades::config::{Config, OutputFormat};
use ta_grades::{render_summary, GradeClient};

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() -> ExitCode {
    // Loads `.env` and the TA_* variables.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Terminal logging with mixed output (both stdout and stderr) and automatic color support.
    if let Err(e) = TermLogger::init(
        config.log_level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error retrieving grades: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<()> {
    let client = GradeClient::with_base_url(&config.base_url)?;
    let report = client
        .fetch_report(&config.username, &config.password)
        .await
        .context("Failed to fetch grades")?;
    info!("Grades retrieved successfully");

    if !report.skipped.is_empty() {
        warn!("{} rows or cells could not be read", report.skipped.len());
    }

    let output = match config.output {
        OutputFormat::Json => serde_json::to_string_pretty(&report.courses)?,
        OutputFormat::Summary => render_summary(&report.courses),
    };
    println!("{}", output);
    Ok(())
}
