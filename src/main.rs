//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `loggeo` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use loggeo::app;
use loggeo::config::Opt;
use loggeo::initialization::init_logger_with;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), so RUST_LOG can
    // be set there
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = app::run(opt).await {
        eprintln!("loggeo error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
