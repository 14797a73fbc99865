//! CLI logic for the Astrolabe diagram tool.
//!
//! This module contains the core CLI logic: it loads the configuration,
//! reads the build manifest and renders every diagram it declares.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, BackendArg, FormatArg};

use log::info;

use astrolabe::{AstrolabeError, BuildReport, Manifest, Renderer};

/// Run the Astrolabe CLI application
///
/// This function builds every diagram of the manifest named by `args.input`
/// and writes the artifacts to the configured output directory.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `AstrolabeError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Manifest errors
/// - The first failing diagram when the failure policy is fail-fast
///
/// Under the best-effort policy diagram failures are collected in the
/// returned [`BuildReport`] instead.
pub fn run(args: &Args) -> Result<BuildReport, AstrolabeError> {
    info!(input_path = args.input; "Processing manifest");

    // Load configuration and apply command-line overrides
    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = config::apply_overrides(app_config, args);

    let manifest = Manifest::from_path(&args.input)?;
    info!(diagrams = manifest.len(); "Manifest loaded");

    let renderer = Renderer::from_config(&app_config)?;
    let report = manifest
        .into_build_run(app_config.build().failure_policy())
        .execute(&renderer)?;

    info!(
        artifacts = report.artifacts().len(),
        failures = report.failures().len();
        "Build finished"
    );

    Ok(report)
}
