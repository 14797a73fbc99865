//! Astrolabe CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use astrolabe::AstrolabeError;
use astrolabe_cli::{Args, error_adapter::to_reportables};

/// Renders an error through miette and logs every diagnostic.
fn report_error(err: &AstrolabeError) {
    let reporter = miette::GraphicalReportHandler::new();

    // Render each diagnostic independently
    for reportable in to_reportables(err) {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, &reportable)
            .expect("Writing to String buffer is infallible");

        error!("{writer}");
    }
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    // Parse configuration first
    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Astrolabe");
    debug!(args:?; "Parsed arguments");

    let report = match astrolabe_cli::run(&args) {
        Ok(report) => report,
        Err(err) => {
            report_error(&err);
            process::exit(1);
        }
    };

    for artifact in report.artifacts() {
        info!(title = artifact.title(), path:? = artifact.path(); "Diagram written");
    }

    if !report.is_success() {
        for failure in report.failures() {
            error!(index = failure.index(), title = failure.title(); "Diagram failed");
            report_error(failure.error());
        }
        process::exit(1);
    }

    info!("Completed successfully");
}
