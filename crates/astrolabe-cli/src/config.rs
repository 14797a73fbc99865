//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory)
//! and applying command-line overrides on top.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use astrolabe::{AstrolabeError, FailurePolicy, config::AppConfig};

use crate::Args;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for AstrolabeError {
    fn from(err: ConfigError) -> Self {
        AstrolabeError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (astrolabe/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, AstrolabeError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("astrolabe/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "astrolabe", "astrolabe") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, AstrolabeError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config = AppConfig::from_toml(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: match err {
            AstrolabeError::Config(message) => message,
            other => other.to_string(),
        },
    })?;

    Ok(config)
}

/// Applies the command-line flags that override file settings.
pub fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(format) = args.format {
        config = config.with_format(format.into());
    }
    if let Some(backend) = args.backend {
        config = config.with_backend(backend.into());
    }
    if args.best_effort {
        config = config.with_failure_policy(FailurePolicy::BestEffort);
    }
    if args.emit_dot {
        config = config.with_emit_dot_source(true);
    }
    config
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use astrolabe::{OutputFormat, config::BackendKind};

    use super::*;
    use crate::args::{BackendArg, FormatArg};

    #[test]
    fn test_explicit_path_is_loaded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"pdf\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.output().format(), OutputFormat::Pdf);
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = load_config(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, AstrolabeError::Config(ref msg) if msg.contains("Missing")));
    }

    #[test]
    fn test_invalid_file_mentions_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[build]\nfailure_policy = \"sometimes\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&file.path().display().to_string()), "{message}");
        assert!(message.contains("sometimes"), "{message}");
        assert_eq!(message.matches("Configuration error").count(), 1, "{message}");
    }

    #[test]
    fn test_flags_override_file() {
        let args = Args {
            input: "in.toml".to_string(),
            output_dir: Some("rendered".to_string()),
            config: None,
            format: Some(FormatArg::Svg),
            backend: Some(BackendArg::Builtin),
            best_effort: true,
            emit_dot: false,
            log_level: "off".to_string(),
        };
        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.output().directory(), Path::new("rendered"));
        assert_eq!(config.output().format(), OutputFormat::Svg);
        assert_eq!(config.build().backend(), BackendKind::Builtin);
        assert_eq!(config.build().failure_policy(), FailurePolicy::BestEffort);
        assert!(!config.output().emit_dot_source());
    }
}
