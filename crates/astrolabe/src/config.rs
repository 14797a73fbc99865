use std::path::{Path, PathBuf};

use serde::Deserialize;

use astrolabe_core::color::Color;

use crate::{error::AstrolabeError, render::OutputFormat, runner::FailurePolicy};

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output configuration section
    #[serde(default)]
    output: OutputConfig,

    /// Build configuration section
    #[serde(default)]
    build: BuildConfig,

    /// Style configuration section
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Parses a configuration file's contents.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Config`] for malformed TOML or invalid values.
    pub fn from_toml(src: &str) -> Result<Self, AstrolabeError> {
        toml::from_str(src).map_err(|err| AstrolabeError::Config(err.to_string()))
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn with_output_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output.directory = directory.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    pub fn with_emit_dot_source(mut self, emit: bool) -> Self {
        self.output.emit_dot_source = emit;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.build.backend = backend;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.build.failure_policy = policy;
        self
    }
}

/// Output configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are written to
    #[serde(default = "default_directory")]
    directory: PathBuf,

    /// Format used by diagrams that do not pick one
    #[serde(default)]
    format: OutputFormat,

    /// Whether to write a `.dot` file next to every artifact
    #[serde(default)]
    emit_dot_source: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            format: OutputFormat::default(),
            emit_dot_source: false,
        }
    }
}

impl OutputConfig {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn emit_dot_source(&self) -> bool {
        self.emit_dot_source
    }
}

/// Build configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    failure_policy: FailurePolicy,

    #[serde(default)]
    backend: BackendKind,
}

impl BuildConfig {
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}

/// Which rendering backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The Graphviz `dot` executable
    Graphviz,
    /// The pure-Rust layout engine (SVG only)
    Builtin,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "graphviz") {
            Self::Graphviz
        } else {
            Self::Builtin
        }
    }
}

/// Style configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_font_name")]
    font_name: String,

    #[serde(default = "default_font_size")]
    font_size: u32,

    #[serde(default = "default_font_color")]
    font_color: Color,

    /// Default background color for diagrams
    #[serde(default)]
    background_color: Option<Color>,

    #[serde(default = "default_edge_color")]
    edge_color: Color,
}

fn default_font_name() -> String {
    "Sans-Serif".to_string()
}

fn default_font_size() -> u32 {
    15
}

fn default_font_color() -> Color {
    Color::new("#2D3436").expect("default font color is valid")
}

fn default_edge_color() -> Color {
    Color::new("#7B8894").expect("default edge color is valid")
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            background_color: None,
            edge_color: default_edge_color(),
        }
    }
}

impl StyleConfig {
    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn font_color(&self) -> &Color {
        &self.font_color
    }

    /// Get the background color from configuration
    /// Returns None if no background color is configured
    pub fn background_color(&self) -> Option<&Color> {
        self.background_color.as_ref()
    }

    pub fn edge_color(&self) -> &Color {
        &self.edge_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.output().directory(), Path::new("."));
        assert_eq!(config.output().format(), OutputFormat::Png);
        assert!(!config.output().emit_dot_source());
        assert_eq!(config.build().failure_policy(), FailurePolicy::FailFast);
        assert_eq!(config.style().font_name(), "Sans-Serif");
        assert_eq!(config.style().font_size(), 15);
        assert_eq!(config.style().edge_color().as_str(), "#7B8894");
        assert!(config.style().background_color().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml(
            r##"
            [output]
            directory = "out/diagrams"
            format = "svg"
            emit_dot_source = true

            [build]
            failure_policy = "best_effort"
            backend = "builtin"

            [style]
            font_name = "Helvetica"
            font_size = 12
            background_color = "white"
            edge_color = "#333333"
            "##,
        )
        .unwrap();
        assert_eq!(config.output().directory(), Path::new("out/diagrams"));
        assert_eq!(config.output().format(), OutputFormat::Svg);
        assert!(config.output().emit_dot_source());
        assert_eq!(config.build().failure_policy(), FailurePolicy::BestEffort);
        assert_eq!(config.build().backend(), BackendKind::Builtin);
        assert_eq!(config.style().font_name(), "Helvetica");
        assert_eq!(
            config.style().background_color().map(Color::as_str),
            Some("white")
        );
        // Untouched keys keep their defaults.
        assert_eq!(config.style().font_color().as_str(), "#2D3436");
    }

    #[test]
    fn test_invalid_color_is_config_error() {
        let err = AppConfig::from_toml("[style]\nedge_color = \"nope\"")
            .unwrap_err();
        assert!(matches!(err, AstrolabeError::Config(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = AppConfig::from_toml("[build]\nbackend = \"povray\"").unwrap_err();
        assert!(matches!(err, AstrolabeError::Config(_)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_output_dir("/tmp/x")
            .with_format(OutputFormat::Dot)
            .with_backend(BackendKind::Builtin)
            .with_failure_policy(FailurePolicy::BestEffort)
            .with_emit_dot_source(true);
        assert_eq!(config.output().directory(), Path::new("/tmp/x"));
        assert_eq!(config.output().format(), OutputFormat::Dot);
        assert_eq!(config.build().backend(), BackendKind::Builtin);
        assert_eq!(config.build().failure_policy(), FailurePolicy::BestEffort);
        assert!(config.output().emit_dot_source());
    }
}
