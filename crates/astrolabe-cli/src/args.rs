//! Command-line argument definitions for the Astrolabe CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Every flag that has a configuration file counterpart
//! overrides the file value when given.

use clap::{Parser, ValueEnum};

use astrolabe::{OutputFormat, config::BackendKind};

/// Command-line arguments for the Astrolabe diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the build manifest
    #[arg(help = "Path to the build manifest (TOML)")]
    pub input: String,

    /// Directory the diagrams are written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format for diagrams that do not set one
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Rendering backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Keep building the remaining diagrams after one fails
    #[arg(long)]
    pub best_effort: bool,

    /// Also write the DOT source next to every artifact
    #[arg(long)]
    pub emit_dot: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Png,
    Svg,
    Jpg,
    Pdf,
    Dot,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => Self::Png,
            FormatArg::Svg => Self::Svg,
            FormatArg::Jpg => Self::Jpg,
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Dot => Self::Dot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Graphviz,
    Builtin,
}

impl From<BackendArg> for BackendKind {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Graphviz => Self::Graphviz,
            BackendArg::Builtin => Self::Builtin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "astrolabe",
            "demos/mern.toml",
            "-o",
            "out",
            "-f",
            "svg",
            "--backend",
            "builtin",
            "--best-effort",
            "--emit-dot",
        ])
        .unwrap();
        assert_eq!(args.input, "demos/mern.toml");
        assert_eq!(args.output_dir.as_deref(), Some("out"));
        assert_eq!(args.format, Some(FormatArg::Svg));
        assert_eq!(args.backend, Some(BackendArg::Builtin));
        assert!(args.best_effort);
        assert!(args.emit_dot);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["astrolabe", "in.toml"]).unwrap();
        assert!(args.format.is_none());
        assert!(args.backend.is_none());
        assert!(!args.best_effort);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["astrolabe", "in.toml", "-f", "bmp"]).is_err());
    }
}
