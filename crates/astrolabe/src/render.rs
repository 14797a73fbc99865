//! Rendering of frozen graphs into artifacts on disk.
//!
//! # Pipeline Position
//!
//! ```text
//! FrozenGraph
//!     ↓ dot::translate
//! DOT source
//!     ↓ Backend::render (skipped for OutputFormat::Dot)
//! Artifact bytes
//!     ↓ Renderer (path resolution, directory creation, write)
//! Artifact
//! ```
//!
//! # Available Backends
//!
//! - [`GraphvizBackend`] - runs the Graphviz `dot` executable (feature `graphviz`)
//! - [`BuiltinBackend`] - pure-Rust layout producing SVG only
//!
//! Nothing touches the filesystem until the backend has returned its bytes, so
//! a failed diagram never leaves a partial artifact behind.

pub mod backend;
mod builtin;
pub mod dot;
#[cfg(feature = "graphviz")]
mod graphviz;

use std::{
    fmt, fs,
    path::{Component, Path, PathBuf},
};

use log::{debug, info, trace, warn};
use serde::Deserialize;

pub use backend::{Backend, BackendError, RenderRequest};
pub use builtin::BuiltinBackend;
#[cfg(feature = "graphviz")]
pub use graphviz::GraphvizBackend;

use crate::{
    config::{AppConfig, BackendKind, StyleConfig},
    error::{AstrolabeError, RenderError},
    model::{DiagramConfig, FrozenGraph},
};

/// Artifact file format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
    Jpg,
    Pdf,
    /// The DOT source itself; no backend is invoked.
    Dot,
}

impl OutputFormat {
    pub const ALL: [Self; 5] = [Self::Png, Self::Svg, Self::Jpg, Self::Pdf, Self::Dot];

    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Jpg => "jpg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }

    /// Recognizes a file extension, case-insensitively. `jpeg` maps to [`Self::Jpg`].
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "jpg" | "jpeg" => Some(Self::Jpg),
            "pdf" => Some(Self::Pdf),
            "dot" | "gv" => Some(Self::Dot),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered diagram written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    title: String,
    path: PathBuf,
    format: OutputFormat,
}

impl Artifact {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Turns frozen graphs into files using a [`Backend`].
pub struct Renderer {
    output_dir: PathBuf,
    default_format: OutputFormat,
    emit_dot_source: bool,
    style: StyleConfig,
    backend: Box<dyn Backend>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("output_dir", &self.output_dir)
            .field("default_format", &self.default_format)
            .field("emit_dot_source", &self.emit_dot_source)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Renderer {
    /// A renderer writing PNG files to the current directory.
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            output_dir: PathBuf::from("."),
            default_format: OutputFormat::default(),
            emit_dot_source: false,
            style: StyleConfig::default(),
            backend: Box::new(backend),
        }
    }

    /// Builds a renderer from the `[output]`, `[build]` and `[style]` sections.
    ///
    /// # Errors
    ///
    /// Returns [`AstrolabeError::Config`] if the configured backend was not
    /// compiled in.
    pub fn from_config(config: &AppConfig) -> Result<Self, AstrolabeError> {
        let renderer = match config.build().backend() {
            #[cfg(feature = "graphviz")]
            BackendKind::Graphviz => Self::new(GraphvizBackend::new()),
            #[cfg(not(feature = "graphviz"))]
            BackendKind::Graphviz => {
                return Err(AstrolabeError::Config(
                    "the graphviz backend is not available in this build".to_string(),
                ));
            }
            BackendKind::Builtin => Self::new(BuiltinBackend::new()),
        };

        Ok(renderer
            .with_output_dir(config.output().directory())
            .with_format(config.output().format())
            .with_emit_dot_source(config.output().emit_dot_source())
            .with_style(config.style().clone()))
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Format for diagrams that do not choose one themselves.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Also write the DOT source next to every non-DOT artifact.
    pub fn with_emit_dot_source(mut self, emit: bool) -> Self {
        self.emit_dot_source = emit;
        self
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Where a diagram with `config` is written, and in which format.
    ///
    /// The file name is the config's output identifier plus the format's
    /// extension. An override that already ends in a known extension is used
    /// verbatim and picks the format, unless the diagram sets one explicitly.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidOutputPath`] if the override is absolute or
    /// climbs out of the output directory with `..`.
    pub fn resolve_target(
        &self,
        config: &DiagramConfig,
    ) -> Result<(PathBuf, OutputFormat), RenderError> {
        let identifier = config.output_identifier();
        let escapes = Path::new(&identifier).components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(RenderError::InvalidOutputPath {
                diagram: config.title().to_string(),
                path: identifier,
            });
        }

        let suffix = config
            .output_path_override()
            .and_then(|path| Path::new(path).extension())
            .and_then(|ext| ext.to_str())
            .and_then(OutputFormat::from_extension);
        let format = config.format().or(suffix).unwrap_or(self.default_format);

        let path = if suffix == Some(format) {
            self.output_dir.join(&identifier)
        } else {
            self.output_dir
                .join(format!("{identifier}.{}", format.extension()))
        };
        Ok((path, format))
    }

    /// Renders `graph` and writes the artifact.
    ///
    /// An existing file at the target path is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedFormat`] or [`RenderError::Backend`]
    /// if the backend cannot produce the artifact, [`RenderError::Write`] if
    /// the filesystem write fails.
    pub fn render(&self, graph: &FrozenGraph) -> Result<Artifact, AstrolabeError> {
        let title = graph.title();
        let (path, format) = self.resolve_target(graph.config())?;

        let dot = dot::to_dot_string(graph, &self.style);
        trace!(title, dot = dot.as_str(); "Translated diagram to DOT");

        let bytes = if format == OutputFormat::Dot {
            dot.clone().into_bytes()
        } else {
            if !self.backend.supports(format) {
                return Err(RenderError::UnsupportedFormat {
                    diagram: title.to_string(),
                    backend: self.backend.name(),
                    format,
                }
                .into());
            }
            let request = RenderRequest::new(graph, &dot, format);
            self.backend
                .render(&request)
                .map_err(|err| RenderError::Backend {
                    diagram: title.to_string(),
                    backend: self.backend.name(),
                    message: err.to_string(),
                })?
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Write {
                diagram: title.to_string(),
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if path.exists() {
            warn!(title, path = path.display().to_string(); "Overwriting existing artifact");
        }
        write_file(title, &path, &bytes)?;

        if self.emit_dot_source && format != OutputFormat::Dot {
            let dot_path = path.with_extension(OutputFormat::Dot.extension());
            write_file(title, &dot_path, dot.as_bytes())?;
            debug!(path = dot_path.display().to_string(); "Wrote DOT source");
        }

        info!(
            title,
            path = path.display().to_string(),
            format:%,
            backend = self.backend.name();
            "Diagram rendered"
        );

        Ok(Artifact {
            title: title.to_string(),
            path,
            format,
        })
    }
}

fn write_file(title: &str, path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    fs::write(path, bytes).map_err(|source| RenderError::Write {
        diagram: title.to_string(),
        path: path.to_path_buf(),
        source,
    })
}
