use std::io;

use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec_dot,
};
use log::debug;

use super::{
    OutputFormat,
    backend::{Backend, BackendError, RenderRequest},
};

/// Backend that pipes DOT through the Graphviz `dot` executable.
///
/// The executable must be on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphvizBackend;

impl GraphvizBackend {
    pub fn new() -> Self {
        Self
    }
}

fn command_format(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Png => Format::Png,
        OutputFormat::Svg => Format::Svg,
        OutputFormat::Jpg => Format::Jpg,
        OutputFormat::Pdf => Format::Pdf,
        OutputFormat::Dot => Format::Dot,
    }
}

impl Backend for GraphvizBackend {
    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn supports(&self, _format: OutputFormat) -> bool {
        true
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, BackendError> {
        debug!(
            title = request.graph().title(),
            format:% = request.format();
            "Invoking dot"
        );

        exec_dot(
            request.dot().to_string(),
            vec![CommandArg::Format(command_format(request.format()))],
        )
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => BackendError::new(
                "the `dot` executable was not found; install Graphviz or use the builtin backend",
            ),
            _ => BackendError::new(err.to_string()),
        })
    }
}
