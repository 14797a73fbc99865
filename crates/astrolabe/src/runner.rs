//! Sequential multi-diagram builds.
//!
//! A [`BuildRun`] is an ordered list of [`DiagramDefinition`]s. Each one is
//! declared into a fresh [`GraphAssembler`], frozen and rendered before the next
//! one starts, so no ids or state cross diagram boundaries. What happens after
//! a failure is decided by the run's [`FailurePolicy`].

use std::fmt;

use log::{error, info, warn};
use serde::Deserialize;

use crate::{
    assembler::{DiagramScope, GraphAssembler},
    error::AstrolabeError,
    model::{DiagramConfig, FrozenGraph},
    render::{Artifact, Renderer},
};

/// How a build run reacts to a failing diagram.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing diagram and return its error.
    #[default]
    FailFast,
    /// Keep going and collect every failure in the [`BuildReport`].
    BestEffort,
}

type Declare = Box<dyn FnOnce(&mut DiagramScope<'_>) -> Result<(), AstrolabeError>>;

/// A diagram configuration paired with the procedure declaring its contents.
pub struct DiagramDefinition {
    config: DiagramConfig,
    declare: Declare,
}

impl fmt::Debug for DiagramDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramDefinition")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DiagramDefinition {
    pub fn new<F>(config: DiagramConfig, declare: F) -> Self
    where
        F: FnOnce(&mut DiagramScope<'_>) -> Result<(), AstrolabeError> + 'static,
    {
        Self {
            config,
            declare: Box::new(declare),
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    /// Declares the diagram into a fresh assembler and freezes it.
    ///
    /// # Errors
    ///
    /// Any error raised by the declaration procedure, or a [`StateError`]
    /// if it left clusters open. The partial diagram is discarded.
    ///
    /// [`StateError`]: crate::StateError
    pub fn build(self) -> Result<FrozenGraph, AstrolabeError> {
        let mut assembler = GraphAssembler::new();
        assembler.open_diagram(self.config)?;

        let declared = (self.declare)(&mut DiagramScope::new(&mut assembler));
        let result = match declared {
            Ok(()) => assembler.close_diagram().map_err(AstrolabeError::from),
            Err(err) => Err(err),
        };

        if result.is_err() {
            assembler.abandon();
        }
        result
    }
}

/// One diagram that did not produce an artifact.
#[derive(Debug)]
pub struct DiagramFailure {
    index: usize,
    title: String,
    error: AstrolabeError,
}

impl DiagramFailure {
    /// Position of the definition in its run, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn error(&self) -> &AstrolabeError {
        &self.error
    }

    pub fn into_error(self) -> AstrolabeError {
        self.error
    }
}

/// Outcome of a build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    artifacts: Vec<Artifact>,
    failures: Vec<DiagramFailure>,
}

impl BuildReport {
    /// Artifacts in definition order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn failures(&self) -> &[DiagramFailure] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The artifacts, or the first failure's error.
    pub fn into_result(self) -> Result<Vec<Artifact>, AstrolabeError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.artifacts),
        }
    }
}

/// An ordered list of diagram definitions built in one invocation.
///
/// # Examples
///
/// ```no_run
/// use astrolabe::{BuildRun, DiagramConfig, FailurePolicy, GraphvizBackend, Renderer};
///
/// let report = BuildRun::new()
///     .with_policy(FailurePolicy::BestEffort)
///     .diagram(DiagramConfig::new("Web Service"), |scope| {
///         let lb = scope.node("lb", "elb")?;
///         let web = scope.cluster("Web Tier", |scope| {
///             (1..=3)
///                 .map(|i| scope.node(format!("web{i}"), "server"))
///                 .collect::<Result<Vec<_>, _>>()
///         })?;
///         scope.link(lb, web)?;
///         Ok(())
///     })
///     .execute(&Renderer::new(GraphvizBackend::new()))?;
/// assert_eq!(report.artifacts().len(), 1);
/// # Ok::<(), astrolabe::AstrolabeError>(())
/// ```
#[derive(Debug, Default)]
pub struct BuildRun {
    policy: FailurePolicy,
    definitions: Vec<DiagramDefinition>,
}

impl BuildRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Appends a diagram declared by `declare`.
    pub fn diagram<F>(self, config: DiagramConfig, declare: F) -> Self
    where
        F: FnOnce(&mut DiagramScope<'_>) -> Result<(), AstrolabeError> + 'static,
    {
        self.push(DiagramDefinition::new(config, declare))
    }

    pub fn push(mut self, definition: DiagramDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(DiagramDefinition::title)
    }

    /// Builds and renders every definition in order.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::FailFast`] the first failing diagram's error;
    /// later definitions are not attempted. Under
    /// [`FailurePolicy::BestEffort`] failures are collected in the report and
    /// this never fails.
    pub fn execute(self, renderer: &Renderer) -> Result<BuildReport, AstrolabeError> {
        let total = self.definitions.len();
        info!(
            diagrams = total,
            policy:? = self.policy,
            backend = renderer.backend_name();
            "Starting build run"
        );

        let mut report = BuildReport::default();
        for (index, definition) in self.definitions.into_iter().enumerate() {
            let title = definition.title().to_string();
            info!(index, title; "Building diagram");

            let result = definition
                .build()
                .and_then(|graph| renderer.render(&graph));

            match result {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(err) => match self.policy {
                    FailurePolicy::FailFast => {
                        error!(index, title, err:err; "Diagram failed, aborting run");
                        return Err(err);
                    }
                    FailurePolicy::BestEffort => {
                        warn!(index, title, err:err; "Diagram failed, continuing");
                        report.failures.push(DiagramFailure {
                            index,
                            title,
                            error: err,
                        });
                    }
                },
            }
        }

        info!(
            artifacts = report.artifacts.len(),
            failures = report.failures.len();
            "Build run finished"
        );
        Ok(report)
    }
}
