//! Sequential step runner for the CLI orchestrators.
//!
//! Steps run in order and the first failure halts the run. There is no
//! retry and no rollback; outputs written by earlier steps stay on disk.

use indicatif::ProgressBar;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the step succeeded.
    pub success: bool,
    /// Captured output, or the error message of an in-process step.
    pub output: String,
}

impl StepOutcome {
    /// A successful outcome.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    /// A failed outcome.
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// One unit of work in a [`Pipeline`].
pub trait Step: fmt::Debug {
    /// Name shown in progress and failure messages.
    fn name(&self) -> &str;

    /// Run the step to completion.
    fn run(&self) -> StepOutcome;
}

/// A step that runs an external program and waits for it.
///
/// Success is a zero exit status. Stdout and stderr are captured.
#[derive(Debug, Clone)]
pub struct CommandStep {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandStep {
    /// Run `program` with no arguments.
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Step for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> StepOutcome {
        let output = match Command::new(&self.program).args(&self.args).output() {
            Ok(output) => output,
            Err(e) => {
                return StepOutcome::failed(format!(
                    "could not start {}: {e}",
                    self.program.display()
                ));
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            StepOutcome::ok(text)
        } else {
            StepOutcome::failed(text)
        }
    }
}

type Action = Box<dyn Fn() -> Result<String, String>>;

/// A step that calls a function in this process.
pub struct InProcessStep {
    name: String,
    action: Action,
}

impl InProcessStep {
    /// Wrap `action`; an `Err` marks the step as failed.
    pub fn new<F, E>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Result<(), E> + 'static,
        E: fmt::Display,
    {
        Self::reporting(name, move || action().map(|()| String::new()))
    }

    /// Wrap `action` whose `Ok` text becomes the step's output.
    pub fn reporting<F, E>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Result<String, E> + 'static,
        E: fmt::Display,
    {
        Self {
            name: name.into(),
            action: Box::new(move || action().map_err(|e| e.to_string())),
        }
    }
}

impl fmt::Debug for InProcessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcessStep")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Step for InProcessStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> StepOutcome {
        match (self.action)() {
            Ok(output) => StepOutcome::ok(output),
            Err(e) => StepOutcome::failed(e),
        }
    }
}

/// The step that halted a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Step name.
    pub step: String,
    /// Its captured output or error message.
    pub output: String,
}

/// Error returned when a pipeline halts.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A step failed.
    #[error("{pipeline}: step '{step}' failed")]
    StepFailed {
        /// Pipeline name.
        pipeline: String,
        /// Failing step.
        step: String,
        /// Captured output of the failing step.
        output: String,
    },
}

/// What a pipeline run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Pipeline name.
    pub pipeline: String,
    /// Steps that completed, in order.
    pub completed: Vec<String>,
    /// Output of each completed step, paired with its name.
    pub outputs: Vec<(String, String)>,
    /// The step that halted the run, if any.
    pub failed: Option<StepFailure>,
}

impl PipelineReport {
    /// Whether every step completed.
    pub const fn succeeded(&self) -> bool {
        self.failed.is_none()
    }

    /// Convert a halted run into an error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StepFailed`] if a step failed.
    pub fn into_result(self) -> Result<Vec<String>, PipelineError> {
        match self.failed {
            None => Ok(self.completed),
            Some(failure) => Err(PipelineError::StepFailed {
                pipeline: self.pipeline,
                step: failure.step,
                output: failure.output,
            }),
        }
    }
}

/// An ordered list of steps.
#[derive(Debug)]
pub struct Pipeline {
    name: String,
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step names in run order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.name())
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order without progress output.
    pub fn run(&self) -> PipelineReport {
        self.run_with_progress(None)
    }

    /// Run every step in order, advancing `progress` after each one.
    pub fn run_with_progress(&self, progress: Option<&ProgressBar>) -> PipelineReport {
        let mut completed = Vec::new();
        let mut outputs = Vec::new();

        for step in &self.steps {
            if let Some(pb) = progress {
                pb.set_message(step.name().to_string());
            }
            info!(pipeline = %self.name, step = step.name(), "running step");

            let outcome = step.run();
            if !outcome.success {
                warn!(pipeline = %self.name, step = step.name(), "step failed");
                if let Some(pb) = progress {
                    pb.abandon_with_message(format!("Failed at {}", step.name()));
                }
                return PipelineReport {
                    pipeline: self.name.clone(),
                    completed,
                    outputs,
                    failed: Some(StepFailure {
                        step: step.name().to_string(),
                        output: outcome.output,
                    }),
                };
            }

            completed.push(step.name().to_string());
            outputs.push((step.name().to_string(), outcome.output));
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} complete", self.name));
        }
        PipelineReport {
            pipeline: self.name.clone(),
            completed,
            outputs,
            failed: None,
        }
    }
}
