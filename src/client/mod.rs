//! Thin client over the `packer` executable.
//!
//! Each operation assembles an argv tail from the [`BuildConfig`], runs one
//! subprocess through the [`ProcessRunner`] seam, and waits for completion
//! before returning. A non-zero exit from packer is ordinary result data;
//! only a process that could not be started at all becomes an error.
//!
//! [`Packer`] holds no mutable state, so sharing one instance across tasks
//! is safe exactly when the injected runner is. [`TokioProcessRunner`] is
//! stateless and qualifies.

use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::args::{self, BuildOptions, PushOptions};
use crate::config::BuildConfig;
use crate::error::PackerError;
use crate::inspect::Inspection;
use crate::subprocess::{
    ProcessCommandBuilder, ProcessError, ProcessOutput, ProcessRunner, TokioProcessRunner,
};


/// Executable used when no explicit path is configured.
pub const DEFAULT_EXEC_PATH: &str = "packer";

/// Outcome of `packer validate`.
///
/// `succeeded` reflects the exit status; a failed validation still carries
/// the captured output. `error` is populated only when the packer process
/// could not be invoked at all, which is a different fault than a template
/// that fails to validate.
#[derive(Debug, Clone)]
pub struct Validation {
    pub succeeded: bool,
    pub output: Option<ProcessOutput>,
    pub error: Option<String>,
}

/// Outcome of `packer fix`: the raw run plus, when the run exited zero, the
/// rewritten template parsed from stdout.
#[derive(Debug, Clone)]
pub struct Fix {
    pub output: ProcessOutput,
    pub fixed: Option<Value>,
}

pub struct Packer {
    config: BuildConfig,
    exec_path: String,
    runner: Arc<dyn ProcessRunner>,
}

impl Packer {
    /// Client backed by the production tokio runner.
    pub fn new(config: BuildConfig) -> Self {
        Self::with_runner(config, Arc::new(TokioProcessRunner))
    }

    /// Client backed by an injected runner; tests hand in a
    /// [`MockProcessRunner`](crate::subprocess::MockProcessRunner).
    pub fn with_runner(config: BuildConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            config,
            exec_path: DEFAULT_EXEC_PATH.to_string(),
            runner,
        }
    }

    /// Override the packer executable path, e.g. one returned by
    /// [`Installer::install`](crate::install::Installer::install).
    pub fn exec_path(mut self, path: impl Into<String>) -> Self {
        self.exec_path = path.into();
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run `packer build`. Returns the raw outcome; inspect
    /// [`ProcessOutput::status`] for success.
    pub async fn build(&self, options: &BuildOptions) -> Result<ProcessOutput, PackerError> {
        let args = args::build_args(&self.config, options)?;
        self.run("build", args).await
    }

    /// Run `packer validate` and classify the outcome.
    ///
    /// Never fails for a template that does not validate; an executable that
    /// cannot be started is folded into [`Validation::error`].
    pub async fn validate(&self, syntax_only: bool) -> Result<Validation, PackerError> {
        let args = args::validate_args(&self.config, syntax_only)?;
        match self.run("validate", args).await {
            Ok(output) => Ok(Validation {
                succeeded: output.status.success(),
                output: Some(output),
                error: None,
            }),
            Err(PackerError::Invocation { source, .. }) => Ok(Validation {
                succeeded: false,
                output: None,
                error: Some(source.to_string()),
            }),
            Err(other) => Err(other),
        }
    }

    /// Run `packer fix`, optionally persisting the rewritten template.
    ///
    /// Stdout is written to `to_file` before parsing, so the file holds
    /// whatever packer produced even when parsing fails afterwards.
    pub async fn fix(&self, to_file: Option<&Path>) -> Result<Fix, PackerError> {
        let output = self.run("fix", args::fix_args(&self.config)).await?;

        if let Some(path) = to_file {
            tokio::fs::write(path, &output.stdout)
                .await
                .map_err(|source| PackerError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        let fixed = if output.status.success() {
            let value = serde_json::from_str(&output.stdout).map_err(|e| {
                PackerError::parse(format!("fix output is not valid JSON: {e}"))
            })?;
            Some(value)
        } else {
            None
        };

        Ok(Fix { output, fixed })
    }

    /// Run `packer inspect -machine-readable` and parse the output into
    /// ordered variable, builder, and provisioner records.
    pub async fn inspect(&self) -> Result<Inspection, PackerError> {
        let output = self.run("inspect", args::inspect_args(&self.config)).await?;
        Ok(Inspection::from_output(output.status, &output.stdout))
    }

    /// Run `packer push`. Returns the raw outcome.
    pub async fn push(&self, options: &PushOptions) -> Result<ProcessOutput, PackerError> {
        let args = args::push_args(&self.config, options);
        self.run("push", args).await
    }

    /// Run `packer version` and extract the bare version number.
    pub async fn version(&self) -> Result<String, PackerError> {
        let output = self.run("version", args::version_args()).await?;
        parse_version(&output.stdout)
    }

    /// Whether the configured executable can be spawned at all.
    pub async fn is_available(&self) -> Result<bool, PackerError> {
        match self.run("version", args::version_args()).await {
            Ok(output) => Ok(output.status.success()),
            Err(PackerError::Invocation {
                source: ProcessError::CommandNotFound(_),
                ..
            }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn run(&self, subcommand: &str, args: Vec<String>) -> Result<ProcessOutput, PackerError> {
        let command = ProcessCommandBuilder::new(&self.exec_path)
            .arg(subcommand)
            .args(&args)
            .build();
        self.runner.run(command).await.map_err(|source| {
            PackerError::invocation(format!("{} {}", self.exec_path, subcommand), source)
        })
    }
}

/// Extract the version number from `packer version` output.
///
/// The first line looks like `Packer v1.2.3`; everything after the first
/// literal `v` is the version. Output without a `v` does not match the
/// expected shape and is a parse error.
fn parse_version(output: &str) -> Result<String, PackerError> {
    let first_line = output.lines().next().unwrap_or("");
    match first_line.split_once('v') {
        Some((_, version)) => Ok(version.to_string()),
        None => Err(PackerError::parse(format!(
            "no version marker in {first_line:?}"
        ))),
    }
}
