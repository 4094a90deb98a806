use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

/// Scripted stand-in for [`TokioProcessRunner`]: tests register expected
/// commands with canned responses, then assert on the recorded call history.
///
/// [`TokioProcessRunner`]: super::runner::TokioProcessRunner
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<Expectation>>>,
    calls: Arc<Mutex<Vec<ProcessCommand>>>,
}

struct Expectation {
    program: String,
    #[allow(clippy::type_complexity)]
    matcher: Option<Box<dyn Fn(&[String]) -> bool + Send + Sync>>,
    response: Response,
    remaining: Option<usize>,
}

enum Response {
    Output {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    /// Simulate an executable that cannot be started at all.
    NotFound,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin registering an expectation for `program`. The expectation is
    /// inert until [`ExpectationBuilder::register`] is called.
    pub fn expect(&self, program: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            runner: self.clone(),
            expectation: Expectation {
                program: program.to_string(),
                matcher: None,
                response: Response::Output {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                },
                remaining: None,
            },
        }
    }

    /// Every command handed to the runner, in invocation order.
    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.program == program)
            .count()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());

        let mut expectations = self.expectations.lock().unwrap();
        for expectation in expectations.iter_mut() {
            if expectation.program != command.program {
                continue;
            }
            if let Some(matcher) = &expectation.matcher {
                if !matcher(&command.args) {
                    continue;
                }
            }
            if let Some(remaining) = &mut expectation.remaining {
                if *remaining == 0 {
                    continue;
                }
                *remaining -= 1;
            }

            return match &expectation.response {
                Response::Output {
                    status,
                    stdout,
                    stderr,
                } => Ok(ProcessOutput {
                    status: status.clone(),
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                    duration: Duration::from_millis(1),
                }),
                Response::NotFound => {
                    Err(ProcessError::CommandNotFound(command.program.clone()))
                }
            };
        }

        Err(ProcessError::UnexpectedCommand(command.display()))
    }
}

pub struct ExpectationBuilder {
    runner: MockProcessRunner,
    expectation: Expectation,
}

impl ExpectationBuilder {
    /// Restrict the expectation to commands whose argv matches.
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.matcher = Some(Box::new(matcher));
        self
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        if let Response::Output { stdout: s, .. } = &mut self.expectation.response {
            *s = stdout.to_string();
        }
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        if let Response::Output { stderr: s, .. } = &mut self.expectation.response {
            *s = stderr.to_string();
        }
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        if let Response::Output { status, .. } = &mut self.expectation.response {
            *status = if code == 0 {
                ExitStatus::Success
            } else {
                ExitStatus::Error(code)
            };
        }
        self
    }

    /// Respond as if the executable were absent from PATH.
    pub fn not_found(mut self) -> Self {
        self.expectation.response = Response::NotFound;
        self
    }

    /// Limit how many calls this expectation may satisfy.
    pub fn times(mut self, n: usize) -> Self {
        self.expectation.remaining = Some(n);
        self
    }

    pub fn register(self) {
        self.runner
            .expectations
            .lock()
            .unwrap()
            .push(self.expectation);
    }
}
