//! Test runner adapter for `go test`.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::io::process::run_combined;

/// Result of one test command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Stdout and stderr, interleaved.
    pub output: Vec<u8>,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub success: bool,
}

/// Abstraction over the native test command.
pub trait TestRunner {
    /// Run the command with `args` and wait for it to finish.
    ///
    /// `Err` means the command could not be run at all; a failing test run
    /// is reported through [`RunOutput::success`].
    fn run(&self, args: &[String]) -> Result<RunOutput>;
}

impl<R: TestRunner + ?Sized> TestRunner for &R {
    fn run(&self, args: &[String]) -> Result<RunOutput> {
        (**self).run(args)
    }
}

/// Runner that spawns the `go` tool in a working directory.
#[derive(Debug, Clone)]
pub struct GoTestRunner {
    program: String,
    workdir: PathBuf,
}

impl GoTestRunner {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }
}

impl TestRunner for GoTestRunner {
    #[instrument(skip_all, fields(program = %self.program))]
    fn run(&self, args: &[String]) -> Result<RunOutput> {
        info!(args = ?args, "running go");
        let mut cmd = Command::new(&self.program);
        cmd.args(args).current_dir(&self.workdir);
        let out = run_combined(cmd).with_context(|| format!("run {}", self.program))?;
        Ok(RunOutput {
            output: out.output,
            code: out.status.code(),
            success: out.status.success(),
        })
    }
}
