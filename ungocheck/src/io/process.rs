//! Helpers for running child processes and capturing their combined output.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument};

/// Captured child process output.
#[derive(Debug)]
pub struct CombinedOutput {
    pub status: ExitStatus,
    /// Stdout and stderr interleaved in arrival order.
    pub output: Vec<u8>,
}

/// Run a command to completion and capture stdout and stderr into one buffer.
///
/// Both pipes are drained concurrently while the child runs, so a chatty
/// child cannot deadlock on a full pipe. There is no timeout.
#[instrument(skip_all, fields(program = ?cmd.get_program()))]
pub fn run_combined(mut cmd: Command) -> Result<CombinedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let sink = Arc::new(Mutex::new(Vec::new()));
    let stdout_handle = {
        let sink = Arc::clone(&sink);
        thread::spawn(move || drain_into(stdout, &sink))
    };
    let stderr_handle = {
        let sink = Arc::clone(&sink);
        thread::spawn(move || drain_into(stderr, &sink))
    };

    let status = child.wait().context("wait for command")?;
    join_reader(stdout_handle).context("join stdout")?;
    join_reader(stderr_handle).context("join stderr")?;

    let output = Arc::try_unwrap(sink)
        .map_err(|_| anyhow!("output buffer still shared"))?
        .into_inner()
        .map_err(|_| anyhow!("output buffer poisoned"))?;

    debug!(exit_code = ?status.code(), bytes = output.len(), "command finished");
    Ok(CombinedOutput { status, output })
}

fn join_reader(handle: thread::JoinHandle<Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn drain_into<R: Read>(mut reader: R, sink: &Mutex<Vec<u8>>) -> Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            return Ok(());
        }
        sink.lock()
            .map_err(|_| anyhow!("output buffer poisoned"))?
            .extend_from_slice(&chunk[..n]);
    }
}
