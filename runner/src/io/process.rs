//! Collaborator process execution under a single turn deadline.
//!
//! The deadline covers the whole turn: waiting for the child to exit and
//! collecting its output. A model CLI wrapped in a shell can leave
//! descendants holding stdout/stderr open after the direct child is killed,
//! so pipe readers are never joined without a bound.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// How long pipe readers may keep draining once the turn is over.
const PIPE_GRACE: Duration = Duration::from_millis(200);

/// What a collaborator process left behind.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes past the retention limit, summed over both streams.
    pub discarded_bytes: usize,
    /// The turn deadline passed, either before the child exited or while
    /// its pipes were still held open.
    pub timed_out: bool,
}

impl CapturedOutput {
    /// Stderr as lossy UTF-8, trimmed, for error messages.
    pub fn stderr_excerpt(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Drained bytes of one pipe, or nothing if its reader missed the deadline.
#[derive(Debug, Default)]
struct Drained {
    kept: Vec<u8>,
    discarded: usize,
}

/// Spawn `cmd`, feed it `stdin`, and give it `timeout` to exit and release its pipes.
///
/// At most `retain_bytes` of each stream is kept. When the deadline passes
/// the child is killed, and any output still unread after a short grace
/// period is abandoned along with its reader thread.
#[instrument(skip_all, fields(timeout_ms = timeout.as_millis() as u64, retain_bytes = retain_bytes))]
pub fn run_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    retain_bytes: usize,
) -> Result<CapturedOutput> {
    let deadline = Instant::now() + timeout;
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

    debug!(program = ?cmd.get_program(), "spawning collaborator process");
    let mut child = cmd.spawn().map_err(|err| {
        error!(err = %err, "failed to spawn collaborator");
        anyhow!(err).context(format!("spawn {:?}", cmd.get_program()))
    })?;

    let stdout_rx = spawn_reader(child.stdout.take(), retain_bytes, "stdout")?;
    let stderr_rx = spawn_reader(child.stderr.take(), retain_bytes, "stderr")?;

    if let Some(prompt) = stdin {
        let mut pipe = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        let prompt = prompt.to_vec();
        // Off-thread: a child that never reads a large prompt must not stall the deadline.
        thread::spawn(move || {
            if let Err(err) = pipe.write_all(&prompt) {
                warn!(err = %err, "collaborator closed stdin before reading the prompt");
            }
        });
    }

    let remaining = deadline.saturating_duration_since(Instant::now());
    let mut timed_out = false;
    let status = match child.wait_timeout(remaining).context("wait for collaborator")? {
        Some(status) => status,
        None => {
            warn!("collaborator missed the turn deadline, killing");
            timed_out = true;
            child.kill().context("kill collaborator")?;
            child.wait().context("reap collaborator")?
        }
    };

    // A killed child gets only the grace period; a finished one keeps the rest of its budget.
    let collect_until = if timed_out {
        Instant::now() + PIPE_GRACE
    } else {
        deadline.max(Instant::now()) + PIPE_GRACE
    };
    let stdout = collect(&stdout_rx, collect_until, "stdout", &mut timed_out)?;
    let stderr = collect(&stderr_rx, collect_until, "stderr", &mut timed_out)?;

    let discarded_bytes = stdout.discarded + stderr.discarded;
    if discarded_bytes > 0 {
        warn!(discarded_bytes, "collaborator output exceeded retention limit");
    }
    debug!(exit_code = ?status.code(), timed_out, "collaborator finished");
    Ok(CapturedOutput {
        status,
        stdout: stdout.kept,
        stderr: stderr.kept,
        discarded_bytes,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    retain_bytes: usize,
    label: &'static str,
) -> Result<Receiver<Result<Drained>>> {
    let pipe = pipe.ok_or_else(|| anyhow!("{label} was not piped"))?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone if the turn already gave up on this pipe.
        let _ = tx.send(drain(pipe, retain_bytes));
    });
    Ok(rx)
}

/// Wait for a reader until `until`. A late pipe marks the turn as timed out.
fn collect(
    rx: &Receiver<Result<Drained>>,
    until: Instant,
    label: &str,
    timed_out: &mut bool,
) -> Result<Drained> {
    match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
        Ok(drained) => drained.with_context(|| format!("read collaborator {label}")),
        Err(RecvTimeoutError::Timeout) => {
            warn!(stream = label, "pipe still held open by a descendant, abandoning it");
            *timed_out = true;
            Ok(Drained::default())
        }
        Err(RecvTimeoutError::Disconnected) => Err(anyhow!("{label} reader thread panicked")),
    }
}

/// Read `pipe` to EOF, keeping the first `retain_bytes` bytes.
fn drain<R: Read>(mut pipe: R, retain_bytes: usize) -> Result<Drained> {
    let mut drained = Drained::default();
    let mut chunk = [0u8; 8192];
    loop {
        let n = pipe.read(&mut chunk)?;
        if n == 0 {
            return Ok(drained);
        }
        let keep = n.min(retain_bytes.saturating_sub(drained.kept.len()));
        drained.kept.extend_from_slice(&chunk[..keep]);
        drained.discarded += n - keep;
    }
}
