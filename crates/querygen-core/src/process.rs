//! Blocking external-process invocation with exit-status reporting.
//!
//! Every tool the pipeline runs goes through [`run`], so callers always get
//! the exit status back and branch on it.
//!
//! With a timeout armed on Unix, the tool becomes the leader of a new process
//! group and expiry kills the whole group, so compilers forked by `make` go
//! down with it.

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// Interval between `try_wait` polls while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How an external tool finished.
#[derive(Debug)]
pub enum ToolOutcome {
    /// The tool exited on its own.
    Exited {
        status: ExitStatus,
        elapsed: Duration,
    },

    /// The timeout expired; the tool was killed and reaped.
    TimedOut { elapsed: Duration },
}

impl ToolOutcome {
    /// True if the tool exited with status zero.
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited { status, .. } if status.success())
    }

    /// Exit code, if the tool exited normally.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited { status, .. } => status.code(),
            Self::TimedOut { .. } => None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Exited { elapsed, .. } | Self::TimedOut { elapsed } => *elapsed,
        }
    }
}

/// Spawn `cmd` and block until it exits or `timeout` expires.
///
/// Spawn failures (missing program, permissions) are returned as `Err`;
/// a non-zero exit is not an error here.
pub fn run(cmd: &mut Command, timeout: Option<Duration>) -> io::Result<ToolOutcome> {
    tracing::debug!("Running {:?}", cmd);

    if timeout.is_some() {
        own_process_group(cmd);
    }

    let start = Instant::now();
    let mut child = cmd.spawn()?;

    let Some(timeout) = timeout else {
        let status = child.wait()?;
        return Ok(ToolOutcome::Exited {
            status,
            elapsed: start.elapsed(),
        });
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(ToolOutcome::Exited {
                status,
                elapsed: start.elapsed(),
            });
        }

        if start.elapsed() >= timeout {
            if let Err(e) = kill_tree(&mut child) {
                tracing::warn!("Failed to kill {:?}: {}", cmd.get_program(), e);
            }
            child.wait()?;
            return Ok(ToolOutcome::TimedOut {
                elapsed: start.elapsed(),
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn own_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_cmd: &mut Command) {}

/// Kill the process group led by `child`.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // Safety: plain syscall; a negative pid addresses the group.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        // Group already gone.
        Some(libc::ESRCH) => Ok(()),
        _ => Err(err),
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    match child.kill() {
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}
