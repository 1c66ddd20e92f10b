//! Handles to spawned stress-tool processes.
//!
//! The registry only talks to [`StressProcess`] and [`ProcessSpawner`], so the
//! OS-level spawning in [`CommandSpawner`] can be swapped for a fake in tests.

use std::io;
use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::job::StressArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The signal was delivered to a running process.
    Signalled,
    /// The process had already exited on its own.
    AlreadyExited,
}

pub trait StressProcess: Send {
    fn pid(&self) -> u32;

    /// Non-blocking liveness check.
    fn is_alive(&mut self) -> bool;

    fn terminate(&mut self) -> io::Result<Termination>;
}

pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, args: &StressArgs) -> io::Result<Box<dyn StressProcess>>;

    /// Executable name, used in error messages.
    fn program(&self) -> &str;
}

/// Spawns the external stress tool, e.g.
/// `stress-ng --cpu 2 --timeout 60s --metrics-brief`.
#[derive(Debug, Clone)]
pub struct CommandSpawner {
    program: String,
}

impl CommandSpawner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn command_args(args: &StressArgs) -> Vec<String> {
        vec![
            "--cpu".to_string(),
            args.cpu.to_string(),
            "--timeout".to_string(),
            format!("{}s", args.timeout),
            "--metrics-brief".to_string(),
        ]
    }
}

impl ProcessSpawner for CommandSpawner {
    fn spawn(&self, args: &StressArgs) -> io::Result<Box<dyn StressProcess>> {
        let child = Command::new(&self.program)
            .args(Self::command_args(args))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // own process group so workers forked by the tool are signalled too
            .process_group(0)
            .spawn()?;

        let pid = child.id().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "child exited before its pid was read")
        })?;

        Ok(Box::new(ChildProcess { pid, child }))
    }

    fn program(&self) -> &str {
        &self.program
    }
}

struct ChildProcess {
    pid: u32,
    child: Child,
}

impl StressProcess for ChildProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self) -> io::Result<Termination> {
        if !self.is_alive() {
            return Ok(Termination::AlreadyExited);
        }

        let pgid = libc::pid_t::try_from(self.pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        // SAFETY: killpg has no memory-safety preconditions.
        let rc = unsafe { libc::killpg(pgid, libc::SIGTERM) };
        if rc == 0 {
            return Ok(Termination::Signalled);
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            Ok(Termination::AlreadyExited)
        } else {
            Err(err)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_stress_ng_arguments() {
        let args = CommandSpawner::command_args(&StressArgs { cpu: 4, timeout: 30 });
        assert_eq!(args, ["--cpu", "4", "--timeout", "30s", "--metrics-brief"]);
    }

    #[tokio::test]
    async fn missing_binary_is_not_found() {
        let spawner = CommandSpawner::new("definitely-not-a-stress-tool-7351");
        let err = match spawner.spawn(&StressArgs { cpu: 1, timeout: 1 }) {
            Ok(_) => panic!("spawn should fail"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn terminate_reports_already_exited() {
        // `true` ignores its arguments and exits immediately
        let spawner = CommandSpawner::new("true");
        let mut proc = spawner
            .spawn(&StressArgs { cpu: 1, timeout: 1 })
            .unwrap();

        for _ in 0..50 {
            if !proc.is_alive() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        assert!(!proc.is_alive());
        assert_eq!(proc.terminate().unwrap(), Termination::AlreadyExited);
    }
}
