use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::error::{Result, StressError};
use crate::job::{StressJob, StressRequest};
use crate::process::{ProcessSpawner, StressProcess, Termination};

struct Entry {
    job: StressJob,
    process: Box<dyn StressProcess>,
}

/// In-memory table of running stress jobs, in insertion order.
///
/// One instance is created at startup and shared with every handler; there is
/// no global state. A single mutex guards all operations.
pub struct Registry {
    spawner: Arc<dyn ProcessSpawner>,
    entries: Mutex<Vec<Entry>>,
}

impl Registry {
    pub fn new(spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            spawner,
            entries: Mutex::new(Vec::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates the request, spawns the stress tool and records the job.
    /// Spawning does not wait for the process.
    pub fn start(&self, request: &StressRequest) -> Result<StressJob> {
        let args = request.validate()?;

        let process = self.spawner.spawn(&args).map_err(|e| {
            tracing::error!(program = self.spawner.program(), error = %e, "Failed to start stress tool");
            spawn_error(self.spawner.program(), e)
        })?;

        let job = StressJob {
            process_id: process.pid(),
            cpu: args.cpu,
            timeout: args.timeout,
            started_at: Utc::now(),
        };

        let mut entries = self.entries();
        // a pid can only repeat once the OS has recycled it, so the old entry is dead
        entries.retain(|e| e.job.process_id != job.process_id);
        entries.push(Entry {
            job: job.clone(),
            process,
        });

        tracing::info!(
            pid = job.process_id,
            cpu = job.cpu,
            timeout = job.timeout,
            total = entries.len(),
            "Started stress job"
        );
        Ok(job)
    }

    /// Jobs whose process is still running. Finished ones are dropped on the way.
    pub fn list(&self) -> Vec<StressJob> {
        let mut entries = self.entries();
        entries.retain_mut(|e| {
            let alive = e.process.is_alive();
            if !alive {
                tracing::info!(pid = e.job.process_id, "Cleaned up finished stress job");
            }
            alive
        });
        entries.iter().map(|e| e.job.clone()).collect()
    }

    /// Signals the job's process and forgets it.
    ///
    /// A job that already exited is removed all the same. If the signal cannot
    /// be delivered for another reason the entry stays so the call can be retried.
    pub fn stop(&self, pid: u32) -> Result<String> {
        let mut entries = self.entries();
        let index = entries
            .iter()
            .position(|e| e.job.process_id == pid)
            .ok_or(StressError::NotFound(pid))?;

        let mut entry = entries.remove(index);
        match entry.process.terminate() {
            Ok(Termination::Signalled) => {
                tracing::info!(pid, "Stopped stress job");
                Ok(format!("Stress process {} stopped successfully", pid))
            }
            Ok(Termination::AlreadyExited) => {
                tracing::info!(pid, "Stress job had already exited");
                Ok(format!("Process {} was already terminated", pid))
            }
            Err(e) => {
                tracing::error!(pid, error = %e, "Failed to stop stress job");
                entries.insert(index, entry);
                Err(StressError::Terminate {
                    pid,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Removes every job whose process has exited and returns their ids.
    pub fn reap(&self) -> Vec<u32> {
        let mut reaped = Vec::new();
        self.entries().retain_mut(|e| {
            if e.process.is_alive() {
                true
            } else {
                reaped.push(e.job.process_id);
                false
            }
        });
        for pid in &reaped {
            tracing::info!(pid, "Reaped finished stress job");
        }
        reaped
    }

    /// Terminates and drops every remaining job.
    pub fn shutdown(&self) {
        let drained: Vec<Entry> = self.entries().drain(..).collect();
        for mut entry in drained {
            let pid = entry.job.process_id;
            match entry.process.terminate() {
                Ok(Termination::Signalled) => tracing::info!(pid, "Stopped stress job on shutdown"),
                Ok(Termination::AlreadyExited) => {}
                Err(e) => tracing::warn!(pid, error = %e, "Could not stop stress job on shutdown"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn spawn_error(program: &str, err: io::Error) -> StressError {
    if err.kind() == io::ErrorKind::NotFound {
        StressError::Spawn(format!(
            "{} is not installed. Please install it: apt-get install stress-ng",
            program
        ))
    } else {
        StressError::Spawn(format!("Failed to start stress test: {}", err))
    }
}

/// Periodically drops jobs whose process exited after its timeout.
pub fn spawn_reaper(registry: Arc<Registry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reaped = registry.reap();
            if !reaped.is_empty() {
                tracing::debug!(count = reaped.len(), remaining = registry.len(), "Reaper pass");
            }
        }
    })
}
