use crate::report::Report;
use crate::task::Task;
use std::io::Write;
use std::time::Duration;

pub const ATTEMPTS_DEFAULT: u32 = 4;
pub const PAUSE_DEFAULT: Duration = Duration::from_secs(10);

/// How many times a shell task is tried, and how long to wait in between.
///
/// Zero attempts is treated as one: a task that is dispatched always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub pause: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, pause: Duration) -> Self {
        Self { attempts, pause }
    }

    /// Single attempt, used for interactive execution.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn effective_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(ATTEMPTS_DEFAULT, PAUSE_DEFAULT)
    }
}

/// Carries out concrete tasks. Live output goes to `out`.
///
/// Failures are reported through the returned `Report`, never as errors.
#[async_trait::async_trait]
pub trait TaskRunner: Send + Sync {
    /// Runs a shell command through the platform shell.
    async fn execute(&self, command: &str, policy: RetryPolicy, out: &mut (dyn Write + Send)) -> Report;

    /// Writes the remote value at `key` verbatim into `target`.
    async fn materialize(&self, key: &str, target: &str) -> Report;

    async fn dispatch(&self, task: &Task, policy: RetryPolicy, out: &mut (dyn Write + Send)) -> Report {
        match task {
            Task::Shell(command) => self.execute(command, policy, out).await,
            Task::Fetch(fetch) => self.materialize(&fetch.key, &fetch.target).await,
        }
    }
}
