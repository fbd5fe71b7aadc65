pub mod config;
pub mod debug;
pub mod log;
pub mod run;
pub mod show;

use provision_core::error::ResolveError;
use provision_core::report::Report;
use std::io::Write;
use tracing::debug;

/// How a driver loop ended. Only `main` turns this into an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The whole stream was consumed.
    Completed,
    /// A task failed; the rest was not attempted.
    Stopped,
    /// The operator quit.
    Quit,
}

fn print_diagnostic(out: &mut impl Write, error: &ResolveError) -> std::io::Result<()> {
    debug!("{}", error);
    writeln!(out, "{}", error)
}

fn print_result(out: &mut impl Write, report: &Report) -> anyhow::Result<()> {
    if report.is_success() {
        writeln!(out, "success: {}", report.task)?;
    } else {
        writeln!(out, "error: {}", report.task)?;
        writeln!(out, "{}", serde_json::to_string_pretty(&report.output)?)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use provision_core::report::Report;
    use provision_core::runner::{RetryPolicy, TaskRunner};
    use provision_core::task::{Status, Task};
    use std::io::Write;
    use std::sync::Mutex;

    /// Pretends to run tasks: every task succeeds unless listed as failing.
    #[derive(Default)]
    pub struct ScriptedRunner {
        failing: Vec<Task>,
        calls: Mutex<Vec<(Task, RetryPolicy)>>,
    }

    impl ScriptedRunner {
        pub fn failing(tasks: Vec<Task>) -> Self {
            Self {
                failing: tasks,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(Task, RetryPolicy)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn tasks_run(&self) -> Vec<Task> {
            self.calls().into_iter().map(|(t, _)| t).collect()
        }

        fn report(&self, task: Task, policy: RetryPolicy) -> Report {
            self.calls.lock().unwrap().push((task.clone(), policy));
            let status = if self.failing.contains(&task) {
                Status::Failure
            } else {
                Status::Success
            };
            let output = match &task {
                Task::Shell(command) => vec![format!("ran {}", command)],
                Task::Fetch(_) => Vec::new(),
            };
            Report::new(task, status, output)
        }
    }

    #[async_trait::async_trait]
    impl TaskRunner for ScriptedRunner {
        async fn execute(&self, command: &str, policy: RetryPolicy, out: &mut (dyn Write + Send)) -> Report {
            let _ = writeln!(out, "ran {}", command);
            self.report(Task::shell(command), policy)
        }

        async fn materialize(&self, key: &str, target: &str) -> Report {
            self.report(Task::fetch(key, target), RetryPolicy::once())
        }
    }
}
