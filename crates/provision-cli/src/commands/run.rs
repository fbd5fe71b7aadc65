use super::{print_diagnostic, print_result, Outcome};
use provision_core::client::KeyValueClient;
use provision_core::report::ReportStore;
use provision_core::resolver::ScriptResolver;
use provision_core::runner::{RetryPolicy, TaskRunner};
use std::io::Write;
use tracing::info;

/// Executes every task not yet successful, writing a report after each one.
/// Stops at the first failure; a later run resumes there since successful
/// tasks are skipped.
pub async fn run(
    client: &dyn KeyValueClient,
    store: &ReportStore,
    runner: &dyn TaskRunner,
    key: &str,
    policy: RetryPolicy,
    out: &mut (impl Write + Send),
) -> anyhow::Result<Outcome> {
    let mut resolver = ScriptResolver::new(client, store, key);

    while let Some(item) = resolver.next().await {
        let resolved = match item {
            Ok(resolved) => resolved,
            Err(e) => {
                print_diagnostic(out, &e)?;
                continue;
            }
        };

        if resolved.status.is_success() {
            writeln!(out, "skipping: {}", resolved.task)?;
            continue;
        }

        writeln!(out, "executing: {}", resolved.task)?;
        let report = runner.dispatch(&resolved.task, policy, &mut *out).await;
        store.write(&resolved.hash, &report)?;
        print_result(out, &report)?;

        if !report.is_success() {
            info!("Stopping at {}", resolved.task);
            return Ok(Outcome::Stopped);
        }
    }

    Ok(Outcome::Completed)
}
