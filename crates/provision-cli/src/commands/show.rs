use super::{print_diagnostic, Outcome};
use provision_core::client::KeyValueClient;
use provision_core::report::ReportStore;
use provision_core::resolver::ScriptResolver;
use std::io::Write;

/// Prints every task of the script with its current status. Read-only.
pub async fn run(
    client: &dyn KeyValueClient,
    store: &ReportStore,
    key: &str,
    out: &mut impl Write,
) -> anyhow::Result<Outcome> {
    let mut resolver = ScriptResolver::new(client, store, key);
    while let Some(item) = resolver.next().await {
        match item {
            Ok(resolved) => writeln!(out, "{}: {}", resolved.status, resolved.task)?,
            Err(e) => print_diagnostic(out, &e)?,
        }
    }
    Ok(Outcome::Completed)
}
