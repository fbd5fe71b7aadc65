use super::{print_diagnostic, print_result, Outcome};
use provision_core::client::KeyValueClient;
use provision_core::report::ReportStore;
use provision_core::resolver::ScriptResolver;
use provision_core::runner::{RetryPolicy, TaskRunner};
use std::io::{BufRead, Write};

/// Steps through the script, asking the operator what to do with each task.
/// Quitting (or any unknown answer) ends the loop between tasks.
pub async fn run(
    client: &dyn KeyValueClient,
    store: &ReportStore,
    runner: &dyn TaskRunner,
    key: &str,
    input: &mut impl BufRead,
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
            writeln!(out, "already executed: {}", resolved.task)?;
            writeln!(out, "(s)kip, (e)xecute anyway, or (q)uit?")?;
        } else {
            writeln!(out, "next: {}", resolved.task)?;
            writeln!(out, "(e)xecute, (s)kip, or (q)uit?")?;
        }
        out.flush()?;

        match read_choice(input)?.as_str() {
            "s" => continue,
            "e" => {
                let report = runner.dispatch(&resolved.task, RetryPolicy::once(), &mut *out).await;
                print_result(out, &report)?;

                writeln!(out, "write report? (y)es or (n)o")?;
                out.flush()?;
                if read_choice(input)? == "y" {
                    store.write(&resolved.hash, &report)?;
                }
            }
            _ => return Ok(Outcome::Quit),
        }
    }

    Ok(Outcome::Completed)
}

/// Next answer, trimmed. End of input reads as an empty answer.
fn read_choice(input: &mut impl BufRead) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
