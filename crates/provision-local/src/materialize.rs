use provision_core::client::KeyValueClient;
use provision_core::report::Report;
use provision_core::task::{Status, Task};
use std::path::Path;
use tracing::{debug, info};

/// Fetches `key` untrimmed and writes it verbatim to `target`.
///
/// Nothing touches the filesystem unless the key exists. No retries.
pub async fn materialize(client: &dyn KeyValueClient, key: &str, target: &str) -> Report {
    let task = Task::fetch(key, target);

    let value = match client.get(key, false).await {
        Ok(Some(value)) => value,
        Ok(None) => {
            let message = format!("key '{}' not found on server {}", key, client.url());
            return Report::new(task, Status::Failure, vec![message]);
        }
        Err(e) => {
            let message = format!("key '{}' could not be fetched from server {}: {}", key, client.url(), e);
            return Report::new(task, Status::Failure, lines(&message));
        }
    };

    match write_target(Path::new(target), &value).await {
        Ok(()) => {
            info!("Wrote '{}' to {}", key, target);
            Report::new(task, Status::Success, Vec::new())
        }
        Err(e) => Report::new(task, Status::Failure, lines(&e.to_string())),
    }
}

async fn write_target(target: &Path, value: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!("Creating {}", parent.display());
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, value).await
}

fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
