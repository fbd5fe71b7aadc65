use crate::client::KeyValueClient;
use crate::error::ResolveError;
use crate::report::ReportStore;
use crate::task::{parse_script, ScriptEntry, Status, Task, TaskHash};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A concrete task together with its ledger state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub task: Task,
    pub status: Status,
    pub hash: TaskHash,
}

impl ResolvedTask {
    pub fn report_path(&self, store: &ReportStore) -> PathBuf {
        store.path_of(&self.hash)
    }
}

/// Entries of one script still to visit.
struct Frame {
    key: String,
    entries: std::vec::IntoIter<ScriptEntry>,
}

/// Depth-first expansion of a remote script into concrete tasks.
///
/// Scripts are fetched lazily: an `include` is only fetched when the
/// stream reaches it, so a consumer that stops early never touches the
/// rest. The stream is finite and cannot be restarted.
pub struct ScriptResolver<'a> {
    client: &'a dyn KeyValueClient,
    store: &'a ReportStore,
    root: Option<String>,
    stack: Vec<Frame>,
}

impl<'a> ScriptResolver<'a> {
    pub fn new(client: &'a dyn KeyValueClient, store: &'a ReportStore, key: impl Into<String>) -> Self {
        Self {
            client,
            store,
            root: Some(key.into()),
            stack: Vec::new(),
        }
    }

    /// Keys currently being expanded, outermost first.
    pub fn active_path(&self) -> Vec<String> {
        self.stack.iter().map(|f| f.key.clone()).collect()
    }

    /// Next task, or a diagnostic for an element that was dropped.
    /// `None` once every script has been consumed.
    pub async fn next(&mut self) -> Option<Result<ResolvedTask, ResolveError>> {
        if let Some(root) = self.root.take() {
            if let Err(e) = self.enter(root).await {
                return Some(Err(e));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            match entry {
                ScriptEntry::Task(task) => return Some(Ok(self.lookup(task))),
                ScriptEntry::Include(key) => {
                    if self.stack.iter().any(|f| f.key == key) {
                        let mut path = self.active_path();
                        path.push(key.clone());
                        return Some(Err(ResolveError::IncludeCycle { key, path }));
                    }
                    if let Err(e) = self.enter(key).await {
                        return Some(Err(e));
                    }
                }
                ScriptEntry::Malformed(element) => {
                    return Some(Err(ResolveError::MalformedTask { element }));
                }
            }
        }
    }

    /// Drains the stream.
    pub async fn collect(mut self) -> Vec<Result<ResolvedTask, ResolveError>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item);
        }
        items
    }

    async fn enter(&mut self, key: String) -> Result<(), ResolveError> {
        let url = self.client.url().to_string();
        debug!("Fetching script '{}' from {}", key, url);

        let value = match self.client.get(&key, true).await {
            Ok(Some(value)) => value,
            Ok(None) => return Err(ResolveError::KeyNotFound { key, url }),
            Err(e) => {
                return Err(ResolveError::Fetch {
                    key,
                    url,
                    message: e.to_string(),
                })
            }
        };

        let entries = parse_script(&value).ok_or_else(|| ResolveError::NotAList {
            key: key.clone(),
            url,
        })?;

        self.stack.push(Frame {
            key,
            entries: entries.into_iter(),
        });
        Ok(())
    }

    fn lookup(&self, task: Task) -> ResolvedTask {
        let hash = task.hash();
        let status = self.store.status_of(&hash).unwrap_or_else(|e| {
            warn!("Unreadable report {} for {}, treating as pending: {}", hash, task, e);
            Status::Pending
        });
        ResolvedTask { task, status, hash }
    }
}
