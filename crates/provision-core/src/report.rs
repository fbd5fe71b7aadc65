use crate::error::ProvisionError;
use crate::task::{Status, Task, TaskHash, KEY, TARGET};
use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const COMMAND: &str = "command";
pub const STATUS: &str = "status";
pub const OUTPUT: &str = "output";

/// Outcome of executing a task once (retries included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub task: Task,
    pub status: Status,
    pub output: Vec<String>,
}

impl Report {
    pub fn new(task: Task, status: Status, output: Vec<String>) -> Self {
        Self {
            task,
            status,
            output,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Stored layout: the task's own fields first, then `status` and `output`.
impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match &self.task {
            Task::Shell(command) => map.serialize_entry(COMMAND, command)?,
            Task::Fetch(fetch) => {
                map.serialize_entry(KEY, &fetch.key)?;
                map.serialize_entry(TARGET, &fetch.target)?;
            }
        }
        map.serialize_entry(STATUS, &self.status)?;
        map.serialize_entry(OUTPUT, &self.output)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct StatusRecord {
    status: Status,
}

/// A report file as found on disk.
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub name: String,
    pub modified: DateTime<Local>,
    pub content: serde_json::Value,
}

/// Directory of hash-named report files: the idempotence ledger.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, hash: &TaskHash) -> PathBuf {
        self.dir.join(hash.as_str())
    }

    /// `Pending` when no report exists, otherwise the stored status.
    pub fn status_of(&self, hash: &TaskHash) -> Result<Status, ProvisionError> {
        let path = self.path_of(hash);
        if !path.exists() {
            return Ok(Status::Pending);
        }
        let data = std::fs::read_to_string(&path)?;
        let record: StatusRecord = serde_json::from_str(&data)?;
        Ok(record.status)
    }

    /// Writes (or overwrites) the report for `hash`, creating the store
    /// directory if needed.
    pub fn write(&self, hash: &TaskHash, report: &Report) -> Result<PathBuf, ProvisionError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_of(hash);
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        info!("Report for {} written to {}", report.task, path.display());
        Ok(path)
    }

    /// All report files, oldest modification first. A missing directory
    /// yields nothing.
    pub fn list_ordered(&self) -> Result<Vec<StoredReport>, ProvisionError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let path = entry.path();
            let content = match std::fs::read_to_string(&path)
                .map_err(ProvisionError::from)
                .and_then(|data| serde_json::from_str::<serde_json::Value>(&data).map_err(ProvisionError::from))
            {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable report {}: {}", path.display(), e);
                    continue;
                }
            };

            results.push(StoredReport {
                name: entry.file_name().to_string_lossy().into_owned(),
                modified: DateTime::<Local>::from(metadata.modified()?),
                content,
            });
        }
        results.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(results)
    }
}
