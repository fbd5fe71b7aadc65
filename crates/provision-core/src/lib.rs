pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod task;

pub use client::{KeyValueClient, MemoryClient};
pub use config::Config;
pub use error::{ProvisionError, ResolveError};
pub use report::{Report, ReportStore, StoredReport};
pub use resolver::{ResolvedTask, ScriptResolver};
pub use runner::{RetryPolicy, TaskRunner};
pub use task::{Status, Task, TaskHash};
