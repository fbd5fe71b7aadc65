use crate::engine;
use crate::materialize;
use provision_core::client::KeyValueClient;
use provision_core::report::Report;
use provision_core::runner::{RetryPolicy, TaskRunner};
use std::io::Write;
use std::sync::Arc;

/// Runs tasks on the host machine: shell commands through the engine,
/// fetch tasks through the materializer.
pub struct LocalRunner {
    client: Arc<dyn KeyValueClient>,
}

impl LocalRunner {
    pub fn new(client: Arc<dyn KeyValueClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl TaskRunner for LocalRunner {
    async fn execute(&self, command: &str, policy: RetryPolicy, out: &mut (dyn Write + Send)) -> Report {
        engine::execute(command, policy, out).await
    }

    async fn materialize(&self, key: &str, target: &str) -> Report {
        materialize::materialize(self.client.as_ref(), key, target).await
    }
}
