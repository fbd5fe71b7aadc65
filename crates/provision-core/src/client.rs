use crate::error::ProvisionError;
use std::collections::HashMap;

/// Read access to the remote key-value store scripts and files live in.
#[async_trait::async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Base URL, for diagnostics.
    fn url(&self) -> &str;

    /// Value stored at `key`, or `None` when absent or empty.
    /// With `trim` set, surrounding whitespace is stripped.
    async fn get(&self, key: &str, trim: bool) -> Result<Option<String>, ProvisionError>;
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    url: String,
    data: HashMap<String, String>,
}

impl MemoryClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: HashMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

#[async_trait::async_trait]
impl KeyValueClient for MemoryClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get(&self, key: &str, trim: bool) -> Result<Option<String>, ProvisionError> {
        let value = self.data.get(key).map(|v| if trim { v.trim() } else { v.as_str() });
        Ok(value.filter(|v| !v.is_empty()).map(str::to_string))
    }
}
