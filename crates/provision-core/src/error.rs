use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Non-fatal conditions met while expanding a script. The resolver hands
/// these back as items of its stream; none of them aborts the rest of it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("key '{key}' not found on server {url}")]
    KeyNotFound { key: String, url: String },

    #[error("key '{key}' on server {url} is not a proper yaml or json list")]
    NotAList { key: String, url: String },

    #[error("malformed task, ignored: {element}")]
    MalformedTask { element: String },

    #[error("include cycle, ignored: '{key}' is already being expanded ({})", .path.join(" -> "))]
    IncludeCycle { key: String, path: Vec<String> },

    #[error("key '{key}' could not be fetched from server {url}: {message}")]
    Fetch {
        key: String,
        url: String,
        message: String,
    },
}
