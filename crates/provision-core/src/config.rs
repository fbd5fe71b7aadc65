use crate::runner::{RetryPolicy, ATTEMPTS_DEFAULT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loaded from <config_dir>/provision/config.yaml; every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the key-value server.
    #[serde(default = "default_url")]
    pub url: String,
    /// Levels of specialization, most generic first
    /// (e.g. `[project, environment]` for `<project>/<environment>/<key>`).
    #[serde(default)]
    pub levels: Vec<String>,
    /// Lifetime of cached HTTP responses, in seconds.
    #[serde(default = "default_cache")]
    pub cache: u64,
    #[serde(default = "default_reports_path")]
    pub reports_path: PathBuf,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay between two attempts, in seconds.
    #[serde(default = "default_pause")]
    pub pause: f64,
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_cache() -> u64 {
    300
}

fn default_reports_path() -> PathBuf {
    PathBuf::from("/var/provision/reports")
}

fn default_attempts() -> u32 {
    ATTEMPTS_DEFAULT
}

fn default_pause() -> f64 {
    10.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            levels: Vec::new(),
            cache: default_cache(),
            reports_path: default_reports_path(),
            attempts: default_attempts(),
            pause: default_pause(),
        }
    }
}

impl Config {
    /// Load config from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("provision")
            .join("config.yaml")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.pause.is_finite() || self.pause < 0.0 {
            anyhow::bail!("pause must be a non-negative number of seconds, got {}", self.pause);
        }
        if self.url.trim().is_empty() {
            anyhow::bail!("url must not be empty");
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_secs_f64(self.pause.max(0.0)))
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache)
    }
}
