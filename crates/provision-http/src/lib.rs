//! HTTP access to the key-value server.
//!
//! Keys are looked up along the configured levels of specialization, most
//! specific first: with levels `[project, production]`, `script` is tried
//! at `<url>/project/production/script`, then `<url>/project/script`, then
//! `<url>/script`.

use provision_core::client::KeyValueClient;
use provision_core::config::Config;
use provision_core::error::ProvisionError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpClient {
    url: String,
    levels: Vec<String>,
    cache_ttl: Duration,
    http: reqwest::Client,
    cache: Mutex<HashMap<String, (Instant, Option<String>)>>,
}

impl HttpClient {
    pub fn new(url: &str, levels: Vec<String>, cache_ttl: Duration) -> Result<Self, ProvisionError> {
        let http = reqwest::ClientBuilder::new()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| ProvisionError::Http(format!("Client setup: {}", e)))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            levels,
            cache_ttl,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProvisionError> {
        Self::new(&config.url, config.levels.clone(), config.cache_duration())
    }

    /// URLs tried for `key`, most specific first.
    pub fn candidate_urls(&self, key: &str) -> Vec<String> {
        (0..=self.levels.len())
            .rev()
            .map(|depth| {
                let mut url = self.url.clone();
                for level in &self.levels[..depth] {
                    url.push('/');
                    url.push_str(level);
                }
                url.push('/');
                url.push_str(key);
                url
            })
            .collect()
    }

    fn cached(&self, url: &str) -> Option<Option<String>> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(url)
            .filter(|(at, _)| at.elapsed() < self.cache_ttl)
            .map(|(_, body)| body.clone())
    }

    fn remember(&self, url: &str, body: &Option<String>) {
        if self.cache_ttl.is_zero() {
            return;
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(url.to_string(), (Instant::now(), body.clone()));
        }
    }

    /// Body at `url`; `None` on any non-success status or an empty body.
    async fn fetch(&self, url: &str) -> Result<Option<String>, ProvisionError> {
        if let Some(body) = self.cached(url) {
            debug!("Cache hit: {}", url);
            return Ok(body);
        }

        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProvisionError::Http(format!("GET {}: {}", url, e)))?;

        let body = if response.status().is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| ProvisionError::Http(format!("Read body of {}: {}", url, e)))?;
            Some(text).filter(|t| !t.is_empty())
        } else {
            debug!("GET {} returned {}", url, response.status());
            None
        };

        self.remember(url, &body);
        Ok(body)
    }
}

#[async_trait::async_trait]
impl KeyValueClient for HttpClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get(&self, key: &str, trim: bool) -> Result<Option<String>, ProvisionError> {
        for url in self.candidate_urls(key) {
            if let Some(body) = self.fetch(&url).await? {
                let value = if trim { body.trim().to_string() } else { body };
                return Ok(Some(value).filter(|v| !v.is_empty()));
            }
        }
        Ok(None)
    }
}
