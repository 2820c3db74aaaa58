//! Session configuration.

use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "playground";

/// Bodies of this size or more are refused before submission (5 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 << 20;

const TARGET_SLOT: &str = "http-request-target";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Prefix of the persisted target key.
    pub namespace: String,
    /// URL of the hosting page. Its `target` query parameter overrides the
    /// restored request target at startup.
    pub page_url: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            page_url: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl PlaygroundConfig {
    /// Defaults overridden by `PLAYGROUND_NAMESPACE`, `PLAYGROUND_PAGE_URL`
    /// and `PLAYGROUND_MAX_BODY_BYTES`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(namespace) = env::var("PLAYGROUND_NAMESPACE") {
            if !namespace.trim().is_empty() {
                config.namespace = namespace.trim().to_string();
            }
        }
        if let Ok(page_url) = env::var("PLAYGROUND_PAGE_URL") {
            config.page_url = Some(page_url);
        }
        if let Ok(limit) = env::var("PLAYGROUND_MAX_BODY_BYTES") {
            match limit.parse() {
                Ok(limit) => config.max_body_bytes = limit,
                Err(_) => tracing::warn!(value = %limit, "ignoring invalid PLAYGROUND_MAX_BODY_BYTES"),
            }
        }
        config
    }

    /// Key of the persisted request target, `"<namespace>@http-request-target"`.
    pub fn storage_key(&self) -> String {
        format!("{}@{TARGET_SLOT}", self.namespace)
    }
}
