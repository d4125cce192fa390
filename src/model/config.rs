use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::prefs::{SortMode, StatusFilter, StatusOrder};

/// Startup configuration from config.toml, overridden by CLI flags.
///
/// Read-only for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Seconds between automatic refreshes. 0 disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub default_sort: SortMode,
    #[serde(default)]
    pub default_project: Option<String>,
    #[serde(default)]
    pub statuses: StatusFilter,
    #[serde(default)]
    pub status_order: StatusOrder,
    /// Listen on the server's event stream in addition to polling
    #[serde(default)]
    pub push_enabled: bool,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server_url: default_server_url(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            default_sort: SortMode::default(),
            default_project: None,
            statuses: StatusFilter::default(),
            status_order: StatusOrder::default(),
            push_enabled: false,
            ui: UiConfig::default(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:8181".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Color overrides by theme slot name, as "#RRGGBB"
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Per-feature tag colors, as "#RRGGBB"
    #[serde(default)]
    pub feature_colors: HashMap<String, String>,
}
