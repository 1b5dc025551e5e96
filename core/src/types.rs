//! Link parameters and wire DTOs for the link API.
//!
//! # Design
//! Analytics and settings are open JSON maps on input but only a fixed set of
//! keys ever reaches a URL or request body; everything else, and any key
//! whose value is `null`, is dropped by the `filtered_*` accessors. Custom
//! `data` passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object of link parameters.
pub type Params = Map<String, Value>;

/// Analytics keys accepted by the link API.
pub const ANALYTICS_KEYS: [&str; 5] = ["channel", "feature", "campaign", "stage", "tags"];

/// Settings keys accepted by the link API.
pub const SETTINGS_KEYS: [&str; 4] = ["alias", "type", "duration", "identity"];

/// The three parameter groups every link operation takes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkParams {
    pub analytics: Params,
    pub data: Params,
    pub settings: Params,
}

impl LinkParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_analytics(mut self, analytics: Params) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_data(mut self, data: Params) -> Self {
        self.data = data;
        self
    }

    pub fn with_settings(mut self, settings: Params) -> Self {
        self.settings = settings;
        self
    }

    pub fn filtered_analytics(&self) -> Params {
        retain_allowed(&self.analytics, &ANALYTICS_KEYS)
    }

    pub fn filtered_settings(&self) -> Params {
        retain_allowed(&self.settings, &SETTINGS_KEYS)
    }

    /// Analytics, then settings, then data merged into one map; later groups
    /// overwrite earlier keys.
    pub fn merged(&self) -> Params {
        let mut merged = self.filtered_analytics();
        merged.extend(self.filtered_settings());
        merged.extend(self.data.clone());
        merged
    }
}

fn retain_allowed(params: &Params, allowed: &[&str]) -> Params {
    params
        .iter()
        .filter(|(key, value)| allowed.contains(&key.as_str()) && !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Request body for `POST v1/url` and `PUT v1/url`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRequest {
    pub branch_key: String,
    pub branch_secret: String,
    #[serde(flatten)]
    pub analytics: Params,
    #[serde(flatten)]
    pub settings: Params,
    pub data: Params,
}

/// Reply from the link API. Only `url` is read.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LinkResponse {
    #[serde(default)]
    pub url: Option<String>,
}
