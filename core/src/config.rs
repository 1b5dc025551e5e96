//! Client configuration.
//!
//! # Design
//! A `Config` value is owned by each `LinkResource` instead of living in a
//! process-wide slot. `Config::default()` is the reset state, so "reset" is
//! just replacing the value.

use serde::Deserialize;

/// Base URL of the remote link API.
pub const BRANCH_API_ENDPOINT: &str = "https://api.branch.io/";

/// Credentials and addresses used to build and register links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public key, used as the `/a/{api_key}` path segment and `branch_key`.
    pub api_key: String,
    /// Secret key, sent as `branch_secret` in remote requests.
    pub secret_key: String,
    /// Host of locally built links, e.g. `myapp.app.link`.
    pub branch_domain: String,
    /// Returned by `create` when the remote API fails.
    pub link_to_homepage: Option<String>,
    pub api_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            branch_domain: String::new(),
            link_to_homepage: None,
            api_endpoint: BRANCH_API_ENDPOINT.to_string(),
        }
    }
}

impl Config {
    /// Apply `f` to this config and return it.
    ///
    /// ```
    /// use branch_core::Config;
    ///
    /// let config = Config::default().configure(|c| {
    ///     c.api_key = "key_live_123".to_string();
    ///     c.branch_domain = "myapp.app.link".to_string();
    /// });
    /// assert_eq!(config.branch_domain, "myapp.app.link");
    /// ```
    pub fn configure(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self);
        self
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) {
        *self = Config::default();
    }

    /// Read settings from `BRANCH_KEY`, `BRANCH_SECRET`, `BRANCH_DOMAIN`,
    /// `BRANCH_HOMEPAGE_URL` and `BRANCH_API_ENDPOINT`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Self {
            api_key: lookup("BRANCH_KEY").unwrap_or(defaults.api_key),
            secret_key: lookup("BRANCH_SECRET").unwrap_or(defaults.secret_key),
            branch_domain: lookup("BRANCH_DOMAIN").unwrap_or(defaults.branch_domain),
            link_to_homepage: lookup("BRANCH_HOMEPAGE_URL").or(defaults.link_to_homepage),
            api_endpoint: lookup("BRANCH_API_ENDPOINT").unwrap_or(defaults.api_endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config::default().configure(|c| {
            c.api_key = "api_key".to_string();
            c.branch_domain = "branch_domain".to_string();
            c.link_to_homepage = Some("https://mydomain.com".to_string());
        })
    }

    #[test]
    fn configure_sets_fields() {
        let config = configured();
        assert_eq!(config.api_key, "api_key");
        assert_eq!(config.branch_domain, "branch_domain");
        assert_eq!(config.link_to_homepage.as_deref(), Some("https://mydomain.com"));
        assert_eq!(config.api_endpoint, BRANCH_API_ENDPOINT);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut config = configured();
        config.reset();
        assert_eq!(config, Config::default());
        assert!(config.link_to_homepage.is_none());
    }

    #[test]
    fn from_lookup_keeps_defaults_for_missing_vars() {
        let config = Config::from_lookup(|name| match name {
            "BRANCH_KEY" => Some("key_live".to_string()),
            "BRANCH_HOMEPAGE_URL" => Some("https://home.example".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key, "key_live");
        assert_eq!(config.secret_key, "");
        assert_eq!(config.link_to_homepage.as_deref(), Some("https://home.example"));
        assert_eq!(config.api_endpoint, BRANCH_API_ENDPOINT);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: Config =
            serde_json::from_str(r#"{"api_key":"k","branch_domain":"d.app.link"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.branch_domain, "d.app.link");
        assert!(config.link_to_homepage.is_none());
        assert_eq!(config.api_endpoint, BRANCH_API_ENDPOINT);
    }
}
