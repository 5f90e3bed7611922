//! blogctl configuration
//!
//! ```toml
//! [provider]
//! endpoint = "http://localhost:3001"
//! timeout_secs = 30
//!
//! [items.first_post]
//! name = "post-1"
//! description = "first post"
//! tags = ["go", "infra"]
//! ```
//!
//! Item tables are keyed by address. The address is how blogctl tracks an
//! item across runs; `name` is the item's identifier in the service.

use anyhow::{Context, Result, bail};
use blogapi::HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::resource::{ItemAttributes, item_schema};

/// Environment variable overriding `provider.endpoint`
pub const ENV_ENDPOINT: &str = "BLOGCTL_ENDPOINT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub items: BTreeMap<String, ItemAttributes>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    blogapi::DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    blogapi::DEFAULT_TIMEOUT.as_secs()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Build the HTTP client for this provider
    pub fn client(&self) -> HttpClient {
        HttpClient::with_timeout(&self.endpoint, Duration::from_secs(self.timeout_secs))
    }
}

impl BlogConfig {
    /// Load and validate a config file, applying environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        config.apply_overrides(std::env::var(ENV_ENDPOINT).ok());
        log::debug!(
            "Loaded {} items from {} (endpoint {})",
            config.items.len(),
            path.display(),
            config.provider.endpoint
        );
        Ok(config)
    }

    /// Parse and validate config text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Apply an endpoint override (from `BLOGCTL_ENDPOINT`)
    pub fn apply_overrides(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            log::debug!("Using endpoint from {}: {}", ENV_ENDPOINT, endpoint);
            self.provider.endpoint = endpoint;
        }
    }

    /// Check that required attributes are set and that names are unique
    pub fn validate(&self) -> Result<()> {
        let schema = item_schema();
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for (address, item) in &self.items {
            let values = item.flatten();
            if let Some(attribute) = schema.missing(&values).next() {
                bail!("Item '{}' has an empty {}", address, attribute);
            }
            if let Some(other) = seen.insert(item.name.as_str(), address.as_str()) {
                bail!(
                    "Items '{}' and '{}' both use the name '{}'",
                    other,
                    address,
                    item.name
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[provider]
endpoint = "http://blog.local:8080"

[items.first_post]
name = "post-1"
description = "first post"
tags = ["go", "infra"]

[items.second_post]
name = "post-2"
description = "second post"
"#;

    #[test]
    fn test_parse_sample() {
        let config = BlogConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.provider.endpoint, "http://blog.local:8080");
        assert_eq!(config.provider.timeout_secs, 30);
        assert_eq!(config.items.len(), 2);

        let first = &config.items["first_post"];
        assert_eq!(first.name, "post-1");
        assert!(first.tags.contains("infra"));
        assert!(config.items["second_post"].tags.is_empty());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = BlogConfig::parse("").unwrap();
        assert_eq!(config.provider.endpoint, blogapi::DEFAULT_ENDPOINT);
        assert!(config.items.is_empty());
    }

    #[test]
    fn test_description_is_required() {
        let result = BlogConfig::parse(
            r#"
[items.a]
name = "post-1"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = BlogConfig::parse(
            r#"
[items.a]
name = "post-1"
description = "x"

[items.b]
name = "post-1"
description = "y"
"#,
        );
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("post-1"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = BlogConfig::parse(
            r#"
[items.a]
name = " "
description = "x"
"#,
        );
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("empty name"));
    }

    #[test]
    fn test_blank_description_rejected() {
        let result = BlogConfig::parse(
            r#"
[items.a]
name = "post-1"
description = ""
"#,
        );
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("'a' has an empty description"));
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = BlogConfig::parse(SAMPLE).unwrap();
        config.apply_overrides(None);
        assert_eq!(config.provider.endpoint, "http://blog.local:8080");

        config.apply_overrides(Some(String::new()));
        assert_eq!(config.provider.endpoint, "http://blog.local:8080");

        config.apply_overrides(Some("http://other:1".to_string()));
        assert_eq!(config.provider.endpoint, "http://other:1");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = BlogConfig::load(&path).unwrap();
        assert_eq!(config.items.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BlogConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_provider_client() {
        let config = BlogConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.provider.client().endpoint(), "http://blog.local:8080");
    }
}
