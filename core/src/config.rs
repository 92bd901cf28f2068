//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for `EnterpriseCompat`. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Response header whose presence marks a self-hosted enterprise server.
    pub enterprise_version_header: String,
    /// Route suggested when an org-scoped team endpoint is unsupported.
    pub legacy_team_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enterprise_version_header: "x-github-enterprise-version".to_string(),
            legacy_team_url: "/teams/:team_id".to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enterprise_version_header.trim().is_empty() {
            return Err(ConfigError::EmptyHeaderName);
        }
        if !self.legacy_team_url.contains(":team_id") {
            return Err(ConfigError::MissingTeamIdPlaceholder(
                self.legacy_team_url.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.enterprise_version_header, "x-github-enterprise-version");
    }

    #[test]
    fn partial_override() {
        let config = Config::from_json(r#"{"enterprise_version_header":"x-ghe-version"}"#).unwrap();
        assert_eq!(config.enterprise_version_header, "x-ghe-version");
        assert_eq!(config.legacy_team_url, "/teams/:team_id");
    }

    #[test]
    fn rejects_blank_header() {
        let err = Config::from_json(r#"{"enterprise_version_header":"  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyHeaderName));
    }

    #[test]
    fn rejects_team_url_without_placeholder() {
        let err = Config::from_json(r#"{"legacy_team_url":"/teams/1"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTeamIdPlaceholder(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Config::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
