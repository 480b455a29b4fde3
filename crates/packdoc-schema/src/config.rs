//! Deployment configuration for schema compilation.
//!
//! ```toml
//! environment = "staging"
//! validate_key_space = true
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error as ThisError;

/// Environment variable read by `PackConfig::from_env`.
pub const ENVIRONMENT_VAR: &str = "PACKDOC_ENVIRONMENT";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown environment '{0}'")]
    UnknownEnvironment(String),
}

///
/// Environment
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum Environment {
    #[default]
    #[display("dev")]
    Dev,

    #[display("prod")]
    Prod,

    #[display("staging")]
    Staging,

    #[display("test")]
    Test,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            "staging" => Ok(Self::Staging),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

///
/// PackConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackConfig {
    pub environment: Environment,

    /// Force the eager key-space check on or off regardless of environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_key_space: Option<bool>,
}

impl PackConfig {
    #[must_use]
    pub const fn new(environment: Environment) -> Self {
        Self {
            environment,
            validate_key_space: None,
        }
    }

    #[must_use]
    pub const fn with_key_space_validation(mut self, enabled: bool) -> Self {
        self.validate_key_space = Some(enabled);
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Environment from `PACKDOC_ENVIRONMENT`; unset means the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) => Ok(Self::new(value.parse()?)),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Whether schema compilation runs the eager key-space check.
    #[must_use]
    pub const fn validates_key_space(&self) -> bool {
        match self.validate_key_space {
            Some(enabled) => enabled,
            None => !self.environment.is_production(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_dev_with_validation() {
        let config = PackConfig::from_toml_str("").unwrap();

        assert_eq!(config.environment, Environment::Dev);
        assert!(config.validates_key_space());
    }

    #[test]
    fn production_skips_validation_unless_forced() {
        let prod = PackConfig::from_toml_str(r#"environment = "prod""#).unwrap();
        assert!(!prod.validates_key_space());

        let forced = PackConfig::from_toml_str(
            "environment = \"prod\"\nvalidate_key_space = true\n",
        )
        .unwrap();
        assert!(forced.validates_key_space());
    }

    #[test]
    fn override_can_disable_validation_outside_production() {
        let config = PackConfig::new(Environment::Test).with_key_space_validation(false);
        assert!(!config.validates_key_space());
    }

    #[test]
    fn unknown_keys_and_environments_are_rejected() {
        assert!(matches!(
            PackConfig::from_toml_str("verbose = true"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            "qa".parse::<Environment>(),
            Err(ConfigError::UnknownEnvironment(ref s)) if s == "qa"
        ));
    }

    #[test]
    fn environment_parses_long_names() {
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Prod);
        assert_eq!(Environment::Staging.to_string(), "staging");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PackConfig::from_path("/nonexistent/packdoc.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.ends_with("packdoc.toml")));
    }
}
