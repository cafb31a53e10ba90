use std::env::VarError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted by [`BuildEnvironment::from_env`].
pub const ENV_VAR: &str = "TIDORY_ENV";

/// The environment a build targets.
///
/// - `Development`: Local builds. Public path is always `/`, component dev/hot flags on.
/// - `Production`: Skin deployment. Public path comes from the manifest or the skin service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildEnvironment {
    #[default]
    Development,
    Production,
}

/// A build environment name that is neither development nor production.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown build environment {0:?}: expected `development` or `production`")]
pub struct UnknownEnvironment(pub String);

impl BuildEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Case-insensitive lookup of an environment name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Result<Self, UnknownEnvironment> {
        Self::from_str(value).ok_or_else(|| UnknownEnvironment(value.to_string()))
    }

    /// Read the environment from `TIDORY_ENV`.
    ///
    /// Unset or blank yields `None`; any other unrecognised value is an error.
    pub fn from_env() -> Result<Option<Self>, UnknownEnvironment> {
        match std::env::var(ENV_VAR) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Self::parse(&value).map(Some),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(value)) => {
                Err(UnknownEnvironment(value.to_string_lossy().into_owned()))
            }
        }
    }

    /// Combine the `--production` flag with the `TIDORY_ENV` setting.
    ///
    /// The flag always wins.
    pub fn select(production_flag: bool, setting: Option<Self>) -> Self {
        match (production_flag, setting) {
            (true, Some(Self::Development)) => {
                tracing::warn!(
                    "{} requests a development build; --production takes precedence",
                    ENV_VAR
                );
                Self::Production
            }
            (true, _) => Self::Production,
            (false, setting) => setting.unwrap_or_default(),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
