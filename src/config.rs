//! Controller configuration.
//!
//! Loaded from YAML, then overridden by environment variables:
//!
//! ```yaml
//! controller_suffix: ClassController
//! infer_target_from_name: true
//! ```
//!
//! `CLASS_CONTROLLER_SUFFIX` replaces the suffix and `CLASS_CONTROLLER_INFER`
//! (`true`/`false`/`1`/`0`/`yes`/`no`) toggles naming-convention inference.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const SUFFIX_ENV: &str = "CLASS_CONTROLLER_SUFFIX";
pub const INFER_ENV: &str = "CLASS_CONTROLLER_INFER";

pub const DEFAULT_SUFFIX: &str = "ClassController";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Type-name suffix stripped to find the target class.
    pub controller_suffix: String,
    /// When false, controllers must name their target explicitly.
    pub infer_target_from_name: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            controller_suffix: DEFAULT_SUFFIX.to_string(),
            infer_target_from_name: true,
        }
    }
}

impl ControllerConfig {
    /// Only explicitly named targets are accepted.
    pub fn explicit_only() -> Self {
        Self {
            infer_target_from_name: false,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded controller config");
        Self::from_yaml_str(&text)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(suffix) = lookup(SUFFIX_ENV) {
            self.controller_suffix = suffix.trim().to_string();
        }
        if let Some(raw) = lookup(INFER_ENV) {
            self.infer_target_from_name =
                parse_flag(&raw).ok_or_else(|| ConfigError::invalid_env(INFER_ENV, raw.clone()))?;
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
