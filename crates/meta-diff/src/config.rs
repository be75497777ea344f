//! Diff configuration.
//!
//! Everything that varies between deployments (the identity fields used to
//! pair array elements, the bookkeeping keys ignored in revision diffs and
//! how strictly dotted paths are parsed) lives in one [`DiffConfig`] value
//! that callers pass around explicitly.
//!
//! ```toml
//! identity_fields = ["name", "level", "type", "source", "value"]
//! ignore_keys = ["id", "revision"]
//! path_policy = "lenient"
//! ```

use std::path::Path;

use meta_diff_path_keys::PathPolicy;
use serde::{Deserialize, Serialize};

use crate::differ::Differ;
use crate::error::{DiffError, Result};
use crate::identity::{IdentityPolicy, DEFAULT_IDENTITY_FIELDS};
use crate::normalize::{IgnoreKeys, DEFAULT_IGNORE_KEYS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Candidate identity fields, in order of preference
    pub identity_fields: Vec<String>,
    /// Top-level keys removed before diffing
    pub ignore_keys: Vec<String>,
    /// Handling of malformed dotted paths
    pub path_policy: PathPolicy,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            identity_fields: DEFAULT_IDENTITY_FIELDS.iter().map(|s| s.to_string()).collect(),
            ignore_keys: DEFAULT_IGNORE_KEYS.iter().map(|s| s.to_string()).collect(),
            path_policy: PathPolicy::default(),
        }
    }
}

impl DiffConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DiffConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading diff config");
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if let Some(position) = self.identity_fields.iter().position(|f| f.trim().is_empty()) {
            return Err(DiffError::Config(format!(
                "identity_fields[{position}] is empty"
            )));
        }
        if self.ignore_keys.iter().any(|k| k.is_empty()) {
            return Err(DiffError::Config("ignore_keys contains an empty key".to_string()));
        }
        Ok(())
    }

    pub fn differ(&self) -> Differ {
        Differ::new(IdentityPolicy::new(self.identity_fields.iter().cloned()))
    }

    pub fn ignore_keys(&self) -> IgnoreKeys {
        IgnoreKeys::new(self.ignore_keys.iter().cloned())
    }
}
