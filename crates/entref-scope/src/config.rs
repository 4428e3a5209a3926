use std::path::Path;

use entref_model::Parameters;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScopeError};

/// How a recorded parameter constraint set is checked against the
/// parameters of a candidate segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterMatch {
    /// Keys present on both sides must have equal values; keys the candidate
    /// does not carry are ignored.
    Compatible,
    /// Every constrained key must be present on the candidate with an equal
    /// value.
    Exact,
    /// The set applies as soon as the candidate carries any constrained key,
    /// whatever its value.
    AnyKey,
}

impl ParameterMatch {
    /// Returns `true` if `constraint` accepts a segment carrying `parameters`.
    ///
    /// An empty constraint set accepts everything in every mode.
    pub fn accepts(self, constraint: &Parameters, parameters: &Parameters) -> bool {
        if constraint.is_empty() {
            return true;
        }
        match self {
            Self::Compatible => constraint
                .iter()
                .all(|(key, value)| parameters.get(key).map_or(true, |v| v == value)),
            Self::Exact => constraint
                .iter()
                .all(|(key, value)| parameters.get(key) == Some(value)),
            Self::AnyKey => constraint.keys().any(|key| parameters.contains_key(key)),
        }
    }
}

/// Configuration of an [`EntityReferenceSet`](crate::EntityReferenceSet).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Parameter matching applied while descending the include patterns.
    pub include_parameters: ParameterMatch,
    /// Parameter matching applied while descending the exclude patterns.
    pub exclude_parameters: ParameterMatch,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            include_parameters: ParameterMatch::Compatible,
            exclude_parameters: ParameterMatch::AnyKey,
        }
    }
}

impl ScopeConfig {
    /// Same matching rule on both trees.
    pub fn uniform(mode: ParameterMatch) -> Self {
        Self {
            include_parameters: mode,
            exclude_parameters: mode,
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    ///
    /// ```
    /// use entref_scope::{ParameterMatch, ScopeConfig};
    ///
    /// let config = ScopeConfig::from_toml_str("exclude_parameters = \"exact\"").unwrap();
    /// assert_eq!(config.exclude_parameters, ParameterMatch::Exact);
    /// assert_eq!(config.include_parameters, ParameterMatch::Compatible);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| ScopeError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ScopeError::Config(e.to_string()))
    }
}
