//! Reference parameters: small immutable values attached to a segment.
//!
//! Parameters carry qualifiers that are not part of the name, such as the
//! locale of a document translation. They are kept in a sorted map so that
//! equality, hashing and ordering never depend on insertion order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity_type::EntityType;

/// Reserved parameter recording, on a root reference, which parent kind to
/// assume when no parent is materialized.
pub const FALLBACK_PARENT_TYPE: &str = "fallbackParentType";

/// Sorted parameter map of a reference segment.
pub type Parameters = BTreeMap<String, ParameterValue>;

/// An immutable, totally ordered parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Kind(EntityType),
}

impl ParameterValue {
    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The kind payload. String values naming a kind are parsed.
    pub fn as_kind(&self) -> Option<EntityType> {
        match self {
            Self::Kind(kind) => Some(*kind),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<EntityType> for ParameterValue {
    fn from(value: EntityType) -> Self {
        Self::Kind(value)
    }
}

/// Build a [`Parameters`] map from key/value pairs.
///
/// ```
/// use entref_model::parameter::params;
///
/// let p = params([("locale", "fr")]);
/// assert_eq!(p["locale"].as_str(), Some("fr"));
/// ```
pub fn params<K, V, I>(pairs: I) -> Parameters
where
    K: Into<String>,
    V: Into<ParameterValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
