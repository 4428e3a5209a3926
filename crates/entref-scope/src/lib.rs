//! Reference scopes.
//!
//! An [`EntityReferenceSet`] answers "is this entity in scope?" for entity
//! references, given include and exclude patterns. Patterns are reference
//! chains, optionally ending in a wildcard of some kind, and may constrain
//! parameters such as the locale of a document.
//!
//! # Modules
//!
//! - [`config`] — [`ScopeConfig`] and the [`ParameterMatch`] rules
//! - [`error`] — Error types for configuration loading
//! - [`set`] — The [`EntityReferenceSet`] itself

pub mod config;
pub mod error;
mod pattern;
pub mod set;

pub use config::{ParameterMatch, ScopeConfig};
pub use error::{Result, ScopeError};
pub use set::EntityReferenceSet;
