//! Error types for reference construction and chain manipulation.

use thiserror::Error;

use crate::entity_type::EntityType;

/// Errors produced while building or transforming entity references.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferenceError {
    /// The reference name was empty.
    #[error("an entity reference name cannot be empty")]
    InvalidName,

    /// A chain was requested from no segment at all.
    #[error("an entity reference needs at least one segment")]
    EmptyChain,

    /// A typed reference received a reference of another kind.
    #[error("invalid kind {actual}: expected {expected}")]
    InvalidKind {
        expected: EntityType,
        actual: EntityType,
    },

    /// The parent kind is not one of the allowed parents of the child kind.
    #[error("invalid parent kind {parent} for a reference of kind {kind}")]
    InvalidParentKind {
        kind: EntityType,
        parent: EntityType,
    },

    /// A kind that only exists under a parent was given none.
    #[error("a reference of kind {kind} requires a parent")]
    MissingParent { kind: EntityType },

    /// The ancestor to replace is not part of the reference chain.
    #[error("the reference [{ancestor}] does not belong to the parents chain of the reference [{reference}]")]
    BrokenChainReplace { ancestor: String, reference: String },

    /// The fallback parent kind is not one of the allowed parents.
    #[error("the fallback parent kind {fallback} does not belong to the allowed parents of {kind}")]
    InvalidFallbackParentKind {
        kind: EntityType,
        fallback: EntityType,
    },

    /// A string could not be parsed into an [`EntityType`].
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_kinds() {
        let err = ReferenceError::InvalidParentKind {
            kind: EntityType::Document,
            parent: EntityType::Wiki,
        };
        assert_eq!(
            err.to_string(),
            "invalid parent kind WIKI for a reference of kind DOCUMENT"
        );
    }

    #[test]
    fn empty_name_message() {
        assert_eq!(
            ReferenceError::InvalidName.to_string(),
            "an entity reference name cannot be empty"
        );
    }

    #[test]
    fn empty_chain_is_not_an_empty_name() {
        assert_ne!(ReferenceError::EmptyChain, ReferenceError::InvalidName);
        assert_eq!(
            ReferenceError::EmptyChain.to_string(),
            "an entity reference needs at least one segment"
        );
    }
}
