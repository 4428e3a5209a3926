//! Entity references for wiki content.
//!
//! An entity reference names one entity (a wiki, a space, a document, an
//! attachment, an object property, a page...) by the chain of named, typed
//! segments leading to it. References are immutable values: chains share
//! their common ancestors, and every transformation returns a new reference.
//!
//! # Key Types
//!
//! - [`EntityType`] — The kinds of entity and which kinds may parent them
//! - [`EntityReference`] — Validated, immutable reference chain
//! - [`ParameterValue`] — Qualifier attached to a segment (e.g. a locale)
//! - [`DocumentReference`] and friends — Kind-constrained wrappers
//! - [`DisplaySerializer`] — Human readable form (`wiki:Space.Page`)

pub mod entity_type;
pub mod error;
pub mod parameter;
pub mod reference;
pub mod serializer;
pub mod typed;

pub use entity_type::EntityType;
pub use error::{ReferenceError, Result};
pub use parameter::{params, ParameterValue, Parameters, FALLBACK_PARENT_TYPE};
pub use reference::EntityReference;
pub use serializer::{DisplaySerializer, EntityReferenceResolver, EntityReferenceSerializer};
pub use typed::{
    AttachmentReference, BlockReference, ClassPropertyReference, DocumentReference,
    ObjectPropertyReference, ObjectReference, PageReference, SpaceReference, WikiReference,
    LOCALE,
};
