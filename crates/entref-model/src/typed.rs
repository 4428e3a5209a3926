//! Kind-constrained references.
//!
//! Each type wraps an [`EntityReference`] whose kind is fixed. Construction
//! goes through the same validation as the generic reference; a parent given
//! as a plain [`EntityReference`] is accepted whenever its kind fits, and the
//! typed accessors hand it back already wrapped in the narrower type.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::entity_type::EntityType;
use crate::error::{ReferenceError, Result};
use crate::parameter::{ParameterValue, Parameters};
use crate::reference::EntityReference;

/// Parameter holding the locale of a document translation.
pub const LOCALE: &str = "locale";

macro_rules! typed_reference {
    (@define $(#[$meta:meta])* $name:ident => $kind:expr, $requires_parent:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "EntityReference", into = "EntityReference")]
        pub struct $name(EntityReference);

        impl $name {
            /// The kind every value of this type has.
            pub const KIND: EntityType = $kind;

            const REQUIRES_PARENT: bool = $requires_parent;

            /// Wrap a reference already known to be of [`Self::KIND`].
            fn wrap(reference: EntityReference) -> Self {
                debug_assert_eq!(reference.kind(), Self::KIND);
                Self(reference)
            }

            pub fn as_reference(&self) -> &EntityReference {
                &self.0
            }

            pub fn into_reference(self) -> EntityReference {
                self.0
            }
        }

        impl TryFrom<EntityReference> for $name {
            type Error = ReferenceError;

            fn try_from(reference: EntityReference) -> Result<Self> {
                if reference.kind() != Self::KIND {
                    return Err(ReferenceError::InvalidKind {
                        expected: Self::KIND,
                        actual: reference.kind(),
                    });
                }
                if Self::REQUIRES_PARENT && reference.parent().is_none() {
                    return Err(ReferenceError::MissingParent { kind: Self::KIND });
                }
                Ok(Self::wrap(reference))
            }
        }

        impl From<$name> for EntityReference {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<EntityReference> for $name {
            fn as_ref(&self) -> &EntityReference {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = EntityReference;

            fn deref(&self) -> &EntityReference {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
    ($(#[$meta:meta])* $name:ident => $kind:expr, requires_parent: true) => {
        typed_reference!(@define $(#[$meta])* $name => $kind, true);

        impl $name {
            /// The parent, checked to be present when the value was built.
            fn required_parent(&self) -> EntityReference {
                self.0
                    .parent()
                    .cloned()
                    .expect("typed reference validated with a parent")
            }
        }
    };
    ($(#[$meta:meta])* $name:ident => $kind:expr, requires_parent: false) => {
        typed_reference!(@define $(#[$meta])* $name => $kind, false);
    };
}

typed_reference!(
    /// Reference to a wiki, always a root.
    WikiReference => EntityType::Wiki, requires_parent: false
);
typed_reference!(
    /// Reference to a space, under a wiki or another space.
    SpaceReference => EntityType::Space, requires_parent: false
);
typed_reference!(
    /// Reference to a document, under a space.
    DocumentReference => EntityType::Document, requires_parent: true
);
typed_reference!(AttachmentReference => EntityType::Attachment, requires_parent: true);
typed_reference!(ObjectReference => EntityType::Object, requires_parent: true);
typed_reference!(ObjectPropertyReference => EntityType::ObjectProperty, requires_parent: true);
typed_reference!(ClassPropertyReference => EntityType::ClassProperty, requires_parent: true);
typed_reference!(BlockReference => EntityType::Block, requires_parent: true);
typed_reference!(
    /// Reference to a page, under a wiki or another page.
    PageReference => EntityType::Page, requires_parent: false
);

/// Build a typed child, validating the parent kind.
fn child_of<T>(name: impl Into<String>, kind: EntityType, parent: impl Into<EntityReference>) -> Result<T>
where
    T: TryFrom<EntityReference, Error = ReferenceError>,
{
    EntityReference::with_parent(name, kind, parent.into())?.try_into()
}

impl WikiReference {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        EntityReference::new(name, Self::KIND).map(Self::wrap)
    }
}

impl SpaceReference {
    /// A space under a wiki or a parent space.
    pub fn new(name: impl Into<String>, parent: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, parent)
    }

    /// A space without any parent.
    pub fn root(name: impl Into<String>) -> Result<Self> {
        EntityReference::new(name, Self::KIND).map(Self::wrap)
    }

    /// Nested spaces under a wiki, outermost first.
    pub fn in_wiki<S: AsRef<str>>(wiki: &WikiReference, spaces: &[S]) -> Result<Self> {
        let mut current: EntityReference = wiki.clone().into();
        for space in spaces {
            current = EntityReference::with_parent(space.as_ref(), Self::KIND, current)?;
        }
        Self::try_from(current)
    }

    pub fn wiki(&self) -> Option<WikiReference> {
        self.extract_nearest(EntityType::Wiki)
            .cloned()
            .map(WikiReference::wrap)
    }

    /// The enclosing space when this space is nested.
    pub fn parent_space(&self) -> Option<SpaceReference> {
        self.parent()
            .filter(|p| p.kind() == Self::KIND)
            .cloned()
            .map(Self::wrap)
    }
}

impl DocumentReference {
    pub fn new(name: impl Into<String>, space: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, space)
    }

    /// A document in a single root space, without wiki.
    pub fn local(space: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Self::new(name, SpaceReference::root(space)?)
    }

    pub fn space(&self) -> SpaceReference {
        SpaceReference::wrap(self.required_parent())
    }

    pub fn wiki(&self) -> Option<WikiReference> {
        self.extract_nearest(EntityType::Wiki)
            .cloned()
            .map(WikiReference::wrap)
    }

    pub fn locale(&self) -> Option<&str> {
        self.parameter(LOCALE).and_then(ParameterValue::as_str)
    }

    /// The same document in another locale; `None` removes the locale.
    pub fn with_locale(&self, locale: Option<&str>) -> Result<Self> {
        let mut parameters: Parameters = self.parameters().clone();
        match locale {
            Some(locale) => parameters.insert(LOCALE.to_string(), locale.into()),
            None => parameters.remove(LOCALE),
        };
        self.replace_parameters(parameters).map(Self::wrap)
    }
}

impl AttachmentReference {
    pub fn new(name: impl Into<String>, document: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, document)
    }

    pub fn document(&self) -> DocumentReference {
        DocumentReference::wrap(self.required_parent())
    }
}

impl ObjectReference {
    pub fn new(name: impl Into<String>, document: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, document)
    }

    pub fn document(&self) -> DocumentReference {
        DocumentReference::wrap(self.required_parent())
    }
}

impl ObjectPropertyReference {
    pub fn new(name: impl Into<String>, object: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, object)
    }

    pub fn object(&self) -> ObjectReference {
        ObjectReference::wrap(self.required_parent())
    }
}

impl ClassPropertyReference {
    pub fn new(name: impl Into<String>, document: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, document)
    }

    pub fn document(&self) -> DocumentReference {
        DocumentReference::wrap(self.required_parent())
    }
}

impl BlockReference {
    pub fn new(name: impl Into<String>, document: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, document)
    }

    pub fn document(&self) -> DocumentReference {
        DocumentReference::wrap(self.required_parent())
    }
}

impl PageReference {
    /// A page under a wiki or a parent page.
    pub fn new(name: impl Into<String>, parent: impl Into<EntityReference>) -> Result<Self> {
        child_of(name, Self::KIND, parent)
    }

    pub fn root(name: impl Into<String>) -> Result<Self> {
        EntityReference::new(name, Self::KIND).map(Self::wrap)
    }

    pub fn wiki(&self) -> Option<WikiReference> {
        self.extract_nearest(EntityType::Wiki)
            .cloned()
            .map(WikiReference::wrap)
    }
}
