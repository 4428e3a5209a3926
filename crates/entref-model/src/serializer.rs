//! Conversion seams between references and external representations.
//!
//! Resolvers turn some representation (a string, a request path, a stored
//! row) into a validated [`EntityReference`]; serializers go the other way.
//! Concrete resolvers live with the code that owns the representation. The
//! only serializer shipped here is [`DisplaySerializer`], which renders the
//! human readable form used by `Display`.

use crate::entity_type::EntityType;
use crate::error::Result;
use crate::reference::EntityReference;

/// Turns a representation into a reference of the requested kind.
pub trait EntityReferenceResolver<T> {
    /// Resolve `input`. When `kind` is given the returned reference must be
    /// of that kind.
    fn resolve(&self, input: T, kind: Option<EntityType>) -> Result<EntityReference>;
}

/// Renders a reference into a representation.
///
/// Implementations should walk [`EntityReference::chain_iter`], which is
/// always root first.
pub trait EntityReferenceSerializer<T> {
    fn serialize(&self, reference: &EntityReference) -> T;
}

/// Characters with a meaning in the display syntax.
const SPECIAL_CHARS: &[char] = &['\\', ':', '.', '@', '^', '#', '/', '(', ')', ',', '='];

/// Serializer for the display form: `wiki:space.page@file.png`.
///
/// Separators: `:` after a wiki, `.` before spaces, documents and object
/// properties, `@` before attachments, `^` before objects and class
/// properties, `#` before blocks and `/` between pages. Special characters
/// inside names are escaped with `\`. Parameters follow their segment as
/// `(key=value,...)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplaySerializer;

impl DisplaySerializer {
    fn separator(parent: EntityType, kind: EntityType) -> char {
        if parent == EntityType::Wiki {
            return ':';
        }
        match kind {
            EntityType::Attachment | EntityType::PageAttachment => '@',
            EntityType::Object
            | EntityType::ClassProperty
            | EntityType::PageObject
            | EntityType::PageClassProperty => '^',
            EntityType::Block => '#',
            EntityType::Page => '/',
            _ => '.',
        }
    }

    fn push_escaped(out: &mut String, value: &str) {
        for ch in value.chars() {
            if SPECIAL_CHARS.contains(&ch) {
                out.push('\\');
            }
            out.push(ch);
        }
    }
}

impl EntityReferenceSerializer<String> for DisplaySerializer {
    fn serialize(&self, reference: &EntityReference) -> String {
        let mut out = String::new();
        let mut previous: Option<EntityType> = None;
        for segment in reference.chain_iter() {
            if let Some(parent) = previous {
                out.push(Self::separator(parent, segment.kind()));
            }
            Self::push_escaped(&mut out, segment.name());
            if segment.has_parameters() {
                out.push('(');
                for (i, (key, value)) in segment.parameters().iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    Self::push_escaped(&mut out, key);
                    out.push('=');
                    Self::push_escaped(&mut out, &value.to_string());
                }
                out.push(')');
            }
            previous = Some(segment.kind());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferenceError;
    use crate::parameter::params;

    fn chain(segments: &[(EntityType, &str)]) -> EntityReference {
        EntityReference::from_segments(segments.iter().copied()).unwrap()
    }

    #[test]
    fn document_path() {
        let doc = chain(&[
            (EntityType::Wiki, "xwiki"),
            (EntityType::Space, "A"),
            (EntityType::Space, "B"),
            (EntityType::Document, "WebHome"),
        ]);
        assert_eq!(DisplaySerializer.serialize(&doc), "xwiki:A.B.WebHome");
    }

    #[test]
    fn attachment_and_object_separators() {
        let attachment = chain(&[
            (EntityType::Space, "Main"),
            (EntityType::Document, "WebHome"),
            (EntityType::Attachment, "logo.png"),
        ]);
        assert_eq!(DisplaySerializer.serialize(&attachment), "Main.WebHome@logo\\.png");

        let property = chain(&[
            (EntityType::Space, "Main"),
            (EntityType::Document, "WebHome"),
            (EntityType::Object, "XWiki.Tag[0]"),
            (EntityType::ObjectProperty, "tags"),
        ]);
        assert_eq!(
            DisplaySerializer.serialize(&property),
            "Main.WebHome^XWiki\\.Tag[0].tags"
        );
    }

    #[test]
    fn pages_use_slashes() {
        let page = chain(&[
            (EntityType::Wiki, "xwiki"),
            (EntityType::Page, "A"),
            (EntityType::Page, "B"),
        ]);
        assert_eq!(DisplaySerializer.serialize(&page), "xwiki:A/B");
    }

    #[test]
    fn parameters_are_appended() {
        let doc = EntityReference::from_parts(
            "WebHome",
            EntityType::Document,
            Some(chain(&[(EntityType::Space, "Main")])),
            Some(params([("locale", "fr")])),
        )
        .unwrap();
        assert_eq!(DisplaySerializer.serialize(&doc), "Main.WebHome(locale=fr)");
    }

    /// Resolver over `kind=name` pairs separated by `/`, used to exercise the
    /// trait contract.
    struct PairResolver;

    impl EntityReferenceResolver<&str> for PairResolver {
        fn resolve(&self, input: &str, kind: Option<EntityType>) -> Result<EntityReference> {
            let mut segments = Vec::new();
            for part in input.split('/') {
                let (kind, name) = part.split_once('=').ok_or(ReferenceError::InvalidName)?;
                segments.push((kind.parse::<EntityType>()?, name.to_string()));
            }
            let reference = EntityReference::from_segments(segments)?;
            match kind {
                Some(expected) if expected != reference.kind() => Err(ReferenceError::InvalidKind {
                    expected,
                    actual: reference.kind(),
                }),
                _ => Ok(reference),
            }
        }
    }

    #[test]
    fn resolver_contract() {
        let doc = PairResolver
            .resolve("wiki=xwiki/space=Main/document=WebHome", Some(EntityType::Document))
            .unwrap();
        assert_eq!(DisplaySerializer.serialize(&doc), "xwiki:Main.WebHome");
        assert!(matches!(
            PairResolver.resolve("wiki=xwiki", Some(EntityType::Space)),
            Err(ReferenceError::InvalidKind { .. })
        ));
        assert!(matches!(
            PairResolver.resolve("folder=x", None),
            Err(ReferenceError::UnknownEntityType(_))
        ));
    }
}
