use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;

/// The kind of entity a reference segment points to.
///
/// Every kind declares the kinds its parent may have. The first allowed
/// parent is the default one, used when a root reference does not say which
/// parent kind it stands under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Wiki,
    Space,
    Document,
    Attachment,
    Object,
    ObjectProperty,
    ClassProperty,
    Block,
    Page,
    PageAttachment,
    PageObject,
    PageObjectProperty,
    PageClassProperty,
}

impl EntityType {
    /// Every kind, in declaration order.
    pub const ALL: [EntityType; 13] = [
        Self::Wiki,
        Self::Space,
        Self::Document,
        Self::Attachment,
        Self::Object,
        Self::ObjectProperty,
        Self::ClassProperty,
        Self::Block,
        Self::Page,
        Self::PageAttachment,
        Self::PageObject,
        Self::PageObjectProperty,
        Self::PageClassProperty,
    ];

    /// Kinds allowed as direct parent, default parent first.
    pub fn allowed_parents(self) -> &'static [EntityType] {
        match self {
            Self::Wiki => &[],
            Self::Space => &[Self::Wiki, Self::Space],
            Self::Document => &[Self::Space],
            Self::Attachment => &[Self::Document],
            Self::Object => &[Self::Document],
            Self::ObjectProperty => &[Self::Object],
            Self::ClassProperty => &[Self::Document],
            Self::Block => &[Self::Document],
            Self::Page => &[Self::Wiki, Self::Page],
            Self::PageAttachment => &[Self::Page],
            Self::PageObject => &[Self::Page],
            Self::PageObjectProperty => &[Self::PageObject],
            Self::PageClassProperty => &[Self::Page],
        }
    }

    /// Returns `true` if `parent` may be the direct parent of this kind.
    pub fn allows_parent(self, parent: EntityType) -> bool {
        self.allowed_parents().contains(&parent)
    }

    /// The default parent kind, if this kind can have a parent at all.
    pub fn default_parent(self) -> Option<EntityType> {
        self.allowed_parents().first().copied()
    }

    /// Returns `true` if `ancestor` can appear somewhere above this kind in a
    /// reference chain.
    ///
    /// Self-parenting kinds (spaces, pages) are their own ancestors.
    pub fn is_allowed_ancestor(self, ancestor: EntityType) -> bool {
        let mut visited = [false; Self::ALL.len()];
        let mut pending: Vec<EntityType> = self.allowed_parents().to_vec();
        while let Some(kind) = pending.pop() {
            if kind == ancestor {
                return true;
            }
            if !visited[kind.index()] {
                visited[kind.index()] = true;
                pending.extend_from_slice(kind.allowed_parents());
            }
        }
        false
    }

    /// Returns `true` if `ancestor` is an allowed ancestor of this kind and a
    /// different kind.
    pub fn is_strict_ancestor(self, ancestor: EntityType) -> bool {
        self != ancestor && self.is_allowed_ancestor(ancestor)
    }

    /// Upper snake case name, as used in serialized forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wiki => "WIKI",
            Self::Space => "SPACE",
            Self::Document => "DOCUMENT",
            Self::Attachment => "ATTACHMENT",
            Self::Object => "OBJECT",
            Self::ObjectProperty => "OBJECT_PROPERTY",
            Self::ClassProperty => "CLASS_PROPERTY",
            Self::Block => "BLOCK",
            Self::Page => "PAGE",
            Self::PageAttachment => "PAGE_ATTACHMENT",
            Self::PageObject => "PAGE_OBJECT",
            Self::PageObjectProperty => "PAGE_OBJECT_PROPERTY",
            Self::PageClassProperty => "PAGE_CLASS_PROPERTY",
        }
    }

    /// Lower case name (e.g. `object_property`).
    pub fn lower_case(self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Human readable label (e.g. `Object property`).
    pub fn label(self) -> String {
        let lower = self.lower_case().replace('_', " ");
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => lower,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ReferenceError;

    /// Case-insensitive, underscores optional: `OBJECT_PROPERTY`,
    /// `object_property` and `ObjectProperty` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().replace('_', "") == wanted)
            .ok_or_else(|| ReferenceError::UnknownEntityType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiki_has_no_parent() {
        assert!(EntityType::Wiki.allowed_parents().is_empty());
        assert_eq!(EntityType::Wiki.default_parent(), None);
    }

    #[test]
    fn default_parent_is_first_allowed() {
        assert_eq!(EntityType::Space.default_parent(), Some(EntityType::Wiki));
        assert_eq!(EntityType::Document.default_parent(), Some(EntityType::Space));
        assert_eq!(EntityType::Page.default_parent(), Some(EntityType::Wiki));
    }

    #[test]
    fn ancestors_are_transitive() {
        assert!(EntityType::ObjectProperty.is_allowed_ancestor(EntityType::Wiki));
        assert!(EntityType::Attachment.is_allowed_ancestor(EntityType::Space));
        assert!(EntityType::PageObjectProperty.is_allowed_ancestor(EntityType::Page));
        assert!(!EntityType::Attachment.is_allowed_ancestor(EntityType::Object));
        assert!(!EntityType::Wiki.is_allowed_ancestor(EntityType::Wiki));
    }

    #[test]
    fn self_parenting_kinds_are_their_own_ancestor() {
        assert!(EntityType::Space.is_allowed_ancestor(EntityType::Space));
        assert!(!EntityType::Space.is_strict_ancestor(EntityType::Space));
        assert!(EntityType::Document.is_strict_ancestor(EntityType::Space));
    }

    #[test]
    fn page_and_document_hierarchies_are_disjoint() {
        assert!(!EntityType::Document.is_allowed_ancestor(EntityType::Page));
        assert!(!EntityType::Page.is_allowed_ancestor(EntityType::Space));
    }

    #[test]
    fn parse_accepts_several_spellings() {
        assert_eq!("OBJECT_PROPERTY".parse::<EntityType>().unwrap(), EntityType::ObjectProperty);
        assert_eq!("object_property".parse::<EntityType>().unwrap(), EntityType::ObjectProperty);
        assert_eq!("ObjectProperty".parse::<EntityType>().unwrap(), EntityType::ObjectProperty);
        assert_eq!("wiki".parse::<EntityType>().unwrap(), EntityType::Wiki);
        assert!(matches!(
            "folder".parse::<EntityType>(),
            Err(ReferenceError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn serde_uses_upper_snake_case() {
        let json = serde_json::to_string(&EntityType::PageClassProperty).unwrap();
        assert_eq!(json, "\"PAGE_CLASS_PROPERTY\"");
        let parsed: EntityType = serde_json::from_str("\"CLASS_PROPERTY\"").unwrap();
        assert_eq!(parsed, EntityType::ClassProperty);
    }

    #[test]
    fn lower_case_name() {
        assert_eq!(EntityType::PageObject.lower_case(), "page_object");
    }

    #[test]
    fn label_is_capitalized() {
        assert_eq!(EntityType::Document.label(), "Document");
        assert_eq!(EntityType::ObjectProperty.label(), "Object property");
    }
}
