//! The pattern trie behind a scope.
//!
//! Entries are keyed by kind, then by name; the `None` name is a wildcard.
//! Wildcards come from two places: explicit "any entity of this kind"
//! patterns, and pass-through levels inserted so that a pattern starting
//! lower in the hierarchy (a space without its wiki) can sit next to
//! patterns that start higher.

use std::collections::BTreeMap;

use entref_model::{EntityReference, EntityType, Parameters, FALLBACK_PARENT_TYPE};

use crate::config::ParameterMatch;

/// One level of the pattern trie.
#[derive(Clone, Debug, Default)]
pub(crate) struct PatternEntry {
    /// Kind of this level; `None` on the root.
    kind: Option<EntityType>,
    /// Parameter constraint sets, one per insertion through this entry.
    constraints: Vec<Parameters>,
    children: BTreeMap<EntityType, BTreeMap<Option<String>, PatternEntry>>,
}

/// A segment of a pattern being inserted.
pub(crate) struct PatternSegment<'a> {
    pub kind: EntityType,
    pub name: Option<&'a str>,
    pub parameters: Parameters,
}

impl<'a> PatternSegment<'a> {
    pub fn from_reference(reference: &'a EntityReference) -> Self {
        let mut parameters = reference.parameters().clone();
        parameters.remove(FALLBACK_PARENT_TYPE);
        Self {
            kind: reference.kind(),
            name: Some(reference.name()),
            parameters,
        }
    }

    pub fn wildcard(kind: EntityType) -> Self {
        Self {
            kind,
            name: None,
            parameters: Parameters::new(),
        }
    }
}

impl PatternEntry {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert a root-first pattern.
    pub fn insert<'a>(&mut self, segments: impl IntoIterator<Item = PatternSegment<'a>>) {
        let mut current = self;
        for segment in segments {
            while let Some(kind) = current.pass_through_kind(segment.kind) {
                current = current.child_mut(kind, None);
            }
            current = current.child_mut(segment.kind, segment.name);
            if !current.constraints.contains(&segment.parameters) {
                current.constraints.push(segment.parameters);
            }
        }
    }

    /// The kind of an existing level to pass through before `kind` can be
    /// inserted, if `kind` does not fit here yet.
    fn pass_through_kind(&self, kind: EntityType) -> Option<EntityType> {
        if self.children.is_empty() || self.children.contains_key(&kind) {
            return None;
        }
        self.children
            .keys()
            .copied()
            .find(|child| kind.is_strict_ancestor(*child))
    }

    fn child_mut(&mut self, kind: EntityType, name: Option<&str>) -> &mut PatternEntry {
        self.children
            .entry(kind)
            .or_default()
            .entry(name.map(str::to_string))
            .or_insert_with(|| PatternEntry {
                kind: Some(kind),
                ..PatternEntry::default()
            })
    }

    fn accepts(&self, segment: &EntityReference, mode: ParameterMatch) -> bool {
        self.constraints.is_empty()
            || self
                .constraints
                .iter()
                .any(|constraint| mode.accepts(constraint, segment.parameters()))
    }

    /// Returns `true` if some pattern of this trie ends at or above `chain`,
    /// the root-first chain still to consume.
    ///
    /// An entry without children leaves the rest of the chain unconstrained.
    /// An entry with children only lets the chain through one of them, so a
    /// longer pattern inserted under a shorter one narrows it.
    ///
    /// A segment is consumed by, in order: the named child, the wildcard
    /// child, a pass-through wildcard of an ancestor kind (nothing consumed)
    /// or by skipping it when it sits above every child kind and does not
    /// continue a run of the current kind.
    pub fn reaches(&self, chain: &[&EntityReference], descent: Descent, mode: ParameterMatch) -> bool {
        if self.children.is_empty() {
            return true;
        }
        let Some((segment, rest)) = chain.split_first() else {
            return match descent {
                Descent::Include { leaf } => self
                    .children
                    .keys()
                    .any(|child| child.is_allowed_ancestor(leaf)),
                Descent::Exclude => false,
            };
        };
        let kind = segment.kind();

        if let Some(by_name) = self.children.get(&kind) {
            let named = by_name.get(&Some(segment.name().to_string()));
            let wildcard = by_name.get(&None);
            for entry in [named, wildcard].into_iter().flatten() {
                if entry.accepts(segment, mode) && entry.reaches(rest, descent, mode) {
                    return true;
                }
            }
        }

        for (child_kind, by_name) in &self.children {
            if !kind.is_strict_ancestor(*child_kind) {
                continue;
            }
            if let Some(wildcard) = by_name.get(&None) {
                if wildcard.reaches(chain, descent, mode) {
                    return true;
                }
            }
        }

        let skippable = self.kind != Some(kind)
            && self
                .children
                .keys()
                .any(|child| child.is_strict_ancestor(kind));
        skippable && self.reaches(rest, descent, mode)
    }
}

/// What a descent is looking for.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Descent {
    /// Include patterns; `leaf` is the kind of the matched reference. When
    /// the chain runs out first, the entry still matches if `leaf` may be
    /// the ancestor of one of its children, so that ancestors of an
    /// included entity are in scope.
    Include { leaf: EntityType },
    /// Exclude patterns; the chain running out first is not excluded.
    Exclude,
}
