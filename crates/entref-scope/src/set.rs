use entref_model::{EntityReference, EntityType};
use tracing::trace;

use crate::config::ScopeConfig;
use crate::pattern::{Descent, PatternEntry, PatternSegment};

/// A scope over entity references, described by include and exclude
/// patterns.
///
/// With no include pattern everything is included; with no exclude pattern
/// nothing is excluded. A reference [`matches`](Self::matches) when it is
/// included and not excluded.
///
/// Patterns are added through `&mut self`. Once built, the set only needs
/// `&self` and can be shared behind an `Arc` by any number of readers.
///
/// ```
/// use entref_model::{DocumentReference, SpaceReference};
/// use entref_scope::EntityReferenceSet;
///
/// let main = SpaceReference::root("Main").unwrap();
/// let scope = EntityReferenceSet::new().with_include(&main);
///
/// assert!(scope.matches(&DocumentReference::new("WebHome", main).unwrap()));
/// assert!(!scope.matches(&DocumentReference::local("Other", "WebHome").unwrap()));
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntityReferenceSet {
    includes: PatternEntry,
    excludes: PatternEntry,
    config: ScopeConfig,
}

impl EntityReferenceSet {
    /// An empty set with the default configuration: matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScopeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Building
    // ---------------------------------------------------------------

    /// Include `reference` and everything below it.
    pub fn includes(&mut self, reference: impl AsRef<EntityReference>) -> &mut Self {
        let reference = reference.as_ref();
        trace!(reference = %reference, "adding include pattern");
        self.includes.insert(segments_of(reference));
        self
    }

    /// Exclude `reference` and everything below it.
    pub fn excludes(&mut self, reference: impl AsRef<EntityReference>) -> &mut Self {
        let reference = reference.as_ref();
        trace!(reference = %reference, "adding exclude pattern");
        self.excludes.insert(segments_of(reference));
        self
    }

    /// Include every entity of `kind` directly under `parent`, or at the top
    /// level when `parent` is `None`.
    pub fn includes_any(&mut self, kind: EntityType, parent: Option<&EntityReference>) -> &mut Self {
        trace!(%kind, parent = ?parent, "adding wildcard include pattern");
        self.includes.insert(wildcard_segments(kind, parent));
        self
    }

    /// Exclude every entity of `kind` directly under `parent`, or at the top
    /// level when `parent` is `None`.
    pub fn excludes_any(&mut self, kind: EntityType, parent: Option<&EntityReference>) -> &mut Self {
        trace!(%kind, parent = ?parent, "adding wildcard exclude pattern");
        self.excludes.insert(wildcard_segments(kind, parent));
        self
    }

    /// Builder form of [`includes`](Self::includes).
    pub fn with_include(mut self, reference: impl AsRef<EntityReference>) -> Self {
        self.includes(reference);
        self
    }

    /// Builder form of [`excludes`](Self::excludes).
    pub fn with_exclude(mut self, reference: impl AsRef<EntityReference>) -> Self {
        self.excludes(reference);
        self
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Returns `true` if `reference` is included and not excluded.
    pub fn matches(&self, reference: impl AsRef<EntityReference>) -> bool {
        let reference = reference.as_ref();
        let chain: Vec<&EntityReference> = reference.chain_iter().collect();
        let included = self.is_included(&chain, reference.kind());
        let excluded = included && self.is_excluded(&chain);
        trace!(reference = %reference, included, excluded, "scope match");
        included && !excluded
    }

    /// Returns `true` if no pattern has been added.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }

    pub fn has_excludes(&self) -> bool {
        !self.excludes.is_empty()
    }

    fn is_included(&self, chain: &[&EntityReference], leaf: EntityType) -> bool {
        self.includes.is_empty()
            || self
                .includes
                .reaches(chain, Descent::Include { leaf }, self.config.include_parameters)
    }

    fn is_excluded(&self, chain: &[&EntityReference]) -> bool {
        !self.excludes.is_empty()
            && self
                .excludes
                .reaches(chain, Descent::Exclude, self.config.exclude_parameters)
    }
}

fn segments_of(reference: &EntityReference) -> Vec<PatternSegment<'_>> {
    reference.chain_iter().map(PatternSegment::from_reference).collect()
}

fn wildcard_segments(kind: EntityType, parent: Option<&EntityReference>) -> Vec<PatternSegment<'_>> {
    let mut segments = parent.map(segments_of).unwrap_or_default();
    segments.push(PatternSegment::wildcard(kind));
    segments
}
