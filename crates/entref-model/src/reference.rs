//! The immutable hierarchical entity reference.
//!
//! An [`EntityReference`] is one segment of a path-like identifier (a name
//! and a kind, plus optional parameters) linked to its parent segment. Parents
//! are shared between all the references built on top of them, so cloning a
//! reference or deriving a new one from it never copies the untouched part of
//! the chain.
//!
//! # Invariants
//!
//! - The name is never empty.
//! - A parent, when present, has one of the allowed parent kinds of the
//!   child kind.
//! - The parameter map is absent when empty. The reserved
//!   [`FALLBACK_PARENT_TYPE`] parameter only lives on a root reference and
//!   always names an allowed parent kind.
//!
//! Every "mutator" returns a new reference; nothing is modified after
//! construction.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::entity_type::EntityType;
use crate::error::{ReferenceError, Result};
use crate::parameter::{ParameterValue, Parameters, FALLBACK_PARENT_TYPE};
use crate::serializer::{DisplaySerializer, EntityReferenceSerializer};

static NO_PARAMETERS: Parameters = Parameters::new();

/// A typed, immutable reference to an entity.
///
/// Cloning is cheap: a reference is a pointer to a shared node.
#[derive(Clone)]
pub struct EntityReference {
    inner: Arc<Node>,
}

struct Node {
    name: String,
    kind: EntityType,
    parent: Option<EntityReference>,
    parameters: Option<Parameters>,
    depth: usize,
    /// Ancestors, root first. Computed on first use; racing initializers
    /// compute the same value and only one is published.
    ancestors: OnceLock<Vec<EntityReference>>,
}

/// Chains can be arbitrarily deep (spaces nest), so releasing one walks up
/// the parents in a loop instead of letting each node drop the next.
impl Drop for Node {
    fn drop(&mut self) {
        // The memoized ancestors hold extra counts on the whole chain.
        drop(self.ancestors.take());
        let mut parent = self.parent.take();
        while let Some(reference) = parent {
            match Arc::try_unwrap(reference.inner) {
                Ok(mut node) => {
                    drop(node.ancestors.take());
                    parent = node.parent.take();
                }
                Err(_) => break,
            }
        }
    }
}

impl EntityReference {
    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    /// Create a root reference.
    pub fn new(name: impl Into<String>, kind: EntityType) -> Result<Self> {
        Self::from_parts(name, kind, None, None)
    }

    /// Create a reference under `parent`.
    pub fn with_parent(
        name: impl Into<String>,
        kind: EntityType,
        parent: impl Into<EntityReference>,
    ) -> Result<Self> {
        Self::from_parts(name, kind, Some(parent.into()), None)
    }

    /// Create a root reference carrying parameters.
    pub fn with_parameters(
        name: impl Into<String>,
        kind: EntityType,
        parameters: Parameters,
    ) -> Result<Self> {
        Self::from_parts(name, kind, None, Some(parameters))
    }

    /// Create a reference from all of its parts, validating every invariant.
    pub fn from_parts(
        name: impl Into<String>,
        kind: EntityType,
        parent: Option<EntityReference>,
        parameters: Option<Parameters>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            debug!(%kind, "rejected entity reference with an empty name");
            return Err(ReferenceError::InvalidName);
        }
        if let Some(parent) = &parent {
            if !kind.allows_parent(parent.kind()) {
                debug!(%kind, parent = %parent.kind(), %name, "rejected entity reference parent");
                return Err(ReferenceError::InvalidParentKind {
                    kind,
                    parent: parent.kind(),
                });
            }
        }
        let parameters = normalize_parameters(kind, parent.is_some(), parameters)?;
        Ok(Self::assemble(name, kind, parent, parameters))
    }

    /// Build a chain from `(kind, name)` segments given root first.
    ///
    /// Fails with [`ReferenceError::EmptyChain`] when there is no segment.
    ///
    /// ```
    /// use entref_model::{EntityReference, EntityType};
    ///
    /// let doc = EntityReference::from_segments([
    ///     (EntityType::Wiki, "xwiki"),
    ///     (EntityType::Space, "Main"),
    ///     (EntityType::Document, "WebHome"),
    /// ])
    /// .unwrap();
    /// assert_eq!(doc.depth(), 3);
    /// ```
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = (EntityType, S)>,
        S: Into<String>,
    {
        let mut current: Option<EntityReference> = None;
        for (kind, name) in segments {
            current = Some(Self::from_parts(name, kind, current.take(), None)?);
        }
        current.ok_or(ReferenceError::EmptyChain)
    }

    /// Same name, kind and parent with a new parameter map.
    pub fn replace_parameters(&self, parameters: Parameters) -> Result<Self> {
        Self::from_parts(
            self.name(),
            self.kind(),
            self.parent().cloned(),
            Some(parameters),
        )
    }

    /// Assemble an already validated node.
    fn assemble(
        name: String,
        kind: EntityType,
        parent: Option<EntityReference>,
        parameters: Option<Parameters>,
    ) -> Self {
        let depth = parent.as_ref().map_or(1, |p| p.depth() + 1);
        Self {
            inner: Arc::new(Node {
                name,
                kind,
                parent,
                parameters,
                depth,
                ancestors: OnceLock::new(),
            }),
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> EntityType {
        self.inner.kind
    }

    pub fn parent(&self) -> Option<&EntityReference> {
        self.inner.parent.as_ref()
    }

    /// The parameters of this segment; an empty map when there are none.
    pub fn parameters(&self) -> &Parameters {
        self.inner.parameters.as_ref().unwrap_or(&NO_PARAMETERS)
    }

    pub fn has_parameters(&self) -> bool {
        self.inner.parameters.is_some()
    }

    pub fn parameter(&self, key: &str) -> Option<&ParameterValue> {
        self.inner.parameters.as_ref()?.get(key)
    }

    /// Number of segments from the root down to this reference.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Returns `true` if both values point to the same node.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The top-most reference of the chain.
    pub fn root(&self) -> &EntityReference {
        self.ancestors().first().unwrap_or(self)
    }

    /// Ancestors of this reference, root first, excluding `self`.
    pub fn ancestors(&self) -> &[EntityReference] {
        self.inner.ancestors.get_or_init(|| {
            let mut ancestors = Vec::with_capacity(self.depth() - 1);
            let mut current = self.parent();
            while let Some(reference) = current {
                ancestors.push(reference.clone());
                current = reference.parent();
            }
            ancestors.reverse();
            ancestors
        })
    }

    /// Iterate the chain from the root down to `self`.
    pub fn chain_iter(&self) -> impl Iterator<Item = &EntityReference> + '_ {
        self.ancestors().iter().chain(std::iter::once(self))
    }

    /// The chain from the root down to `self`.
    pub fn chain(&self) -> Vec<EntityReference> {
        self.chain_iter().cloned().collect()
    }

    /// The kind of the parent, real or assumed.
    ///
    /// For a root reference this is the fallback parent kind parameter if
    /// set, otherwise the default parent kind of this kind.
    pub fn effective_parent_kind(&self) -> Option<EntityType> {
        match self.parent() {
            Some(parent) => Some(parent.kind()),
            None => self
                .parameter(FALLBACK_PARENT_TYPE)
                .and_then(ParameterValue::as_kind)
                .or_else(|| self.kind().default_parent()),
        }
    }

    // ---------------------------------------------------------------
    // Extraction
    // ---------------------------------------------------------------

    /// The nearest reference of `kind`, starting from `self` and walking up.
    pub fn extract_nearest(&self, kind: EntityType) -> Option<&EntityReference> {
        let mut current = Some(self);
        while let Some(reference) = current {
            if reference.kind() == kind {
                return Some(reference);
            }
            current = reference.parent();
        }
        None
    }

    /// The outermost reference of the first run of `kind` found walking up.
    ///
    /// On `wiki:a.b.page`, the outermost space is `a`.
    pub fn extract_outermost(&self, kind: EntityType) -> Option<&EntityReference> {
        let mut reference = self.extract_nearest(kind)?;
        while let Some(parent) = reference.parent() {
            if parent.kind() != kind {
                break;
            }
            reference = parent;
        }
        Some(reference)
    }

    /// Returns `true` if `candidate` is somewhere in the parent chain.
    ///
    /// `None` is an ancestor of exactly the root references.
    pub fn has_ancestor(&self, candidate: Option<&EntityReference>) -> bool {
        match candidate {
            None => self.parent().is_none(),
            Some(candidate) => self.ancestors().iter().any(|a| a == candidate),
        }
    }

    // ---------------------------------------------------------------
    // Derivation
    // ---------------------------------------------------------------

    /// Replace `old` wherever it sits in the parent chain with `new`.
    ///
    /// Returns `self` unchanged when `old` and `new` are the same node.
    pub fn replace_ancestor(&self, old: &EntityReference, new: &EntityReference) -> Result<Self> {
        if Self::ptr_eq(old, new) {
            return Ok(self.clone());
        }
        self.ensure_ancestor(old)?;
        self.rebuild(Some(old), Some(new))
    }

    /// Replace the direct parent. Passing `None` makes this a root.
    pub fn replace_parent(&self, new: Option<&EntityReference>) -> Result<Self> {
        let unchanged = match (self.parent(), new) {
            (None, None) => true,
            (Some(current), Some(new)) => Self::ptr_eq(current, new),
            _ => false,
        };
        if unchanged {
            return Ok(self.clone());
        }
        Self::from_parts(
            self.name(),
            self.kind(),
            new.cloned(),
            self.inner.parameters.clone(),
        )
    }

    /// Put `new_root` above the current root.
    pub fn append_root(&self, new_root: Option<&EntityReference>) -> Result<Self> {
        match new_root {
            None => Ok(self.clone()),
            Some(new_root) => self.rebuild(None, Some(new_root)),
        }
    }

    /// Cut the chain where `ancestor` sits: its child becomes the new root.
    pub fn truncate_at(&self, ancestor: Option<&EntityReference>) -> Result<Self> {
        match ancestor {
            None => Ok(self.clone()),
            Some(ancestor) => {
                self.ensure_ancestor(ancestor)?;
                self.rebuild(Some(ancestor), None)
            }
        }
    }

    /// Drop parameters from this segment, or from the whole chain when
    /// `recursive`. Untouched ancestors are reused.
    pub fn without_parameters(&self, recursive: bool) -> Self {
        if !recursive {
            if !self.has_parameters() {
                return self.clone();
            }
            return Self::assemble(
                self.inner.name.clone(),
                self.kind(),
                self.parent().cloned(),
                None,
            );
        }

        let mut current: Option<EntityReference> = None;
        for entry in self.chain_iter() {
            let same_parent = match (entry.parent(), current.as_ref()) {
                (None, None) => true,
                (Some(parent), Some(current)) => Self::ptr_eq(parent, current),
                _ => false,
            };
            current = Some(if same_parent && !entry.has_parameters() {
                entry.clone()
            } else {
                Self::assemble(entry.inner.name.clone(), entry.kind(), current.take(), None)
            });
        }
        current.unwrap_or_else(|| self.clone())
    }

    fn ensure_ancestor(&self, ancestor: &EntityReference) -> Result<()> {
        if self.has_ancestor(Some(ancestor)) {
            Ok(())
        } else {
            Err(self.broken_chain(ancestor))
        }
    }

    /// Clone the chain, substituting `old` (or the missing parent of the
    /// root when `old` is `None`) with `new`. Segments above the
    /// substitution are shared with `self`.
    fn rebuild(&self, old: Option<&EntityReference>, new: Option<&EntityReference>) -> Result<Self> {
        let ancestors = self.ancestors();
        let start = match old {
            None => 0,
            Some(old) => {
                let position = ancestors
                    .iter()
                    .position(|ancestor| ancestor == old)
                    .ok_or_else(|| self.broken_chain(old))?;
                position + 1
            }
        };

        let mut current = new.cloned();
        for segment in ancestors[start..].iter().chain(std::iter::once(self)) {
            current = Some(Self::from_parts(
                segment.name(),
                segment.kind(),
                current.take(),
                segment.inner.parameters.clone(),
            )?);
        }
        // The loop always runs at least once, for `self`.
        Ok(current.unwrap_or_else(|| self.clone()))
    }

    fn broken_chain(&self, ancestor: &EntityReference) -> ReferenceError {
        ReferenceError::BrokenChainReplace {
            ancestor: ancestor.to_string(),
            reference: self.to_string(),
        }
    }

    // ---------------------------------------------------------------
    // Partial comparison
    // ---------------------------------------------------------------

    /// Compare name, kind and parameters, ignoring the parents.
    pub fn equals_non_recursive(&self, other: &EntityReference) -> bool {
        Self::ptr_eq(self, other)
            || (self.name() == other.name()
                && self.kind() == other.kind()
                && self.inner.parameters == other.inner.parameters)
    }

    /// Compare the segments from the leaf up to the `to` level (inclusive).
    ///
    /// Segments above `to` are ignored, so `space.page` equals
    /// `wiki:space.page` up to [`EntityType::Space`]. `None` compares the
    /// whole chain.
    pub fn equals_up_to(&self, other: &EntityReference, to: Option<EntityType>) -> bool {
        let Some(to) = to else {
            return self == other;
        };
        if Self::ptr_eq(self, other) {
            return true;
        }

        let mut current = Some(self);
        let mut other_current = Some(other);
        while let Some(reference) = current {
            if reference.kind() != to && !reference.kind().is_allowed_ancestor(to) {
                break;
            }
            match other_current {
                Some(o) if reference.equals_non_recursive(o) => {}
                _ => return false,
            }
            current = reference.parent();
            other_current = other_current.and_then(EntityReference::parent);
        }

        other_current.map_or(true, |o| to.is_allowed_ancestor(o.kind()))
    }

    /// Compare the window between the nearest `from` segment and the `to`
    /// level (both inclusive).
    pub fn equals_in_range(
        &self,
        other: &EntityReference,
        from: Option<EntityType>,
        to: Option<EntityType>,
    ) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        let (start, other_start) = match from {
            Some(from) => (self.extract_nearest(from), other.extract_nearest(from)),
            None => (Some(self), Some(other)),
        };
        match (start, other_start) {
            (Some(a), Some(b)) => a.equals_up_to(b, to),
            (None, None) => true,
            _ => false,
        }
    }
}

fn normalize_parameters(
    kind: EntityType,
    has_parent: bool,
    parameters: Option<Parameters>,
) -> Result<Option<Parameters>> {
    let Some(mut parameters) = parameters else {
        return Ok(None);
    };
    if let Some(value) = parameters.remove(FALLBACK_PARENT_TYPE) {
        // Only meaningful on a root; dropped otherwise.
        if !has_parent {
            let fallback = value
                .as_kind()
                .ok_or_else(|| ReferenceError::UnknownEntityType(value.to_string()))?;
            if !kind.allows_parent(fallback) {
                debug!(%kind, %fallback, "rejected fallback parent kind");
                return Err(ReferenceError::InvalidFallbackParentKind { kind, fallback });
            }
            parameters.insert(FALLBACK_PARENT_TYPE.to_string(), ParameterValue::Kind(fallback));
        }
    }
    Ok((!parameters.is_empty()).then_some(parameters))
}

// ---------------------------------------------------------------
// Equality, hashing, ordering
// ---------------------------------------------------------------

impl PartialEq for EntityReference {
    fn eq(&self, other: &Self) -> bool {
        if self.depth() != other.depth() {
            return false;
        }
        let mut pair = Some((self, other));
        while let Some((a, b)) = pair {
            if Self::ptr_eq(a, b) {
                return true;
            }
            if !a.equals_non_recursive(b) {
                return false;
            }
            pair = a.parent().zip(b.parent());
        }
        true
    }
}

impl Eq for EntityReference {}

impl Hash for EntityReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.depth().hash(state);
        let mut current = Some(self);
        while let Some(reference) = current {
            reference.name().hash(state);
            reference.kind().hash(state);
            reference.inner.parameters.hash(state);
            current = reference.parent();
        }
    }
}

impl PartialOrd for EntityReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Root-to-leaf comparison of `(name, parameters)`; a strict prefix sorts
/// first. Kinds only break ties between otherwise identical chains.
impl Ord for EntityReference {
    fn cmp(&self, other: &Self) -> Ordering {
        if Self::ptr_eq(self, other) {
            return Ordering::Equal;
        }
        for (a, b) in self.chain_iter().zip(other.chain_iter()) {
            let ordering = a
                .name()
                .cmp(b.name())
                .then_with(|| a.parameters().cmp(b.parameters()));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.depth().cmp(&other.depth()).then_with(|| {
            self.chain_iter()
                .map(EntityReference::kind)
                .cmp(other.chain_iter().map(EntityReference::kind))
        })
    }
}

impl AsRef<EntityReference> for EntityReference {
    fn as_ref(&self) -> &EntityReference {
        self
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind().label(), DisplaySerializer.serialize(self))
    }
}

impl fmt::Debug for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityReference({self})")
    }
}

// ---------------------------------------------------------------
// Serde
// ---------------------------------------------------------------

/// Parents nest as records, so the depth a format accepts bounds the depth
/// of a chain that round trips (`serde_json` stops at 128 levels).
impl Serialize for EntityReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EntityReference", 4)?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("type", &self.kind())?;
        match self.parent() {
            Some(parent) => state.serialize_field("parent", parent)?,
            None => state.skip_field("parent")?,
        }
        match &self.inner.parameters {
            Some(parameters) => state.serialize_field("parameters", parameters)?,
            None => state.skip_field("parameters")?,
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct RawReference {
    name: String,
    #[serde(rename = "type")]
    kind: EntityType,
    #[serde(default)]
    parent: Option<EntityReference>,
    #[serde(default)]
    parameters: Option<Parameters>,
}

impl<'de> Deserialize<'de> for EntityReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawReference::deserialize(deserializer)?;
        Self::from_parts(raw.name, raw.kind, raw.parent, raw.parameters).map_err(D::Error::custom)
    }
}
