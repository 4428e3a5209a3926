//! End-to-end scope scenarios over typed references.

use std::sync::Arc;
use std::thread;

use entref_model::{
    params, AttachmentReference, DocumentReference, EntityReference, EntityType, SpaceReference,
    WikiReference,
};
use entref_scope::{EntityReferenceSet, ParameterMatch, ScopeConfig};

fn xwiki() -> WikiReference {
    WikiReference::new("xwiki").unwrap()
}

fn space(name: &str) -> SpaceReference {
    SpaceReference::new(name, xwiki()).unwrap()
}

fn document(space_name: &str, name: &str) -> DocumentReference {
    DocumentReference::new(name, space(space_name)).unwrap()
}

fn translated(document: &DocumentReference, locale: &str) -> DocumentReference {
    document.with_locale(Some(locale)).unwrap()
}

// ============================================================================
// Prefix inclusion
// ============================================================================

#[test]
fn including_a_space_includes_its_documents() {
    let scope = EntityReferenceSet::new().with_include(space("Main"));

    assert!(scope.matches(document("Main", "WebHome")));
    assert!(scope.matches(document("Main", "Other")));
    assert!(!scope.matches(document("Sandbox", "WebHome")));
}

#[test]
fn more_specific_include_narrows_the_space() {
    let mut scope = EntityReferenceSet::new();
    scope
        .includes(space("Main"))
        .includes(document("Main", "WebHome"));

    assert!(scope.matches(document("Main", "WebHome")));
    assert!(!scope.matches(document("Main", "Other")));
    assert!(scope.matches(space("Main")));
}

#[test]
fn attachment_under_an_included_document() {
    let main = SpaceReference::root("Main").unwrap();
    let home = DocumentReference::new("WebHome", main).unwrap();
    let scope = EntityReferenceSet::new().with_include(&home);

    let attachment = AttachmentReference::new("x.png", home.clone()).unwrap();
    assert!(scope.matches(&attachment));
    assert!(!scope.matches(DocumentReference::local("Other", "WebHome").unwrap()));
}

// ============================================================================
// Exclusion
// ============================================================================

#[test]
fn exclude_overrides_include() {
    let mut scope = EntityReferenceSet::new();
    scope
        .includes(space("Main"))
        .excludes(document("Main", "Private"));

    assert!(!scope.matches(document("Main", "Private")));
    assert!(scope.matches(document("Main", "WebHome")));

    let attachment = AttachmentReference::new("secret.txt", document("Main", "Private")).unwrap();
    assert!(!scope.matches(attachment));
}

#[test]
fn exclude_more_specific_than_the_reference_does_not_apply() {
    let attachment = AttachmentReference::new("logo.png", document("Main", "WebHome")).unwrap();
    let scope = EntityReferenceSet::new().with_exclude(&attachment);

    assert!(!scope.matches(&attachment));
    assert!(scope.matches(document("Main", "WebHome")));
    assert!(scope.matches(space("Main")));
}

// ============================================================================
// Wildcards
// ============================================================================

#[test]
fn wildcard_document_under_a_space() {
    let main = space("Main");
    let mut scope = EntityReferenceSet::new();
    scope.includes_any(EntityType::Document, Some(main.as_reference()));

    for name in ["WebHome", "Other", "Anything"] {
        assert!(scope.matches(document("Main", name)), "{name} should match");
    }
    assert!(!scope.matches(document("Sandbox", "WebHome")));
}

#[test]
fn relative_pattern_applies_to_every_wiki() {
    let relative = DocumentReference::local("Main", "WebHome").unwrap();
    let scope = EntityReferenceSet::new().with_include(&relative);

    let elsewhere = DocumentReference::new(
        "WebHome",
        SpaceReference::new("Main", WikiReference::new("dev").unwrap()).unwrap(),
    )
    .unwrap();
    assert!(scope.matches(document("Main", "WebHome")));
    assert!(scope.matches(elsewhere));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn include_gated_by_locale() {
    let home = document("Main", "WebHome");
    let scope = EntityReferenceSet::new().with_include(translated(&home, "fr"));

    assert!(scope.matches(translated(&home, "fr")));
    assert!(!scope.matches(translated(&home, "en")));
    assert!(scope.matches(&home));
}

/// An exclude carrying a locale: any reference carrying a locale is excluded,
/// whatever its value, while the one without is left alone.
#[test]
fn exclude_with_parameters_and_reference_without_them() {
    let home = document("Main", "WebHome");
    let scope = EntityReferenceSet::new().with_exclude(translated(&home, "fr"));

    assert!(!scope.matches(translated(&home, "fr")));
    assert!(!scope.matches(translated(&home, "en")));
    assert!(scope.matches(&home));

    let attachment = AttachmentReference::new("a.png", home.clone()).unwrap();
    assert!(scope.matches(attachment));
}

#[test]
fn exclude_parameter_rules_are_configurable() {
    let home = document("Main", "WebHome");
    let exclude = translated(&home, "fr");

    let compatible = EntityReferenceSet::with_config(ScopeConfig::uniform(ParameterMatch::Compatible))
        .with_exclude(&exclude);
    assert!(!compatible.matches(&home));
    assert!(compatible.matches(translated(&home, "en")));

    let config = ScopeConfig::from_toml_str("exclude_parameters = \"exact\"").unwrap();
    let exact = EntityReferenceSet::with_config(config).with_exclude(&exclude);
    assert!(exact.matches(&home));
    assert!(exact.matches(translated(&home, "en")));
    assert!(!exact.matches(translated(&home, "fr")));
}

#[test]
fn several_parameters_must_all_hold() {
    let main = space("Main");
    let versioned = EntityReference::from_parts(
        "WebHome",
        EntityType::Document,
        Some(main.clone().into()),
        Some(params([("locale", "fr"), ("version", "2")])),
    )
    .unwrap();
    let scope = EntityReferenceSet::new().with_include(&versioned);

    let other_version = versioned
        .replace_parameters(params([("locale", "fr"), ("version", "1")]))
        .unwrap();
    assert!(scope.matches(&versioned));
    assert!(!scope.matches(other_version));
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn frozen_scope_is_shared_between_threads() {
    let mut scope = EntityReferenceSet::new();
    scope
        .includes(space("Main"))
        .excludes(document("Main", "Private"));
    let scope = Arc::new(scope);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let scope = Arc::clone(&scope);
            thread::spawn(move || {
                let name = format!("Doc{i}");
                scope.matches(document("Main", &name)) && !scope.matches(document("Main", "Private"))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
