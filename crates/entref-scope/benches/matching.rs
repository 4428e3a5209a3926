use criterion::{black_box, criterion_group, criterion_main, Criterion};
use entref_model::{EntityReference, EntityType};
use entref_scope::EntityReferenceSet;

fn document(wiki: &str, space: &str, name: &str) -> EntityReference {
    EntityReference::from_segments([
        (EntityType::Wiki, wiki),
        (EntityType::Space, space),
        (EntityType::Document, name),
    ])
    .unwrap()
}

fn build_scope(spaces: usize) -> EntityReferenceSet {
    let mut scope = EntityReferenceSet::new();
    for i in 0..spaces {
        let space = format!("Space{i}");
        scope.includes(
            EntityReference::from_segments([(EntityType::Wiki, "xwiki"), (EntityType::Space, space.as_str())])
                .unwrap(),
        );
        scope.excludes(document("xwiki", &space, "Private"));
    }
    scope
}

fn bench_matches(c: &mut Criterion) {
    let scope = build_scope(100);
    let included = document("xwiki", "Space42", "WebHome");
    let excluded = document("xwiki", "Space42", "Private");
    let outside = document("xwiki", "Elsewhere", "WebHome");

    c.bench_function("matches_included", |b| {
        b.iter(|| scope.matches(black_box(&included)))
    });
    c.bench_function("matches_excluded", |b| {
        b.iter(|| scope.matches(black_box(&excluded)))
    });
    c.bench_function("matches_outside", |b| {
        b.iter(|| scope.matches(black_box(&outside)))
    });
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_scope_100", |b| b.iter(|| build_scope(black_box(100))));
}

criterion_group!(benches, bench_matches, bench_build);
criterion_main!(benches);
