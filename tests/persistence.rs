//! Persistence and recovery tests for the verdict reasoner.
//!
//! These tests verify that concepts, relations, per-item beliefs and the id
//! allocator survive a save + load cycle, and that a loaded reasoner keeps
//! tracking mutations like the one that was saved.

use verdict::concept::{ConceptId, Observation, ObservationType, PriorKnowledge};
use verdict::graph::Relation;
use verdict::logic::{Belief, Conclusion, Truth};
use verdict::mode::{Mode, Variant, Verbosity};
use verdict::reasoner::Reasoner;
use verdict::store;

fn annotated() -> Reasoner {
    let mut r = Reasoner::with_mode(Mode::with_variants([Variant::Dispensable]));
    let top = r.insert_concept(PriorKnowledge::new("top")).unwrap();
    let a = r.insert_concept(PriorKnowledge::new("a")).unwrap();
    let b = r
        .insert_concept(PriorKnowledge::new("b").with_description("optional step").dispensable())
        .unwrap();
    let e = r
        .insert_concept(Observation::new("e", ObservationType::Experimentation, Truth::True))
        .unwrap();
    let c = r
        .insert_concept(Observation::new("c", ObservationType::Computation, Truth::True))
        .unwrap();
    r.insert_relations([
        Relation::part(a, top),
        Relation::part(b, top),
        Relation::observation(e, top),
        Relation::observation(c, a),
    ])
    .unwrap();
    r.set_verbosity(Verbosity::Medium);
    r
}

#[test]
fn reasoned_state_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.bin");

    // First session: reason and save.
    let saved = {
        let mut r = annotated();
        r.reasoning();
        store::save(&r, &path).unwrap();
        r
    };

    // Second session: load and compare.
    let loaded = store::load(&path).unwrap();
    assert!(loaded.has_been_processed());
    assert_eq!(loaded.mode(), saved.mode());
    assert_eq!(loaded.verbosity(), Verbosity::Medium);
    assert_eq!(loaded.relations(), saved.relations());
    for (id, concept) in saved.concepts() {
        assert_eq!(loaded.graph().concept(id).unwrap(), concept);
    }
    assert_eq!(
        loaded.prior_knowledge("a").unwrap().conclusion,
        Conclusion::ConfirmedPresence
    );
    assert_eq!(loaded.prior_knowledge("b").unwrap().description, "optional step");
}

#[test]
fn loaded_reasoner_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.bin");
    let mut r = annotated();
    r.reasoning();
    store::save(&r, &path).unwrap();

    let mut loaded = store::load(&path).unwrap();
    let report = loaded.reasoning();
    assert_eq!(report.prediction.updates, 0);
    assert_eq!(report.expectation.updates, 0);
}

#[test]
fn loaded_reasoner_tracks_new_evidence() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.bin");
    let mut r = annotated();
    r.reasoning();
    store::save(&r, &path).unwrap();

    let mut loaded = store::load(&path).unwrap();
    let a = loaded.id_of("a").unwrap();
    let miss = loaded
        .insert_concept(Observation::new("miss", ObservationType::Computation, Truth::False))
        .unwrap();
    loaded.insert_relation(Relation::observation(miss, a)).unwrap();
    assert_eq!(
        loaded.prior_knowledge("a").unwrap().conclusion,
        Conclusion::Unexplained
    );

    loaded.reasoning();
    let a = loaded.prior_knowledge("a").unwrap();
    assert_eq!(a.prediction, Belief::Direct(Truth::Both));
    assert_eq!(a.conclusion, Conclusion::ContradictoryAbsence);
}

#[test]
fn ids_are_not_reused_after_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.bin");
    let mut r = annotated();
    let doomed = r.insert_concept(PriorKnowledge::new("doomed")).unwrap();
    r.delete_concept(doomed).unwrap();
    store::save(&r, &path).unwrap();

    let mut loaded = store::load(&path).unwrap();
    assert!(!loaded.has_been_processed());
    let fresh: ConceptId = loaded.insert_concept(PriorKnowledge::new("fresh")).unwrap();
    assert!(fresh > doomed);
}

#[test]
fn truncated_state_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("state.bin");
    let r = annotated();
    store::save(&r, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
    assert!(store::load(&path).is_err());
}
