//! Benchmarks for reasoning runs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use verdict::concept::{ConceptId, Observation, ObservationType, PriorKnowledge};
use verdict::graph::Relation;
use verdict::logic::{Belief, Truth};
use verdict::mode::{Mode, Variant};
use verdict::reasoner::Reasoner;

/// A tree of `depth` levels where every inner item has `fanout` parts and
/// every other leaf carries a computation hit.
fn tree(depth: usize, fanout: usize, mode: Mode) -> Reasoner {
    let mut r = Reasoner::with_mode(mode);
    let mut frontier: Vec<ConceptId> = vec![r.insert_concept(PriorKnowledge::new("root")).unwrap()];
    let mut count = 0usize;
    for _ in 0..depth {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for parent in &frontier {
            for _ in 0..fanout {
                count += 1;
                let child = r.insert_concept(PriorKnowledge::new(format!("n{count}"))).unwrap();
                r.insert_relation(Relation::part(child, *parent)).unwrap();
                next.push(child);
            }
        }
        frontier = next;
    }
    for (i, leaf) in frontier.iter().enumerate().filter(|(i, _)| i % 2 == 0) {
        let o = r
            .insert_concept(Observation::new(format!("hit{i}"), ObservationType::Computation, Truth::True))
            .unwrap();
        r.insert_relation(Relation::observation(o, *leaf)).unwrap();
    }
    r
}

fn bench_first_run(c: &mut Criterion) {
    let base = tree(6, 4, Mode::new());
    c.bench_function("reason_tree_4x6", |bench| {
        bench.iter(|| {
            let mut r = base.copy();
            r.clear_results();
            black_box(r.reasoning())
        })
    });
}

fn bench_first_run_all_variants(c: &mut Criterion) {
    let base = tree(6, 4, Mode::with_variants(Variant::ALL));
    c.bench_function("reason_tree_4x6_all_variants", |bench| {
        bench.iter(|| {
            let mut r = base.copy();
            r.clear_results();
            black_box(r.reasoning())
        })
    });
}

fn bench_rerun_after_evidence(c: &mut Criterion) {
    let mut base = tree(6, 4, Mode::new());
    base.reasoning();
    let leaf = base.leaves()[1];

    c.bench_function("rerun_after_one_observation", |bench| {
        bench.iter(|| {
            let mut r = base.clone();
            let o = r
                .insert_concept(Observation::new("late", ObservationType::Curation, Truth::True))
                .unwrap();
            r.insert_relation(Relation::observation(o, leaf)).unwrap();
            r.reasoning();
            black_box(r.prior_knowledge_by_id(leaf).map(|pk| pk.prediction == Belief::TRUE))
        })
    });
}

criterion_group!(
    benches,
    bench_first_run,
    bench_first_run_all_variants,
    bench_rerun_after_evidence
);
criterion_main!(benches);
