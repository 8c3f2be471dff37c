//! Top-down expectation pass.
//!
//! Expectations flow from the tops to the leaves. PART parents pass their
//! expectation to every part; SUBTYPE parents pass it only to the subtype
//! that currently realizes them, i.e. whose prediction matches the best
//! prediction among the parent's children.

use std::collections::BTreeSet;

use crate::concept::{ConceptId, EvidenceRole};
use crate::graph::RelationType;
use crate::logic::Belief;
use crate::mode::Variant;

use super::worklist::Worklist;
use super::{PassStats, Reasoner};

impl Reasoner {
    /// Propagate expectations from the tops toward the leaves, concluding
    /// every item whose expectation changes.
    ///
    /// `pending` joins the first frame. Returns the pass counters and the
    /// items concluded during the pass.
    pub(super) fn propagate_expectations(
        &mut self,
        pending: BTreeSet<ConceptId>,
    ) -> (PassStats, BTreeSet<ConceptId>) {
        let mut stats = PassStats::default();
        let mut concluded = BTreeSet::new();
        let mut worklist = Worklist::default();

        let tops = self.tops();
        let seeds: Vec<ConceptId> = pending
            .into_iter()
            .filter(|id| self.graph.prior_knowledge(*id).is_some())
            .filter(|id| self.graph.has_outgoing_hierarchy(*id))
            .collect();
        stats.seeds += seeds.len();
        worklist.seed(seeds);

        for top in tops {
            let value = if self.forced_unexpected(top) {
                Belief::NO_EVIDENCE
            } else {
                Belief::direct(self.direct_evidence(top, EvidenceRole::Expectation))
            };
            if self.store_expectation(top, value) {
                stats.updates += 1;
                self.conclude(top);
                concluded.insert(top);
                let children = self.graph.children(top, None);
                stats.seeds += children.len();
                worklist.seed(children);
            }
        }

        while let Some(id) = worklist.pop() {
            let value = self.infer_expectation(id);
            if self.store_expectation(id, value) {
                stats.updates += 1;
                self.conclude(id);
                concluded.insert(id);
                worklist.defer(self.graph.children(id, None));
            }
        }

        stats.visits = worklist.visits();
        stats.levels = worklist.levels();
        tracing::debug!(
            seeds = stats.seeds,
            visits = stats.visits,
            updates = stats.updates,
            levels = stats.levels,
            "expectation pass"
        );
        (stats, concluded)
    }

    /// Expectation of an inner item from its parents and its own evidence.
    pub(super) fn infer_expectation(&self, id: ConceptId) -> Belief {
        if self.forced_unexpected(id) {
            return Belief::NO_EVIDENCE;
        }

        let supertypes = self.graph.parents(id, Some(RelationType::Subtype));
        let foreclosed = supertypes
            .iter()
            .any(|p| self.expectation_of(*p) == Some(Belief::FALSE));

        let inferred = if foreclosed {
            Belief::FALSE
        } else {
            let own = self.prediction_of(id);
            let realized = supertypes.into_iter().filter(|p| {
                let best = Belief::choice(
                    self.graph
                        .children(*p, None)
                        .into_iter()
                        .filter_map(|c| self.prediction_of(c)),
                );
                own == Some(best)
            });
            let candidates: Vec<Belief> = self
                .graph
                .parents(id, Some(RelationType::Part))
                .into_iter()
                .chain(realized)
                .filter_map(|p| self.expectation_of(p))
                .collect();
            match Belief::merge(candidates) {
                Belief::UNSET => Belief::NO_EVIDENCE,
                merged => merged,
            }
        };
        inferred.overlay(self.direct_evidence(id, EvidenceRole::Expectation))
    }

    /// Dispensable items are never expected under the dispensable variant.
    fn forced_unexpected(&self, id: ConceptId) -> bool {
        self.mode.contains(Variant::Dispensable) && self.is_dispensable(id)
    }

    /// Store an expectation, reporting whether it changed.
    fn store_expectation(&mut self, id: ConceptId, value: Belief) -> bool {
        match self.graph.prior_knowledge_mut(id) {
            Some(pk) if pk.expectation != value => {
                tracing::trace!(concept = %pk.name, from = %pk.expectation, to = %value, "expectation");
                pk.expectation = value;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::concept::{ConceptId, Observation, ObservationType, PriorKnowledge};
    use crate::graph::Relation;
    use crate::logic::{Belief, Conclusion, Truth};
    use crate::mode::{Mode, Variant};
    use crate::reasoner::Reasoner;

    fn pk(r: &mut Reasoner, name: &str) -> ConceptId {
        r.insert_concept(PriorKnowledge::new(name)).unwrap()
    }

    fn observe(r: &mut Reasoner, target: ConceptId, kind: ObservationType, truth: Truth) {
        let name = format!("obs-{}-{}", target.get(), r.observations().len());
        let o = r.insert_concept(Observation::new(name, kind, truth)).unwrap();
        r.insert_relation(Relation::observation(o, target)).unwrap();
    }

    fn item(r: &Reasoner, id: ConceptId) -> &PriorKnowledge {
        r.prior_knowledge_by_id(id).unwrap()
    }

    #[test]
    fn parts_inherit_the_whole_expectation() {
        let mut r = Reasoner::new();
        let whole = pk(&mut r, "whole");
        let a = pk(&mut r, "a");
        let b = pk(&mut r, "b");
        r.insert_relation(Relation::part(a, whole)).unwrap();
        r.insert_relation(Relation::part(b, whole)).unwrap();
        observe(&mut r, whole, ObservationType::Experimentation, Truth::True);
        observe(&mut r, a, ObservationType::Computation, Truth::True);
        r.reasoning();

        assert_eq!(item(&r, a).expectation, Belief::TRUE);
        assert_eq!(item(&r, b).expectation, Belief::TRUE);
        assert_eq!(item(&r, a).conclusion, Conclusion::ConfirmedPresence);
        assert_eq!(item(&r, b).conclusion, Conclusion::Missing);
    }

    #[test]
    fn unevidenced_tops_expect_nothing() {
        let mut r = Reasoner::new();
        let whole = pk(&mut r, "whole");
        let part = pk(&mut r, "part");
        r.insert_relation(Relation::part(part, whole)).unwrap();
        r.reasoning();
        assert_eq!(item(&r, whole).expectation, Belief::NO_EVIDENCE);
        assert_eq!(item(&r, part).expectation, Belief::NO_EVIDENCE);
        assert_eq!(item(&r, part).conclusion, Conclusion::Unexplained);
    }

    #[test]
    fn only_the_realized_subtype_inherits() {
        let mut r = Reasoner::new();
        let sup = pk(&mut r, "sup");
        let found = pk(&mut r, "found");
        let absent = pk(&mut r, "absent");
        r.insert_relation(Relation::subtype(found, sup)).unwrap();
        r.insert_relation(Relation::subtype(absent, sup)).unwrap();
        observe(&mut r, sup, ObservationType::Experimentation, Truth::True);
        observe(&mut r, found, ObservationType::Computation, Truth::True);
        observe(&mut r, absent, ObservationType::Computation, Truth::False);
        r.reasoning();

        assert_eq!(item(&r, found).expectation, Belief::TRUE);
        assert_eq!(item(&r, absent).expectation, Belief::NO_EVIDENCE);
        assert_eq!(item(&r, found).conclusion, Conclusion::ConfirmedPresence);
        assert_eq!(item(&r, absent).conclusion, Conclusion::UnconfirmedAbsence);
    }

    #[test]
    fn false_supertype_forecloses_subtypes() {
        let mut r = Reasoner::new();
        let sup = pk(&mut r, "sup");
        let sub = pk(&mut r, "sub");
        r.insert_relation(Relation::subtype(sub, sup)).unwrap();
        observe(&mut r, sup, ObservationType::Experimentation, Truth::False);
        observe(&mut r, sub, ObservationType::Computation, Truth::True);
        r.reasoning();
        assert_eq!(item(&r, sub).expectation, Belief::FALSE);
        assert_eq!(item(&r, sub).conclusion, Conclusion::UnexpectedPresence);
    }

    #[test]
    fn dispensable_items_are_never_expected() {
        let mut r = Reasoner::with_mode(Mode::with_variants([Variant::Dispensable]));
        let whole = pk(&mut r, "whole");
        let extra = r.insert_concept(PriorKnowledge::new("extra").dispensable()).unwrap();
        r.insert_relation(Relation::part(extra, whole)).unwrap();
        observe(&mut r, whole, ObservationType::Experimentation, Truth::True);
        observe(&mut r, extra, ObservationType::Experimentation, Truth::True);
        r.reasoning();
        assert_eq!(item(&r, extra).expectation, Belief::NO_EVIDENCE);
    }

    #[test]
    fn expectations_reach_the_bottom_of_a_chain() {
        let mut r = Reasoner::new();
        let ids: Vec<ConceptId> = (0..4).map(|i| pk(&mut r, &format!("n{i}"))).collect();
        for pair in ids.windows(2) {
            r.insert_relation(Relation::part(pair[0], pair[1])).unwrap();
        }
        observe(&mut r, ids[3], ObservationType::Experimentation, Truth::False);
        let report = r.reasoning();
        assert!(ids.iter().all(|id| item(&r, *id).expectation == Belief::FALSE));
        assert_eq!(report.expectation.levels, 3);
        assert_eq!(report.expectation.visits, 3);
    }
}
