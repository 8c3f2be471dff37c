//! Bottom-up prediction pass.

use std::collections::BTreeSet;

use crate::concept::{ConceptId, EvidenceRole};
use crate::graph::RelationType;
use crate::logic::Belief;
use crate::mode::Variant;

use super::worklist::Worklist;
use super::{PassStats, Reasoner};

impl Reasoner {
    /// Propagate predictions from the leaves toward the tops.
    ///
    /// `pending` holds items invalidated since the last run; they join the
    /// first frame. An item's parents are scheduled when its prediction
    /// changes and on its first visit of the pass, so an inferred value equal
    /// to the stored one still reaches the ancestors. Returns the pass
    /// counters and every item whose prediction changed.
    pub(super) fn propagate_predictions(
        &mut self,
        pending: BTreeSet<ConceptId>,
    ) -> (PassStats, BTreeSet<ConceptId>) {
        let mut stats = PassStats::default();
        let mut changed = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut worklist = Worklist::default();

        let leaves = self.leaves();
        let seeds: Vec<ConceptId> = pending
            .into_iter()
            .filter(|id| self.graph.prior_knowledge(*id).is_some())
            .filter(|id| self.graph.has_incoming_hierarchy(*id))
            .collect();
        stats.seeds += seeds.len();
        worklist.seed(seeds);

        for leaf in leaves {
            let value = Belief::direct(self.direct_evidence(leaf, EvidenceRole::Prediction));
            if self.store_prediction(leaf, value) {
                stats.updates += 1;
                changed.insert(leaf);
                let parents = self.graph.parents(leaf, None);
                stats.seeds += parents.len();
                worklist.seed(parents);
            }
        }

        while let Some(id) = worklist.pop() {
            let value = self.infer_prediction(id);
            let first = visited.insert(id);
            let moved = self.store_prediction(id, value);
            if moved {
                stats.updates += 1;
                changed.insert(id);
            }
            if moved || first {
                worklist.defer(self.graph.parents(id, None));
            }
        }

        stats.visits = worklist.visits();
        stats.levels = worklist.levels();
        tracing::debug!(
            seeds = stats.seeds,
            visits = stats.visits,
            updates = stats.updates,
            levels = stats.levels,
            "prediction pass"
        );
        (stats, changed)
    }

    /// Prediction of an inner item from its children and its own evidence.
    pub(super) fn infer_prediction(&self, id: ConceptId) -> Belief {
        let dispensable = self.mode.contains(Variant::Dispensable);
        let kept = |child: &ConceptId| !(dispensable && self.is_dispensable(*child));

        let parts: Vec<ConceptId> = self
            .graph
            .children(id, Some(RelationType::Part))
            .into_iter()
            .filter(kept)
            .collect();
        let subtypes: Vec<Belief> = self
            .graph
            .children(id, Some(RelationType::Subtype))
            .into_iter()
            .filter(kept)
            .filter_map(|c| self.prediction_of(c))
            .collect();

        let witnessed = self.mode.contains(Variant::Specific)
            && parts.iter().any(|p| {
                self.graph
                    .prior_knowledge(*p)
                    .is_some_and(|pk| pk.is_specific && pk.prediction == Belief::TRUE)
            });
        let part_values = parts
            .iter()
            .filter_map(|p| self.prediction_of(*p))
            .filter(|b| !(witnessed && *b == Belief::NO_EVIDENCE));

        let candidates = subtypes.into_iter().chain(
            // An item without parts contributes nothing from that side.
            (!parts.is_empty()).then(|| Belief::merge(part_values)),
        );
        Belief::choice(candidates).overlay(self.direct_evidence(id, EvidenceRole::Prediction))
    }

    /// Store a prediction, reporting whether it changed.
    fn store_prediction(&mut self, id: ConceptId, value: Belief) -> bool {
        match self.graph.prior_knowledge_mut(id) {
            Some(pk) if pk.prediction != value => {
                tracing::trace!(concept = %pk.name, from = %pk.prediction, to = %value, "prediction");
                pk.prediction = value;
                true
            }
            _ => false,
        }
    }
}
