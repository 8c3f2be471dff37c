//! The reasoner: owns a concept graph and reconciles predictions with
//! expectations over its PART/SUBTYPE hierarchy.
//!
//! A run ([`Reasoner::reasoning`]) proceeds in three steps:
//!
//! 1. **Specificity** — every prior-knowledge item with exactly one outgoing
//!    hierarchical relation is marked specific.
//! 2. **Prediction pass** ([`prediction`]) — bottom-up from the leaves.
//! 3. **Expectation pass** ([`expectation`]) — top-down from the tops,
//!    concluding each item as its expectation settles.
//!
//! Mutations after a run invalidate the affected items and schedule them for
//! the next run; nothing is recomputed eagerly.

mod expectation;
mod prediction;
mod worklist;

use std::collections::BTreeSet;

use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::concept::{
    Concept, ConceptId, EvidenceRole, Observation, ObservationType, PriorKnowledge,
};
use crate::config::ReasonerConfig;
use crate::error::{ReasonError, VerdictResult};
use crate::graph::index::ConceptGraph;
use crate::graph::traverse::{self, SubGraph};
use crate::graph::{Relation, RelationType};
use crate::logic::{Belief, Conclusion, Truth};
use crate::mode::{Mode, Variant, Verbosity};

/// Counters for one propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStats {
    /// Nodes scheduled before the worklist loop started.
    pub seeds: usize,
    /// Nodes taken off the worklist.
    pub visits: usize,
    /// Nodes whose stored value changed, seeding included.
    pub updates: usize,
    /// Worklist frames drained.
    pub levels: usize,
}

/// Summary of a reasoning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningReport {
    pub prediction: PassStats,
    pub expectation: PassStats,
    /// Conclusions re-evaluated after both passes for items whose prediction
    /// moved while their expectation did not.
    pub refreshed: usize,
}

/// Items scheduled for re-evaluation by mutations since the last run.
#[derive(Debug, Clone, Default)]
struct Pending {
    predictions: BTreeSet<ConceptId>,
    expectations: BTreeSet<ConceptId>,
    conclusions: BTreeSet<ConceptId>,
}

/// Prediction/expectation reasoner over a [`ConceptGraph`].
#[derive(Debug, Clone, Default)]
pub struct Reasoner {
    graph: ConceptGraph,
    mode: Mode,
    verbosity: Verbosity,
    pending: Pending,
    processed: bool,
}

impl Reasoner {
    /// An empty reasoner in normal mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_config(config: &ReasonerConfig) -> Self {
        Self {
            mode: config.mode(),
            verbosity: config.verbosity,
            ..Self::default()
        }
    }

    /// Reassemble a reasoner, e.g. from a snapshot.
    pub fn from_parts(graph: ConceptGraph, mode: Mode, verbosity: Verbosity, processed: bool) -> Self {
        Self {
            graph,
            mode,
            verbosity,
            pending: Pending::default(),
            processed,
        }
    }

    /// A fresh reasoner over a copy of this one's graph and mode.
    ///
    /// The copy has not been processed: mutations on it are not tracked until
    /// its first run.
    pub fn copy(&self) -> Reasoner {
        Self::from_parts(self.graph.clone(), self.mode.clone(), self.verbosity, false)
    }

    pub fn graph(&self) -> &ConceptGraph {
        &self.graph
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Whether [`Reasoner::reasoning`] has run at least once.
    pub fn has_been_processed(&self) -> bool {
        self.processed
    }

    /// Enable variants. After a run, a changed mode schedules every item.
    pub fn add_variants<I>(&mut self, variants: I)
    where
        I: IntoIterator<Item = Variant>,
    {
        let before = self.mode.clone();
        self.mode.add_variants(variants);
        self.mode_changed(&before);
    }

    pub fn remove_variants<I>(&mut self, variants: I)
    where
        I: IntoIterator<Item = Variant>,
    {
        let before = self.mode.clone();
        self.mode.remove_variants(variants);
        self.mode_changed(&before);
    }

    fn mode_changed(&mut self, before: &Mode) {
        if !self.processed || self.mode == *before {
            return;
        }
        let all = self.graph.prior_knowledge_ids();
        self.pending.predictions.extend(all.iter().copied());
        self.pending.expectations.extend(all.iter().copied());
        self.pending.conclusions.extend(all);
        tracing::debug!(from = %before, to = %self.mode, "mode changed");
    }

    // -----------------------------------------------------------------------
    // Insertion and deletion
    // -----------------------------------------------------------------------

    pub fn insert_concept(&mut self, concept: impl Into<Concept>) -> VerdictResult<ConceptId> {
        Ok(self.graph.add_concept(concept.into())?)
    }

    /// Insert several concepts; stops at the first failure.
    pub fn insert_concepts<I>(&mut self, concepts: I) -> VerdictResult<Vec<ConceptId>>
    where
        I: IntoIterator<Item = Concept>,
    {
        concepts
            .into_iter()
            .map(|c| self.insert_concept(c))
            .collect()
    }

    pub fn insert_relation(&mut self, relation: Relation) -> VerdictResult<()> {
        self.graph.add_relation(relation)?;
        if self.processed {
            self.relation_changed(&relation);
        }
        Ok(())
    }

    /// Insert several relations, all or nothing.
    ///
    /// The hierarchy is checked for cycles once for the whole batch.
    pub fn insert_relations<I>(&mut self, relations: I) -> VerdictResult<()>
    where
        I: IntoIterator<Item = Relation>,
    {
        let added = self.graph.add_relations(relations)?;
        if self.processed {
            for relation in &added {
                self.relation_changed(relation);
            }
        }
        Ok(())
    }

    /// Remove a concept together with its relations, returning the concept.
    pub fn delete_concept(&mut self, id: ConceptId) -> VerdictResult<Concept> {
        let (concept, removed) = self.graph.delete_concept(id)?;
        if self.processed {
            for relation in &removed {
                match (&concept, relation.kind) {
                    (Concept::Observation(obs), RelationType::Observation) => {
                        self.invalidate(relation.target, obs.kind);
                    }
                    // The evidence of a deleted item goes with it.
                    (_, RelationType::Observation) => {}
                    _ => self.schedule_around(relation),
                }
            }
        }
        Ok(concept)
    }

    pub fn delete_concepts<I>(&mut self, ids: I) -> VerdictResult<Vec<Concept>>
    where
        I: IntoIterator<Item = ConceptId>,
    {
        ids.into_iter().map(|id| self.delete_concept(id)).collect()
    }

    pub fn delete_relation(&mut self, relation: &Relation) -> VerdictResult<()> {
        self.graph.delete_relation(relation)?;
        if self.processed {
            self.relation_changed(relation);
        }
        Ok(())
    }

    pub fn delete_relations<'a, I>(&mut self, relations: I) -> VerdictResult<()>
    where
        I: IntoIterator<Item = &'a Relation>,
    {
        relations
            .into_iter()
            .try_for_each(|r| self.delete_relation(r))
    }

    /// Flag or unflag an item as dispensable.
    pub fn set_dispensable(&mut self, id: ConceptId, dispensable: bool) -> VerdictResult<()> {
        let pk = self.prior_knowledge_mut_checked(id)?;
        if pk.is_dispensable == dispensable {
            return Ok(());
        }
        pk.is_dispensable = dispensable;
        if self.processed {
            self.pending.expectations.insert(id);
            let parents = self.graph.parents(id, None);
            self.pending.predictions.extend(parents);
        }
        Ok(())
    }

    fn relation_changed(&mut self, relation: &Relation) {
        match relation.kind {
            RelationType::Observation => {
                if let Some(kind) = self.graph.observation(relation.source).map(|o| o.kind) {
                    self.invalidate(relation.target, kind);
                }
            }
            RelationType::Part | RelationType::Subtype => self.schedule_around(relation),
        }
    }

    /// Reset an item whose evidence changed and schedule it for the next run.
    fn invalidate(&mut self, target: ConceptId, kind: ObservationType) {
        let Some(pk) = self.graph.prior_knowledge_mut(target) else {
            return;
        };
        pk.conclusion = Conclusion::Unexplained;
        if kind.is_prediction() {
            pk.prediction = Belief::UNSET;
            self.pending.predictions.insert(target);
        }
        if kind.is_expectation() {
            pk.expectation = Belief::UNSET;
            self.pending.expectations.insert(target);
        }
        self.pending.conclusions.insert(target);
        tracing::debug!(concept = %pk.name, evidence = %kind, "invalidated");
    }

    /// Schedule everything whose inputs a hierarchical edit touches.
    fn schedule_around(&mut self, relation: &Relation) {
        self.pending.predictions.insert(relation.target);
        let co_parents = self.graph.parents(relation.source, None);
        self.pending.predictions.extend(co_parents);
        self.pending.expectations.insert(relation.source);
        let siblings = self.graph.children(relation.target, None);
        self.pending.expectations.extend(siblings);
    }

    // -----------------------------------------------------------------------
    // Reasoning
    // -----------------------------------------------------------------------

    /// Run specificity marking, then prediction and expectation propagation.
    pub fn reasoning(&mut self) -> ReasoningReport {
        tracing::info!(
            mode = %self.mode,
            concepts = self.graph.concept_count(),
            relations = self.graph.relation_count(),
            "reasoning"
        );

        self.mark_specific();
        let rerun = std::mem::replace(&mut self.processed, true);
        let mut pending = std::mem::take(&mut self.pending);

        let (prediction, predicted) = self.propagate_predictions(pending.predictions);
        if rerun {
            // A moved prediction can change which subtype realizes its parent.
            for id in &predicted {
                for parent in self.graph.parents(*id, None) {
                    let subtypes = self.graph.children(parent, Some(RelationType::Subtype));
                    pending.expectations.extend(subtypes);
                }
            }
        }
        let (expectation, concluded) = self.propagate_expectations(pending.expectations);

        let stale: BTreeSet<ConceptId> = predicted
            .union(&pending.conclusions)
            .filter(|id| !concluded.contains(id))
            .copied()
            .collect();
        let refreshed = stale.into_iter().filter(|id| self.conclude(*id)).count();

        let report = ReasoningReport {
            prediction,
            expectation,
            refreshed,
        };
        tracing::info!(
            prediction_visits = report.prediction.visits,
            prediction_updates = report.prediction.updates,
            expectation_visits = report.expectation.visits,
            expectation_updates = report.expectation.updates,
            refreshed,
            "reasoning complete"
        );
        report
    }

    fn mark_specific(&mut self) {
        for id in self.graph.prior_knowledge_ids() {
            let specific = self.graph.hierarchy_degree(id, Direction::Outgoing) == 1;
            if let Some(pk) = self.graph.prior_knowledge_mut(id) {
                pk.is_specific = specific;
            }
        }
    }

    /// Re-evaluate an item's conclusion from its stored beliefs.
    ///
    /// Returns `false` if `id` is not a prior-knowledge item.
    fn conclude(&mut self, id: ConceptId) -> bool {
        let Some(pk) = self.graph.prior_knowledge_mut(id) else {
            return false;
        };
        let conclusion = Conclusion::of(pk.expectation, pk.prediction);
        if pk.conclusion != conclusion {
            tracing::debug!(
                concept = %pk.name,
                expectation = %pk.expectation,
                prediction = %pk.prediction,
                %conclusion,
                "concluded"
            );
            pk.conclusion = conclusion;
        }
        true
    }

    /// Union of the truth values of observations attached to `id` that play `role`.
    fn direct_evidence(&self, id: ConceptId, role: EvidenceRole) -> Truth {
        Truth::union(
            self.graph
                .observations_of(id)
                .into_iter()
                .filter_map(|o| self.graph.observation(o))
                .filter(|o| role.admits(o.kind))
                .map(|o| o.truth),
        )
    }

    fn is_dispensable(&self, id: ConceptId) -> bool {
        self.graph
            .prior_knowledge(id)
            .is_some_and(|pk| pk.is_dispensable)
    }

    fn prediction_of(&self, id: ConceptId) -> Option<Belief> {
        self.graph.prior_knowledge(id).map(|pk| pk.prediction)
    }

    fn expectation_of(&self, id: ConceptId) -> Option<Belief> {
        self.graph.prior_knowledge(id).map(|pk| pk.expectation)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Resolve a concept name.
    pub fn id_of(&self, name: &str) -> VerdictResult<ConceptId> {
        Ok(self.graph.lookup(name)?)
    }

    pub fn concept(&self, name: &str) -> VerdictResult<&Concept> {
        Ok(self.graph.concept_by_name(name)?)
    }

    /// All concepts in id order.
    pub fn concepts(&self) -> Vec<(ConceptId, &Concept)> {
        self.graph.concepts().collect()
    }

    /// The prior-knowledge item called `name`.
    pub fn prior_knowledge(&self, name: &str) -> VerdictResult<&PriorKnowledge> {
        self.concept(name)?
            .as_prior_knowledge()
            .ok_or_else(|| {
                ReasonError::NotPriorKnowledge {
                    name: name.to_string(),
                }
                .into()
            })
    }

    pub fn prior_knowledge_by_id(&self, id: ConceptId) -> Option<&PriorKnowledge> {
        self.graph.prior_knowledge(id)
    }

    fn prior_knowledge_mut_checked(&mut self, id: ConceptId) -> VerdictResult<&mut PriorKnowledge> {
        let name = self.graph.concept(id)?.name().to_string();
        self.graph
            .prior_knowledge_mut(id)
            .ok_or_else(|| ReasonError::NotPriorKnowledge { name }.into())
    }

    /// Ids of all prior-knowledge items.
    pub fn prior_knowledges(&self) -> Vec<ConceptId> {
        self.graph.prior_knowledge_ids()
    }

    /// The observation called `name`.
    pub fn observation(&self, name: &str) -> VerdictResult<&Observation> {
        self.concept(name)?.as_observation().ok_or_else(|| {
            ReasonError::NotObservation {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Ids of all observations.
    pub fn observations(&self) -> Vec<ConceptId> {
        self.graph.observation_ids()
    }

    /// Items with no hierarchical children.
    pub fn leaves(&self) -> Vec<ConceptId> {
        self.graph
            .prior_knowledge_ids()
            .into_iter()
            .filter(|id| !self.graph.has_incoming_hierarchy(*id))
            .collect()
    }

    /// Items with no hierarchical parents.
    pub fn tops(&self) -> Vec<ConceptId> {
        self.graph
            .prior_knowledge_ids()
            .into_iter()
            .filter(|id| !self.graph.has_outgoing_hierarchy(*id))
            .collect()
    }

    /// Items `id` is a part or subtype of.
    pub fn parents(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.parents(id, None)
    }

    /// Parts and subtypes of `id`.
    pub fn children(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.children(id, None)
    }

    /// Items that are a part of `id`.
    pub fn parts_of(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.children(id, Some(RelationType::Part))
    }

    /// Items `id` is a part of.
    pub fn wholes_of(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.parents(id, Some(RelationType::Part))
    }

    /// Items that are a subtype of `id`.
    pub fn subtypes_of(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.children(id, Some(RelationType::Subtype))
    }

    /// Items `id` is a subtype of.
    pub fn supertypes_of(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.parents(id, Some(RelationType::Subtype))
    }

    /// Observations attached to `id`.
    pub fn observations_related_to(&self, id: ConceptId) -> Vec<ConceptId> {
        self.graph.observations_of(id)
    }

    /// Observations attached to `id` that count as evidence for `role`.
    pub fn observations_for_role(&self, id: ConceptId, role: EvidenceRole) -> Vec<ConceptId> {
        self.graph
            .observations_of(id)
            .into_iter()
            .filter(|o| self.graph.observation(*o).is_some_and(|obs| role.admits(obs.kind)))
            .collect()
    }

    /// Every relation in the graph.
    pub fn relations(&self) -> Vec<Relation> {
        self.graph.relations()
    }

    /// Relations from `source` to `target`, of any type.
    pub fn relations_between(&self, source: ConceptId, target: ConceptId) -> Vec<Relation> {
        self.graph
            .outgoing(source, None)
            .into_iter()
            .filter(|r| r.target == target)
            .collect()
    }

    pub fn relations_with_source(&self, source: ConceptId) -> Vec<Relation> {
        self.graph.outgoing(source, None)
    }

    pub fn relations_with_target(&self, target: ConceptId) -> Vec<Relation> {
        self.graph.incoming(target, None)
    }

    /// The relation `source -[kind]-> target`, if present.
    pub fn relation(&self, source: ConceptId, target: ConceptId, kind: RelationType) -> Option<Relation> {
        let relation = Relation::new(source, target, kind);
        self.graph.contains_relation(&relation).then_some(relation)
    }

    /// Everything that feeds evidence into `id`.
    pub fn sub_graph(&self, id: ConceptId) -> VerdictResult<SubGraph> {
        Ok(traverse::sub_graph(&self.graph, id)?)
    }

    /// Reset every derived value, as if the graph had never been reasoned over.
    pub fn clear_results(&mut self) {
        for id in self.graph.prior_knowledge_ids() {
            if let Some(pk) = self.graph.prior_knowledge_mut(id) {
                pk.reset();
            }
        }
        self.pending = Pending::default();
        self.processed = false;
    }
}
