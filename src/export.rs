//! Export types for serializing reasoner state.
//!
//! These types provide human-readable, name-resolved representations of
//! prior-knowledge items, relations and conclusion counts suitable for JSON
//! export.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::concept::ConceptId;
use crate::graph::Relation;
use crate::logic::Conclusion;
use crate::reasoner::{Reasoner, ReasoningReport};

/// Exported prior-knowledge item with its derived state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorKnowledgeExport {
    /// Numeric concept ID.
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Prediction, upper case when direct (e.g. `T`, `n`).
    pub prediction: String,
    /// Expectation, same notation as `prediction`.
    pub expectation: String,
    pub conclusion: Conclusion,
    /// Human-readable conclusion label.
    pub label: String,
    pub specific: bool,
    pub dispensable: bool,
    /// Names of the observations attached to this item.
    pub observations: Vec<String>,
}

/// Exported relation with resolved names for both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationExport {
    pub source_id: u64,
    pub source: String,
    pub target_id: u64,
    pub target: String,
    /// Relation type (PART, SUBTYPE, OBSERVATION).
    pub kind: String,
}

/// Full state of a reasoner after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerExport {
    /// Enabled mode, e.g. `normal+specific`.
    pub mode: String,
    pub processed: bool,
    pub prior_knowledges: Vec<PriorKnowledgeExport>,
    pub relations: Vec<RelationExport>,
    /// Number of items per conclusion; conclusions nobody reached are omitted.
    pub summary: BTreeMap<Conclusion, usize>,
    /// Counters of the run that produced this state, if it happened in-process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReasoningReport>,
}

impl RelationExport {
    pub fn resolve(reasoner: &Reasoner, relation: &Relation) -> Self {
        let name = |id: ConceptId| {
            reasoner
                .graph()
                .concept(id)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|_| id.to_string())
        };
        Self {
            source_id: relation.source.get(),
            source: name(relation.source),
            target_id: relation.target.get(),
            target: name(relation.target),
            kind: relation.kind.to_string(),
        }
    }
}

impl std::fmt::Display for RelationExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target)
    }
}

/// Collect the per-item conclusions of `reasoner`, in id order.
pub fn prior_knowledges(reasoner: &Reasoner) -> Vec<PriorKnowledgeExport> {
    let graph = reasoner.graph();
    graph
        .prior_knowledge_ids()
        .into_iter()
        .filter_map(|id| {
            let pk = graph.prior_knowledge(id)?;
            let observations = graph
                .observations_of(id)
                .into_iter()
                .filter_map(|o| graph.observation(o).map(|obs| obs.name.clone()))
                .collect();
            Some(PriorKnowledgeExport {
                id: id.get(),
                name: pk.name.clone(),
                description: pk.description.clone(),
                prediction: pk.prediction.to_string(),
                expectation: pk.expectation.to_string(),
                conclusion: pk.conclusion,
                label: pk.conclusion.label().to_string(),
                specific: pk.is_specific,
                dispensable: pk.is_dispensable,
                observations,
            })
        })
        .collect()
}

/// Count items per conclusion.
pub fn summary(items: &[PriorKnowledgeExport]) -> BTreeMap<Conclusion, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.conclusion).or_insert(0) += 1;
    }
    counts
}

/// Export everything, attaching `report` when the caller has one.
pub fn export(reasoner: &Reasoner, report: Option<ReasoningReport>) -> ReasonerExport {
    let prior_knowledges = prior_knowledges(reasoner);
    let relations = reasoner
        .relations()
        .iter()
        .map(|r| RelationExport::resolve(reasoner, r))
        .collect();
    ReasonerExport {
        mode: reasoner.mode().to_string(),
        processed: reasoner.has_been_processed(),
        summary: summary(&prior_knowledges),
        prior_knowledges,
        relations,
        report,
    }
}
