//! JSON graph documents.
//!
//! ```json
//! {
//!   "prior_knowledges": [{ "name": "glycolysis" }, { "name": "step1", "dispensable": true }],
//!   "observations": [{ "name": "hit", "type": "computation", "truth": "true", "target": "step1" }],
//!   "relations": [{ "source": "step1", "target": "glycolysis", "type": "part" }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::concept::{ConceptId, Observation, ObservationType, PriorKnowledge};
use crate::error::{ConfigError, VerdictResult};
use crate::graph::{Relation, RelationType};
use crate::logic::Truth;
use crate::reasoner::Reasoner;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorKnowledgeEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dispensable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObservationType,
    pub truth: Truth,
    /// Prior-knowledge item the observation is about, attached on load.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
}

/// A knowledge graph described by concept names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphDocument {
    pub prior_knowledges: Vec<PriorKnowledgeEntry>,
    pub observations: Vec<ObservationEntry>,
    pub relations: Vec<RelationEntry>,
}

/// What a document added to a reasoner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub prior_knowledges: usize,
    pub observations: usize,
    pub relations: usize,
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Document {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Document { message } => ConfigError::Document {
                message: format!("{}: {message}", path.display()),
            },
            other => other,
        })
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Document {
            message: e.to_string(),
        })
    }

    /// Insert every concept and relation into `reasoner`.
    ///
    /// Concepts are inserted first so relations may reference them in any
    /// order. Relations go in as one batch: a bad relation leaves none of
    /// them, but the concepts inserted before it stay.
    pub fn load_into(&self, reasoner: &mut Reasoner) -> VerdictResult<IngestStats> {
        let mut stats = IngestStats::default();

        for entry in &self.prior_knowledges {
            let mut pk = PriorKnowledge::new(&entry.name).with_description(&entry.description);
            pk.is_dispensable = entry.dispensable;
            reasoner.insert_concept(pk)?;
            stats.prior_knowledges += 1;
        }

        for entry in &self.observations {
            let obs = Observation::new(&entry.name, entry.kind, entry.truth)
                .with_description(&entry.description);
            reasoner.insert_concept(obs)?;
            stats.observations += 1;
        }

        let mut relations = Vec::with_capacity(self.observations.len() + self.relations.len());
        for entry in &self.observations {
            if let Some(target) = &entry.target {
                relations.push(Relation::observation(
                    reasoner.id_of(&entry.name)?,
                    reasoner.id_of(target)?,
                ));
            }
        }
        for entry in &self.relations {
            relations.push(Relation::new(
                reasoner.id_of(&entry.source)?,
                reasoner.id_of(&entry.target)?,
                entry.kind,
            ));
        }
        stats.relations = relations.len();
        reasoner.insert_relations(relations)?;

        tracing::info!(
            prior_knowledges = stats.prior_knowledges,
            observations = stats.observations,
            relations = stats.relations,
            "loaded graph document"
        );
        Ok(stats)
    }

    /// Describe the graph of `reasoner` as a document.
    pub fn from_reasoner(reasoner: &Reasoner) -> Self {
        let graph = reasoner.graph();
        let name = |id: ConceptId| graph.concept(id).map(|c| c.name().to_string()).ok();
        let mut doc = GraphDocument::default();

        for (_, concept) in graph.concepts() {
            if let Some(pk) = concept.as_prior_knowledge() {
                doc.prior_knowledges.push(PriorKnowledgeEntry {
                    name: pk.name.clone(),
                    description: pk.description.clone(),
                    dispensable: pk.is_dispensable,
                });
            }
        }
        for id in graph.observation_ids() {
            if let Some(obs) = graph.observation(id) {
                let target = graph
                    .outgoing(id, Some(RelationType::Observation))
                    .first()
                    .and_then(|r| name(r.target));
                doc.observations.push(ObservationEntry {
                    name: obs.name.clone(),
                    kind: obs.kind,
                    truth: obs.truth,
                    target,
                    description: obs.description.clone(),
                });
            }
        }
        for relation in graph.relations() {
            if !relation.kind.is_hierarchical() {
                continue;
            }
            if let (Some(source), Some(target)) = (name(relation.source), name(relation.target)) {
                doc.relations.push(RelationEntry {
                    source,
                    target,
                    kind: relation.kind,
                });
            }
        }
        doc
    }
}
