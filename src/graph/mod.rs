//! Knowledge graph: concepts connected by typed, directed relations.
//!
//! - **Arena** ([`index::ConceptGraph`]): concepts addressed by [`ConceptId`],
//!   edges mirrored in a `petgraph` stable graph for adjacency lookups
//! - **Traversal** ([`traverse`]): transitive sub-graph extraction
//!
//! Hierarchical relations point from child to parent: `part -[PART]-> whole`,
//! `subtype -[SUBTYPE]-> supertype`. Observations point at the prior-knowledge
//! item they are evidence for.

pub mod index;
pub mod traverse;

use serde::{Deserialize, Serialize};

use crate::concept::ConceptId;

/// Type of a relation between two concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    /// The source is a part of the target.
    Part,
    /// The source is a subtype (alternative realization) of the target.
    Subtype,
    /// The source observation is evidence about the target.
    Observation,
}

impl RelationType {
    /// Whether this relation belongs to the PART/SUBTYPE hierarchy.
    pub fn is_hierarchical(self) -> bool {
        matches!(self, RelationType::Part | RelationType::Subtype)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationType::Part => write!(f, "PART"),
            RelationType::Subtype => write!(f, "SUBTYPE"),
            RelationType::Observation => write!(f, "OBSERVATION"),
        }
    }
}

impl std::str::FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "part" => Ok(RelationType::Part),
            "subtype" => Ok(RelationType::Subtype),
            "observation" => Ok(RelationType::Observation),
            other => Err(format!("unknown relation type: {other}")),
        }
    }
}

/// A directed, typed edge `source -[kind]-> target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    pub source: ConceptId,
    pub target: ConceptId,
    pub kind: RelationType,
}

impl Relation {
    pub fn new(source: ConceptId, target: ConceptId, kind: RelationType) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// `part` is a part of `whole`.
    pub fn part(part: ConceptId, whole: ConceptId) -> Self {
        Self::new(part, whole, RelationType::Part)
    }

    /// `subtype` is a subtype of `supertype`.
    pub fn subtype(subtype: ConceptId, supertype: ConceptId) -> Self {
        Self::new(subtype, supertype, RelationType::Subtype)
    }

    /// `observation` is evidence about `target`.
    pub fn observation(observation: ConceptId, target: ConceptId) -> Self {
        Self::new(observation, target, RelationType::Observation)
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target)
    }
}
