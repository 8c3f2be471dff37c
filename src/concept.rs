//! Concepts: the nodes of the knowledge graph.
//!
//! A [`Concept`] is either a [`PriorKnowledge`] item (something that may be
//! present or absent, carrying the reasoner's per-node state) or an
//! [`Observation`] (a piece of evidence about exactly one prior-knowledge item).
//! Every concept is addressed by a [`ConceptId`] allocated by the graph.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::logic::{Belief, Conclusion, Truth};

/// Unique, niche-optimized identifier for a concept.
///
/// Ids are allocated monotonically by the graph and never reused, so a stale
/// id can only ever miss, never alias a newer concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct ConceptId(NonZeroU64);

impl ConceptId {
    /// Create a `ConceptId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(ConceptId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "concept:{}", self.0)
    }
}

/// Classification of a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptKind {
    PriorKnowledge,
    Observation,
}

impl std::fmt::Display for ConceptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConceptKind::PriorKnowledge => write!(f, "PriorKnowledge"),
            ConceptKind::Observation => write!(f, "Observation"),
        }
    }
}

/// Which role an observation plays as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationType {
    /// Manually curated: counts as both prediction and expectation evidence.
    Curation,
    /// Wet-lab or phenotype evidence: expectation only.
    Experimentation,
    /// In-silico evidence: prediction only.
    Computation,
}

impl ObservationType {
    /// Whether observations of this type feed predictions.
    pub fn is_prediction(self) -> bool {
        matches!(self, ObservationType::Curation | ObservationType::Computation)
    }

    /// Whether observations of this type feed expectations.
    pub fn is_expectation(self) -> bool {
        matches!(
            self,
            ObservationType::Curation | ObservationType::Experimentation
        )
    }
}

impl std::fmt::Display for ObservationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationType::Curation => write!(f, "CURATION"),
            ObservationType::Experimentation => write!(f, "EXPERIMENTATION"),
            ObservationType::Computation => write!(f, "COMPUTATION"),
        }
    }
}

impl std::str::FromStr for ObservationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "curation" => Ok(ObservationType::Curation),
            "experimentation" => Ok(ObservationType::Experimentation),
            "computation" => Ok(ObservationType::Computation),
            other => Err(format!("unknown observation type: {other}")),
        }
    }
}

/// Role an observation plays when the reasoner collects direct evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceRole {
    Prediction,
    Expectation,
}

impl EvidenceRole {
    pub fn admits(self, kind: ObservationType) -> bool {
        match self {
            EvidenceRole::Prediction => kind.is_prediction(),
            EvidenceRole::Expectation => kind.is_expectation(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prior knowledge
// ---------------------------------------------------------------------------

/// A knowledge item whose presence is predicted and expected.
///
/// `prediction`, `expectation`, `conclusion` and `is_specific` are owned by
/// the reasoner; callers only set `is_dispensable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorKnowledge {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub prediction: Belief,
    pub expectation: Belief,
    pub conclusion: Conclusion,
    pub is_specific: bool,
    pub is_dispensable: bool,
}

impl PriorKnowledge {
    /// Create an unevaluated item.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            prediction: Belief::UNSET,
            expectation: Belief::UNSET,
            conclusion: Conclusion::Unexplained,
            is_specific: false,
            is_dispensable: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the item dispensable (only relevant under the dispensable variant).
    pub fn dispensable(mut self) -> Self {
        self.is_dispensable = true;
        self
    }

    /// Forget everything the reasoner derived.
    pub(crate) fn reset(&mut self) {
        self.prediction = Belief::UNSET;
        self.expectation = Belief::UNSET;
        self.conclusion = Conclusion::Unexplained;
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// A piece of evidence about one prior-knowledge item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: ObservationType,
    pub truth: Truth,
}

impl Observation {
    pub fn new(name: impl Into<String>, kind: ObservationType, truth: Truth) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            truth,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Concept
// ---------------------------------------------------------------------------

/// A node of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Concept {
    PriorKnowledge(PriorKnowledge),
    Observation(Observation),
}

impl Concept {
    pub fn name(&self) -> &str {
        match self {
            Concept::PriorKnowledge(pk) => &pk.name,
            Concept::Observation(obs) => &obs.name,
        }
    }

    pub fn kind(&self) -> ConceptKind {
        match self {
            Concept::PriorKnowledge(_) => ConceptKind::PriorKnowledge,
            Concept::Observation(_) => ConceptKind::Observation,
        }
    }

    pub fn as_prior_knowledge(&self) -> Option<&PriorKnowledge> {
        match self {
            Concept::PriorKnowledge(pk) => Some(pk),
            Concept::Observation(_) => None,
        }
    }

    pub fn as_prior_knowledge_mut(&mut self) -> Option<&mut PriorKnowledge> {
        match self {
            Concept::PriorKnowledge(pk) => Some(pk),
            Concept::Observation(_) => None,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            Concept::Observation(obs) => Some(obs),
            Concept::PriorKnowledge(_) => None,
        }
    }

    pub fn is_prior_knowledge(&self) -> bool {
        matches!(self, Concept::PriorKnowledge(_))
    }

    pub fn is_observation(&self) -> bool {
        matches!(self, Concept::Observation(_))
    }
}

impl From<PriorKnowledge> for Concept {
    fn from(pk: PriorKnowledge) -> Self {
        Concept::PriorKnowledge(pk)
    }
}

impl From<Observation> for Concept {
    fn from(obs: Observation) -> Self {
        Concept::Observation(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_id_rejects_zero() {
        assert!(ConceptId::new(0).is_none());
        assert_eq!(ConceptId::new(42).unwrap().get(), 42);
        assert_eq!(
            std::mem::size_of::<Option<ConceptId>>(),
            std::mem::size_of::<ConceptId>()
        );
    }

    #[test]
    fn new_prior_knowledge_is_unevaluated() {
        let pk = PriorKnowledge::new("glycolysis");
        assert_eq!(pk.prediction, Belief::UNSET);
        assert_eq!(pk.expectation, Belief::UNSET);
        assert_eq!(pk.conclusion, Conclusion::Unexplained);
        assert!(!pk.is_dispensable);
        assert!(PriorKnowledge::new("x").dispensable().is_dispensable);
    }

    #[test]
    fn observation_roles() {
        assert!(EvidenceRole::Prediction.admits(ObservationType::Curation));
        assert!(EvidenceRole::Prediction.admits(ObservationType::Computation));
        assert!(!EvidenceRole::Prediction.admits(ObservationType::Experimentation));
        assert!(EvidenceRole::Expectation.admits(ObservationType::Curation));
        assert!(EvidenceRole::Expectation.admits(ObservationType::Experimentation));
        assert!(!EvidenceRole::Expectation.admits(ObservationType::Computation));
    }

    #[test]
    fn concept_accessors() {
        let c: Concept = Observation::new("blast-hit", ObservationType::Computation, Truth::True).into();
        assert_eq!(c.name(), "blast-hit");
        assert_eq!(c.kind(), ConceptKind::Observation);
        assert!(c.as_prior_knowledge().is_none());
        assert_eq!(c.as_observation().map(|o| o.truth), Some(Truth::True));
    }
}
