//! Rich diagnostic error types for the verdict engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the verdict engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum VerdictError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reason(#[from] ReasonError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("concept not found: {concept_id}")]
    #[diagnostic(
        code(verdict::graph::concept_not_found),
        help(
            "The concept id has no node in the knowledge graph. \
             It was either never inserted or has been deleted."
        )
    )]
    ConceptNotFound { concept_id: u64 },

    #[error("no concept named \"{name}\"")]
    #[diagnostic(
        code(verdict::graph::name_not_found),
        help("Concept names are case-sensitive. Insert the concept before referencing it.")
    )]
    ConceptNameNotFound { name: String },

    #[error("duplicate concept: \"{name}\"")]
    #[diagnostic(
        code(verdict::graph::duplicate_concept),
        help("Concept names must be unique within a graph. Pick another name or delete the old concept first.")
    )]
    DuplicateConcept { name: String },

    #[error("duplicate relation: {source_id} -[{kind}]-> {target_id}")]
    #[diagnostic(
        code(verdict::graph::duplicate_relation),
        help("This exact relation already exists in the graph. No action needed.")
    )]
    DuplicateRelation {
        source_id: u64,
        target_id: u64,
        kind: String,
    },

    #[error("relation not found: {source_id} -[{kind}]-> {target_id}")]
    #[diagnostic(
        code(verdict::graph::relation_not_found),
        help("Only relations present in the graph can be deleted.")
    )]
    RelationNotFound {
        source_id: u64,
        target_id: u64,
        kind: String,
    },

    #[error("concept id space exhausted")]
    #[diagnostic(
        code(verdict::graph::ids_exhausted),
        help(
            "The graph has allocated u64::MAX concept ids. This requires 2^64 insertions; \
             check for an insert/delete loop."
        )
    )]
    IdsExhausted,

    #[error("invalid {kind} relation: {message}")]
    #[diagnostic(
        code(verdict::graph::invalid_relation),
        help(
            "PART and SUBTYPE relations link two prior-knowledge items. \
             OBSERVATION relations link one observation to one prior-knowledge item."
        )
    )]
    InvalidRelation { kind: String, message: String },

    #[error("relation {source_id} -[{kind}]-> {target_id} would close a cycle")]
    #[diagnostic(
        code(verdict::graph::cycle),
        help(
            "The PART/SUBTYPE hierarchy must stay acyclic for propagation to terminate. \
             The target already reaches the source through hierarchical relations."
        )
    )]
    CycleDetected {
        source_id: u64,
        target_id: u64,
        kind: String,
    },
}

// ---------------------------------------------------------------------------
// Reasoning errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReasonError {
    #[error("concept \"{name}\" is not a prior-knowledge item")]
    #[diagnostic(
        code(verdict::reason::not_prior_knowledge),
        help("Predictions, expectations and conclusions only exist on prior-knowledge items.")
    )]
    NotPriorKnowledge { name: String },

    #[error("concept \"{name}\" is not an observation")]
    #[diagnostic(
        code(verdict::reason::not_observation),
        help("Only observations carry an evidence type and truth value.")
    )]
    NotObservation { name: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(verdict::store::io),
        help(
            "A filesystem operation failed. Check that the directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(verdict::store::serde),
        help(
            "Failed to serialize or deserialize the reasoner state. \
             This usually means the state file was written by an incompatible version. \
             Re-run reasoning from the source graph."
        )
    )]
    Serialization { message: String },

    #[error("corrupt snapshot: {message}")]
    #[diagnostic(
        code(verdict::store::corrupt),
        help("The snapshot decoded but does not describe a valid graph. Re-create it from the source graph.")
    )]
    Corrupt { message: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read configuration {path}: {source}")]
    #[diagnostic(
        code(verdict::config::io),
        help("Check that the configuration file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {path}: {message}")]
    #[diagnostic(
        code(verdict::config::parse),
        help(
            "The configuration must be TOML with optional keys \
             `variants = [\"dispensable\", \"specific\"]` and \
             `verbosity = \"quiet\" | \"low\" | \"medium\" | \"high\"`."
        )
    )]
    Parse { path: String, message: String },

    #[error("unknown variant: {name}")]
    #[diagnostic(
        code(verdict::config::unknown_variant),
        help("Valid variants are: dispensable, specific.")
    )]
    UnknownVariant { name: String },

    #[error("invalid graph document: {message}")]
    #[diagnostic(
        code(verdict::config::document),
        help(
            "Graph documents are JSON objects with `prior_knowledges`, \
             `observations` and `relations` arrays."
        )
    )]
    Document { message: String },
}

/// Convenience alias for functions returning verdict results.
pub type VerdictResult<T> = std::result::Result<T, VerdictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_converts_to_verdict_error() {
        let err = GraphError::ConceptNotFound { concept_id: 7 };
        let top: VerdictError = err.into();
        assert!(matches!(
            top,
            VerdictError::Graph(GraphError::ConceptNotFound { concept_id: 7 })
        ));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = GraphError::CycleDetected {
            source_id: 3,
            target_id: 9,
            kind: "PART".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains('3'));
        assert!(msg.contains('9'));
        assert!(msg.contains("PART"));
    }
}
