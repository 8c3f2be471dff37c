// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # verdict
//!
//! An evidence reconciliation engine. A knowledge hierarchy of prior-knowledge
//! items (pathways, complexes, functions) is annotated with observations; the
//! reasoner propagates what the evidence *predicts* bottom-up and what it
//! *expects* top-down, then classifies every item by how the two agree.
//!
//! ## Architecture
//!
//! - **Truth algebra** (`logic`): four-valued Belnap truth, its direct/default
//!   extension, and the sixteen-entry conclusion table
//! - **Knowledge graph** (`graph`): petgraph-backed arena of concepts with
//!   PART, SUBTYPE and OBSERVATION relations
//! - **Reasoner** (`reasoner`): specificity marking, prediction and
//!   expectation propagation, invalidation after mutation
//! - **Mode** (`mode`, `config`): dispensable and specific variants, verbosity
//! - **Persistence** (`store`): bincode snapshots of a whole reasoner
//! - **Documents** (`ingest`, `export`): JSON graphs in, JSON reports out
//!
//! ## Library usage
//!
//! ```
//! use verdict::concept::{Observation, ObservationType, PriorKnowledge};
//! use verdict::graph::Relation;
//! use verdict::logic::{Conclusion, Truth};
//! use verdict::reasoner::Reasoner;
//!
//! let mut reasoner = Reasoner::new();
//! let pathway = reasoner.insert_concept(PriorKnowledge::new("pathway")).unwrap();
//! let step = reasoner.insert_concept(PriorKnowledge::new("step")).unwrap();
//! let hit = reasoner
//!     .insert_concept(Observation::new("hit", ObservationType::Curation, Truth::True))
//!     .unwrap();
//! reasoner.insert_relation(Relation::part(step, pathway)).unwrap();
//! reasoner.insert_relation(Relation::observation(hit, step)).unwrap();
//! reasoner.reasoning();
//!
//! let step = reasoner.prior_knowledge("step").unwrap();
//! assert_eq!(step.conclusion, Conclusion::ConfirmedPresence);
//! ```

pub mod concept;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod ingest;
pub mod logic;
pub mod mode;
pub mod reasoner;
pub mod store;
