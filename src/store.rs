//! Reasoner persistence.
//!
//! A reasoner is saved as one bincode-encoded [`ReasonerSnapshot`]. The
//! snapshot keeps concept ids, the id allocator and every per-item belief, so
//! a loaded reasoner reports exactly what the saved one did. Pending
//! invalidations are not part of the snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::index::{ConceptGraph, GraphSnapshot};
use crate::mode::{Mode, Verbosity};
use crate::reasoner::Reasoner;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Serializable form of a [`Reasoner`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerSnapshot {
    pub processed: bool,
    pub mode: Mode,
    pub verbosity: Verbosity,
    pub graph: GraphSnapshot,
}

impl ReasonerSnapshot {
    pub fn capture(reasoner: &Reasoner) -> Self {
        Self {
            processed: reasoner.has_been_processed(),
            mode: reasoner.mode().clone(),
            verbosity: reasoner.verbosity(),
            graph: reasoner.graph().snapshot(),
        }
    }

    /// Rebuild the reasoner, re-validating the graph.
    pub fn restore(self) -> StoreResult<Reasoner> {
        let graph = ConceptGraph::from_snapshot(self.graph).map_err(|e| StoreError::Corrupt {
            message: e.to_string(),
        })?;
        Ok(Reasoner::from_parts(graph, self.mode, self.verbosity, self.processed))
    }

    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization {
            message: format!("failed to encode reasoner snapshot: {e}"),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
            message: format!("failed to decode reasoner snapshot: {e}"),
        })
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write `reasoner` to `path`, replacing any existing file.
pub fn save(reasoner: &Reasoner, path: &Path) -> StoreResult<()> {
    let snapshot = ReasonerSnapshot::capture(reasoner);
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &snapshot).map_err(|e| StoreError::Serialization {
        message: format!("failed to encode reasoner snapshot: {e}"),
    })?;
    writer.flush().map_err(|e| io_error(path, e))?;

    tracing::info!(
        path = %path.display(),
        concepts = snapshot.graph.concepts.len(),
        relations = snapshot.graph.relations.len(),
        "saved reasoner"
    );
    Ok(())
}

/// Read a reasoner previously written by [`save`].
pub fn load(path: &Path) -> StoreResult<Reasoner> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let snapshot: ReasonerSnapshot =
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| StoreError::Serialization {
            message: format!("failed to decode {}: {e}", path.display()),
        })?;
    let reasoner = snapshot.restore()?;
    tracing::info!(
        path = %path.display(),
        concepts = reasoner.graph().concept_count(),
        processed = reasoner.has_been_processed(),
        "loaded reasoner"
    );
    Ok(reasoner)
}
