//! Sub-graph extraction: everything that feeds evidence into a concept.
//!
//! Walks incoming relations breadth-first from a root, so the result holds the
//! root's children, their children, and every observation attached along the way.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::concept::ConceptId;

use super::index::{ConceptGraph, GraphResult};
use super::Relation;

/// Result of a sub-graph extraction.
#[derive(Debug, Clone, Default)]
pub struct SubGraph {
    /// Every relation reachable backwards from the root, sorted.
    pub relations: BTreeSet<Relation>,
    /// Every concept visited, the root included.
    pub visited: HashSet<ConceptId>,
    /// Longest hop count from the root that was reached.
    pub depth_reached: usize,
}

impl SubGraph {
    /// Concepts that contribute to the root, excluding the root itself.
    pub fn contributors(&self, root: ConceptId) -> BTreeSet<ConceptId> {
        self.visited.iter().copied().filter(|id| *id != root).collect()
    }
}

/// Collect the transitive closure of relations whose target is `root`.
pub fn sub_graph(graph: &ConceptGraph, root: ConceptId) -> GraphResult<SubGraph> {
    graph.concept(root)?;

    let mut result = SubGraph::default();
    let mut queue: VecDeque<(ConceptId, usize)> = VecDeque::new();
    result.visited.insert(root);
    queue.push_back((root, 0));

    while let Some((node, depth)) = queue.pop_front() {
        for relation in graph.incoming(node, None) {
            result.relations.insert(relation);
            result.depth_reached = result.depth_reached.max(depth + 1);
            if result.visited.insert(relation.source) {
                queue.push_back((relation.source, depth + 1));
            }
        }
    }

    Ok(result)
}
