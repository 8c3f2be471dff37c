//! In-memory concept arena with typed adjacency.
//!
//! Concepts live in an id-ordered map; edges are mirrored in a petgraph
//! `StableDiGraph` whose node weights are the concept ids, so removing a
//! concept never invalidates the indices of the others.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::concept::{Concept, ConceptId, Observation, PriorKnowledge};
use crate::error::GraphError;

use super::{Relation, RelationType};

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Knowledge graph of prior-knowledge items and observations.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    /// Directed multigraph: node weights are concept ids, edge weights relation types.
    graph: StableDiGraph<ConceptId, RelationType>,
    /// ConceptId → NodeIndex mapping for O(1) node lookups.
    node_index: HashMap<ConceptId, NodeIndex>,
    /// Concept payloads, ordered by id (i.e. insertion order).
    concepts: BTreeMap<ConceptId, Concept>,
    /// Unique name → id.
    names: HashMap<String, ConceptId>,
    /// Last allocated raw id.
    next_id: u64,
}

/// Serializable form of a [`ConceptGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub next_id: u64,
    pub concepts: Vec<(ConceptId, Concept)>,
    pub relations: Vec<Relation>,
}

impl ConceptGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> GraphResult<ConceptId> {
        let raw = self.next_id.checked_add(1).ok_or(GraphError::IdsExhausted)?;
        let id = ConceptId::new(raw).ok_or(GraphError::IdsExhausted)?;
        self.next_id = raw;
        Ok(id)
    }

    fn node(&self, id: ConceptId) -> GraphResult<NodeIndex> {
        self.node_index
            .get(&id)
            .copied()
            .ok_or(GraphError::ConceptNotFound {
                concept_id: id.get(),
            })
    }

    /// Insert a concept, returning its new id.
    pub fn add_concept(&mut self, concept: Concept) -> GraphResult<ConceptId> {
        if self.names.contains_key(concept.name()) {
            return Err(GraphError::DuplicateConcept {
                name: concept.name().to_string(),
            });
        }
        let id = self.allocate_id()?;
        self.place(id, concept);
        Ok(id)
    }

    fn place(&mut self, id: ConceptId, concept: Concept) {
        let idx = self.graph.add_node(id);
        self.node_index.insert(id, idx);
        self.names.insert(concept.name().to_string(), id);
        self.concepts.insert(id, concept);
    }

    /// Remove a concept and every relation touching it.
    ///
    /// Returns the removed concept and the relations that went with it.
    pub fn delete_concept(&mut self, id: ConceptId) -> GraphResult<(Concept, Vec<Relation>)> {
        let idx = self.node(id)?;
        let mut removed = self.outgoing(id, None);
        removed.extend(self.incoming(id, None));
        removed.sort();

        self.graph.remove_node(idx);
        self.node_index.remove(&id);
        let concept = self.concepts.remove(&id).ok_or(GraphError::ConceptNotFound {
            concept_id: id.get(),
        })?;
        self.names.remove(concept.name());
        Ok((concept, removed))
    }

    /// Insert a relation after checking it against the graph invariants.
    ///
    /// Hierarchical relations must join two prior-knowledge items and must not
    /// close a cycle; observation relations must attach one observation to one
    /// prior-knowledge item. Nothing is modified when a check fails.
    pub fn add_relation(&mut self, relation: Relation) -> GraphResult<()> {
        let (source_idx, target_idx) = self.check_relation(&relation)?;
        if relation.kind.is_hierarchical()
            && petgraph::algo::has_path_connecting(&self.graph, target_idx, source_idx, None)
        {
            return Err(cycle(&relation));
        }
        self.graph.add_edge(source_idx, target_idx, relation.kind);
        Ok(())
    }

    /// Insert a batch of relations, all or nothing.
    ///
    /// Each relation is checked like [`add_relation`](Self::add_relation),
    /// except that cycles are looked for once, after the whole batch is in.
    /// On any failure the relations of the batch added so far are removed.
    pub fn add_relations<I>(&mut self, relations: I) -> GraphResult<Vec<Relation>>
    where
        I: IntoIterator<Item = Relation>,
    {
        let mut added: Vec<(Relation, EdgeIndex)> = Vec::new();
        for relation in relations {
            match self.check_relation(&relation) {
                Ok((source_idx, target_idx)) => {
                    let edge = self.graph.add_edge(source_idx, target_idx, relation.kind);
                    added.push((relation, edge));
                }
                Err(e) => {
                    self.roll_back(&added);
                    return Err(e);
                }
            }
        }

        if petgraph::algo::is_cyclic_directed(&self.graph) {
            // An edge lies on a cycle iff its target reaches its source.
            let culprit = added.iter().find(|(relation, _)| {
                match (self.node_index.get(&relation.target), self.node_index.get(&relation.source)) {
                    (Some(&t), Some(&s)) => {
                        petgraph::algo::has_path_connecting(&self.graph, t, s, None)
                    }
                    _ => false,
                }
            });
            if let Some((relation, _)) = culprit.or(added.first()) {
                let err = cycle(relation);
                self.roll_back(&added);
                return Err(err);
            }
        }

        Ok(added.into_iter().map(|(relation, _)| relation).collect())
    }

    fn roll_back(&mut self, added: &[(Relation, EdgeIndex)]) {
        for (_, edge) in added.iter().rev() {
            self.graph.remove_edge(*edge);
        }
    }

    /// Every relation invariant except acyclicity.
    fn check_relation(&self, relation: &Relation) -> GraphResult<(NodeIndex, NodeIndex)> {
        let source_idx = self.node(relation.source)?;
        let target_idx = self.node(relation.target)?;
        let kind = relation.kind.to_string();

        let source_is_pk = self.concept(relation.source)?.is_prior_knowledge();
        let target_is_pk = self.concept(relation.target)?.is_prior_knowledge();

        if relation.kind.is_hierarchical() {
            if !source_is_pk || !target_is_pk {
                return Err(GraphError::InvalidRelation {
                    kind,
                    message: "both ends must be prior-knowledge items".into(),
                });
            }
        } else {
            if !self.concept(relation.source)?.is_observation() {
                return Err(GraphError::InvalidRelation {
                    kind,
                    message: format!("source {} is not an observation", relation.source),
                });
            }
            if !target_is_pk {
                return Err(GraphError::InvalidRelation {
                    kind,
                    message: format!("target {} is not a prior-knowledge item", relation.target),
                });
            }
            if !self.outgoing(relation.source, Some(RelationType::Observation)).is_empty() {
                return Err(GraphError::InvalidRelation {
                    kind,
                    message: format!("observation {} is already attached", relation.source),
                });
            }
        }

        if self.contains_relation(relation) {
            return Err(GraphError::DuplicateRelation {
                source_id: relation.source.get(),
                target_id: relation.target.get(),
                kind,
            });
        }

        Ok((source_idx, target_idx))
    }

    /// Remove one relation.
    pub fn delete_relation(&mut self, relation: &Relation) -> GraphResult<()> {
        let source_idx = self.node(relation.source)?;
        let target_idx = self.node(relation.target)?;
        let edge = self
            .graph
            .edges_connecting(source_idx, target_idx)
            .find(|e| *e.weight() == relation.kind)
            .map(|e| e.id())
            .ok_or(GraphError::RelationNotFound {
                source_id: relation.source.get(),
                target_id: relation.target.get(),
                kind: relation.kind.to_string(),
            })?;
        self.graph.remove_edge(edge);
        Ok(())
    }

    /// Whether this exact relation is present.
    pub fn contains_relation(&self, relation: &Relation) -> bool {
        match (
            self.node_index.get(&relation.source),
            self.node_index.get(&relation.target),
        ) {
            (Some(&s), Some(&t)) => self
                .graph
                .edges_connecting(s, t)
                .any(|e| *e.weight() == relation.kind),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Concept lookups
    // -----------------------------------------------------------------------

    /// Check if a concept exists.
    pub fn contains(&self, id: ConceptId) -> bool {
        self.concepts.contains_key(&id)
    }

    pub fn concept(&self, id: ConceptId) -> GraphResult<&Concept> {
        self.concepts.get(&id).ok_or(GraphError::ConceptNotFound {
            concept_id: id.get(),
        })
    }

    /// Resolve a concept name to its id.
    pub fn lookup(&self, name: &str) -> GraphResult<ConceptId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::ConceptNameNotFound {
                name: name.to_string(),
            })
    }

    pub fn concept_by_name(&self, name: &str) -> GraphResult<&Concept> {
        self.concept(self.lookup(name)?)
    }

    pub fn prior_knowledge(&self, id: ConceptId) -> Option<&PriorKnowledge> {
        self.concepts.get(&id).and_then(Concept::as_prior_knowledge)
    }

    pub fn prior_knowledge_mut(&mut self, id: ConceptId) -> Option<&mut PriorKnowledge> {
        self.concepts
            .get_mut(&id)
            .and_then(Concept::as_prior_knowledge_mut)
    }

    pub fn observation(&self, id: ConceptId) -> Option<&Observation> {
        self.concepts.get(&id).and_then(Concept::as_observation)
    }

    /// All concepts in id order.
    pub fn concepts(&self) -> impl Iterator<Item = (ConceptId, &Concept)> {
        self.concepts.iter().map(|(id, c)| (*id, c))
    }

    /// Ids of all prior-knowledge items, in id order.
    pub fn prior_knowledge_ids(&self) -> Vec<ConceptId> {
        self.concepts
            .iter()
            .filter(|(_, c)| c.is_prior_knowledge())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids of all observations, in id order.
    pub fn observation_ids(&self) -> Vec<ConceptId> {
        self.concepts
            .iter()
            .filter(|(_, c)| c.is_observation())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of concepts.
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of relations.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    // -----------------------------------------------------------------------
    // Adjacency
    // -----------------------------------------------------------------------

    fn edges(&self, id: ConceptId, dir: Direction, kind: Option<RelationType>) -> Vec<Relation> {
        let Some(&idx) = self.node_index.get(&id) else {
            return vec![];
        };
        let mut relations: Vec<Relation> = self
            .graph
            .edges_directed(idx, dir)
            .filter(|e| kind.is_none_or(|k| *e.weight() == k))
            .filter_map(|e| {
                let source = *self.graph.node_weight(e.source())?;
                let target = *self.graph.node_weight(e.target())?;
                Some(Relation::new(source, target, *e.weight()))
            })
            .collect();
        relations.sort();
        relations
    }

    /// Relations leaving `id`, optionally restricted to one type.
    pub fn outgoing(&self, id: ConceptId, kind: Option<RelationType>) -> Vec<Relation> {
        self.edges(id, Direction::Outgoing, kind)
    }

    /// Relations arriving at `id`, optionally restricted to one type.
    pub fn incoming(&self, id: ConceptId, kind: Option<RelationType>) -> Vec<Relation> {
        self.edges(id, Direction::Incoming, kind)
    }

    /// Whether any PART/SUBTYPE relation arrives at `id`.
    pub fn has_incoming_hierarchy(&self, id: ConceptId) -> bool {
        self.hierarchy_degree(id, Direction::Incoming) > 0
    }

    /// Whether any PART/SUBTYPE relation leaves `id`.
    pub fn has_outgoing_hierarchy(&self, id: ConceptId) -> bool {
        self.hierarchy_degree(id, Direction::Outgoing) > 0
    }

    /// Number of PART/SUBTYPE relations in one direction.
    pub fn hierarchy_degree(&self, id: ConceptId, dir: Direction) -> usize {
        self.node_index.get(&id).map_or(0, |&idx| {
            self.graph
                .edges_directed(idx, dir)
                .filter(|e| e.weight().is_hierarchical())
                .count()
        })
    }

    /// Hierarchical children of `id` (sources of incoming PART/SUBTYPE
    /// relations), restricted to one type when `kind` is given.
    pub fn children(&self, id: ConceptId, kind: Option<RelationType>) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self
            .incoming(id, kind)
            .into_iter()
            .filter(|r| r.kind.is_hierarchical())
            .map(|r| r.source)
            .collect();
        ids.dedup();
        ids
    }

    /// Hierarchical parents of `id` (targets of outgoing PART/SUBTYPE
    /// relations), restricted to one type when `kind` is given.
    pub fn parents(&self, id: ConceptId, kind: Option<RelationType>) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self
            .outgoing(id, kind)
            .into_iter()
            .filter(|r| r.kind.is_hierarchical())
            .map(|r| r.target)
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Observations attached to `id`.
    pub fn observations_of(&self, id: ConceptId) -> Vec<ConceptId> {
        self.incoming(id, Some(RelationType::Observation))
            .into_iter()
            .map(|r| r.source)
            .collect()
    }

    /// Every relation in the graph, sorted.
    pub fn relations(&self) -> Vec<Relation> {
        let mut relations: Vec<Relation> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (s, t) = self.graph.edge_endpoints(e)?;
                let source = *self.graph.node_weight(s)?;
                let target = *self.graph.node_weight(t)?;
                Some(Relation::new(source, target, *self.graph.edge_weight(e)?))
            })
            .collect();
        relations.sort();
        relations
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the graph in a serializable form.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            next_id: self.next_id,
            concepts: self.concepts().map(|(id, c)| (id, c.clone())).collect(),
            relations: self.relations(),
        }
    }

    /// Rebuild a graph from a snapshot, re-checking every relation.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> GraphResult<Self> {
        let mut graph = Self::new();
        for (id, concept) in snapshot.concepts {
            if graph.contains(id) || graph.names.contains_key(concept.name()) {
                return Err(GraphError::DuplicateConcept {
                    name: concept.name().to_string(),
                });
            }
            graph.next_id = graph.next_id.max(id.get());
            graph.place(id, concept);
        }
        graph.next_id = graph.next_id.max(snapshot.next_id);
        graph.add_relations(snapshot.relations)?;
        Ok(graph)
    }
}

fn cycle(relation: &Relation) -> GraphError {
    GraphError::CycleDetected {
        source_id: relation.source.get(),
        target_id: relation.target.get(),
        kind: relation.kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::ObservationType;
    use crate::logic::Truth;

    fn pk(graph: &mut ConceptGraph, name: &str) -> ConceptId {
        graph.add_concept(PriorKnowledge::new(name).into()).unwrap()
    }

    fn obs(graph: &mut ConceptGraph, name: &str) -> ConceptId {
        graph
            .add_concept(Observation::new(name, ObservationType::Computation, Truth::True).into())
            .unwrap()
    }

    #[test]
    fn add_and_lookup_concepts() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        assert_ne!(a, b);
        assert_eq!(graph.lookup("A").unwrap(), a);
        assert_eq!(graph.concept_by_name("B").unwrap().name(), "B");
        assert_eq!(graph.concept_count(), 2);
        assert!(matches!(
            graph.lookup("C"),
            Err(GraphError::ConceptNameNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut graph = ConceptGraph::new();
        pk(&mut graph, "A");
        let err = graph.add_concept(PriorKnowledge::new("A").into()).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateConcept { .. }));
    }

    #[test]
    fn hierarchy_adjacency() {
        let mut graph = ConceptGraph::new();
        let whole = pk(&mut graph, "whole");
        let p1 = pk(&mut graph, "p1");
        let p2 = pk(&mut graph, "p2");
        let s = pk(&mut graph, "s");
        graph.add_relation(Relation::part(p1, whole)).unwrap();
        graph.add_relation(Relation::part(p2, whole)).unwrap();
        graph.add_relation(Relation::subtype(s, whole)).unwrap();

        assert_eq!(graph.children(whole, None), vec![p1, p2, s]);
        assert_eq!(graph.children(whole, Some(RelationType::Part)), vec![p1, p2]);
        assert_eq!(graph.children(whole, Some(RelationType::Subtype)), vec![s]);
        assert_eq!(graph.parents(p1, None), vec![whole]);
        assert!(graph.has_incoming_hierarchy(whole));
        assert!(!graph.has_outgoing_hierarchy(whole));
        assert!(graph.has_outgoing_hierarchy(s));
        assert_eq!(graph.relation_count(), 3);
    }

    #[test]
    fn observation_edges_do_not_count_as_hierarchy() {
        let mut graph = ConceptGraph::new();
        let target = pk(&mut graph, "target");
        let o = obs(&mut graph, "o");
        graph.add_relation(Relation::observation(o, target)).unwrap();
        assert!(!graph.has_incoming_hierarchy(target));
        assert_eq!(graph.observations_of(target), vec![o]);
        assert!(graph.children(target, None).is_empty());
    }

    #[test]
    fn invalid_relations_are_rejected() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        let o = obs(&mut graph, "o");

        assert!(matches!(
            graph.add_relation(Relation::part(o, a)),
            Err(GraphError::InvalidRelation { .. })
        ));
        assert!(matches!(
            graph.add_relation(Relation::observation(a, b)),
            Err(GraphError::InvalidRelation { .. })
        ));
        graph.add_relation(Relation::observation(o, a)).unwrap();
        assert!(matches!(
            graph.add_relation(Relation::observation(o, b)),
            Err(GraphError::InvalidRelation { .. })
        ));
        assert_eq!(graph.relation_count(), 1);
    }

    #[test]
    fn duplicate_relation_rejected_but_other_type_allowed() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        graph.add_relation(Relation::part(a, b)).unwrap();
        assert!(matches!(
            graph.add_relation(Relation::part(a, b)),
            Err(GraphError::DuplicateRelation { .. })
        ));
        graph.add_relation(Relation::subtype(a, b)).unwrap();
        assert_eq!(graph.parents(a, None), vec![b]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        let c = pk(&mut graph, "C");
        graph.add_relation(Relation::part(a, b)).unwrap();
        graph.add_relation(Relation::subtype(b, c)).unwrap();
        assert!(matches!(
            graph.add_relation(Relation::part(c, a)),
            Err(GraphError::CycleDetected { .. })
        ));
        assert!(matches!(
            graph.add_relation(Relation::part(a, a)),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn batch_with_a_cycle_is_rolled_back() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        let c = pk(&mut graph, "C");
        graph.add_relation(Relation::part(a, b)).unwrap();

        let err = graph
            .add_relations([Relation::subtype(b, c), Relation::part(c, a)])
            .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
        assert_eq!(graph.relations(), vec![Relation::part(a, b)]);

        let err = graph
            .add_relations([Relation::subtype(b, c), Relation::part(a, b)])
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateRelation { .. }));
        assert_eq!(graph.relations(), vec![Relation::part(a, b)]);

        let added = graph.add_relations([Relation::subtype(b, c)]).unwrap();
        assert_eq!(added, vec![Relation::subtype(b, c)]);
        assert_eq!(graph.parents(b, None), vec![c]);
    }

    #[test]
    fn delete_concept_removes_incident_relations() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        let o = obs(&mut graph, "o");
        graph.add_relation(Relation::part(a, b)).unwrap();
        graph.add_relation(Relation::observation(o, a)).unwrap();

        let (concept, removed) = graph.delete_concept(a).unwrap();
        assert_eq!(concept.name(), "A");
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.relation_count(), 0);
        assert!(graph.lookup("A").is_err());

        // Ids are never reused.
        let c = pk(&mut graph, "A");
        assert!(c > o);
    }

    #[test]
    fn delete_missing_relation_fails() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        assert!(matches!(
            graph.delete_relation(&Relation::part(a, b)),
            Err(GraphError::RelationNotFound { .. })
        ));
        graph.add_relation(Relation::part(a, b)).unwrap();
        graph.delete_relation(&Relation::part(a, b)).unwrap();
        assert!(!graph.contains_relation(&Relation::part(a, b)));
    }

    #[test]
    fn snapshot_roundtrip_preserves_ids() {
        let mut graph = ConceptGraph::new();
        let a = pk(&mut graph, "A");
        let b = pk(&mut graph, "B");
        let gone = pk(&mut graph, "gone");
        graph.add_relation(Relation::part(a, b)).unwrap();
        graph.delete_concept(gone).unwrap();

        let mut restored = ConceptGraph::from_snapshot(graph.snapshot()).unwrap();
        assert_eq!(restored.lookup("A").unwrap(), a);
        assert_eq!(restored.relations(), graph.relations());
        let next = pk(&mut restored, "next");
        assert!(next > gone);
    }
}
