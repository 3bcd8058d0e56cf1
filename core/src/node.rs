use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::edge::{Edge, EdgeId};

/// Arena index of a node inside its owning [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A vertex and its adjacency.
///
/// `outgoing` maps a destination label to the single edge pointing there,
/// `incoming` maps a source label to the single edge arriving from there.
/// Both maps hold arena indices; the edges themselves live in the graph.
#[derive(Debug, Clone)]
pub(crate) struct Node<N> {
    id: NodeId,
    label: N,
    outgoing: HashMap<N, EdgeId>,
    incoming: HashMap<N, EdgeId>,
}

impl<N> Node<N> {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn label(&self) -> &N {
        &self.label
    }

    pub(crate) fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub(crate) fn in_degree(&self) -> usize {
        self.incoming.len()
    }
}

impl<N: Eq + Hash + Clone> Node<N> {
    pub(crate) fn new(id: NodeId, label: N) -> Self {
        Self {
            id,
            label,
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }

    /// Record `edge` in whichever adjacency maps it belongs to.
    ///
    /// The source and destination checks are independent, so a self-loop
    /// lands in both maps. An existing entry for the same neighbor is
    /// replaced; the graph never creates a second edge for one ordered pair.
    pub(crate) fn register_edge<E>(
        &mut self,
        edge_id: EdgeId,
        edge: &Edge<E>,
        source_label: &N,
        destination_label: &N,
    ) {
        if edge.source() == self.id {
            self.outgoing.insert(destination_label.clone(), edge_id);
        }
        if edge.destination() == self.id {
            self.incoming.insert(source_label.clone(), edge_id);
        }
    }

    /// Edge from this node to `label`, if any.
    pub(crate) fn edge_towards(&self, label: &N) -> Option<EdgeId> {
        self.outgoing.get(label).copied()
    }

    /// Edge from `label` into this node, if any.
    pub(crate) fn edge_from(&self, label: &N) -> Option<EdgeId> {
        self.incoming.get(label).copied()
    }

    pub(crate) fn neighbor_labels_out(&self) -> HashSet<N> {
        self.outgoing.keys().cloned().collect()
    }

    pub(crate) fn neighbor_labels_in(&self) -> HashSet<N> {
        self.incoming.keys().cloned().collect()
    }

    pub(crate) fn outgoing(&self) -> impl Iterator<Item = (&N, EdgeId)> {
        self.outgoing.iter().map(|(label, &id)| (label, id))
    }

    pub(crate) fn incoming(&self) -> impl Iterator<Item = (&N, EdgeId)> {
        self.incoming.iter().map(|(label, &id)| (label, id))
    }

    /// Labels on the edge towards `label`, or an empty set.
    pub(crate) fn labels_towards<E>(&self, label: &N, edges: &[Edge<E>]) -> HashSet<E>
    where
        E: Eq + Hash + Clone,
    {
        self.edge_towards(label)
            .and_then(|id| edges.get(id.0))
            .map(Edge::labels)
            .unwrap_or_default()
    }

    /// Number of incoming connections counted per label, not per neighbor.
    pub(crate) fn incoming_edge_weight<E>(&self, edges: &[Edge<E>]) -> usize
    where
        E: Eq + Hash + Clone,
    {
        sum_label_counts(self.incoming.values(), edges)
    }

    /// Number of outgoing connections counted per label, not per neighbor.
    pub(crate) fn outgoing_edge_weight<E>(&self, edges: &[Edge<E>]) -> usize
    where
        E: Eq + Hash + Clone,
    {
        sum_label_counts(self.outgoing.values(), edges)
    }
}

fn sum_label_counts<'a, E>(ids: impl Iterator<Item = &'a EdgeId>, edges: &[Edge<E>]) -> usize {
    ids.filter_map(|id| edges.get(id.0))
        .map(Edge::label_count)
        .sum()
}
