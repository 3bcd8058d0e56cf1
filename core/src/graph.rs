use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::edge::{Edge, EdgeId};
use crate::error::InvariantViolation;
use crate::node::{Node, NodeId};

/// Labeled directed multigraph.
///
/// The graph owns every node and edge in two arenas. Nodes are keyed by their
/// label `N`; an edge exists at most once per ordered pair of nodes and
/// carries a non-empty set of labels `E`. Insert-only: nothing is ever
/// removed, so arena indices stay valid for the graph's lifetime.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<Node<N>>,
    index: HashMap<N, NodeId>,
    edges: Vec<Edge<E>>,
}

impl<N, E> Graph<N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            index: HashMap::with_capacity(node_count),
            edges: Vec::with_capacity(edge_count),
        }
    }

    /// Insert a node. Returns false if a node with this label already exists.
    pub fn add_node(&mut self, label: N) -> bool {
        if self.index.contains_key(&label) {
            return false;
        }
        let id = NodeId(self.nodes.len());
        self.index.insert(label.clone(), id);
        self.nodes.push(Node::new(id, label));
        true
    }

    pub fn has_node(&self, label: &N) -> bool {
        self.index.contains_key(label)
    }

    /// Add a labeled edge from `parent` to `child`.
    ///
    /// Returns false without touching the graph if either node is missing.
    /// The first label between an ordered pair creates the edge; later ones
    /// join its label set, and the result tells whether the label was new.
    pub fn add_edge(&mut self, parent: &N, child: &N, label: E) -> bool {
        let (Some(&source), Some(&destination)) = (self.index.get(parent), self.index.get(child))
        else {
            return false;
        };

        if let Some(existing) = self.nodes[source.0].edge_towards(child) {
            let added = self.edges[existing.0].add_label(label);
            if added {
                debug!(
                    edge = existing.0,
                    labels = self.edges[existing.0].label_count(),
                    "collapsed label into existing edge"
                );
            }
            return added;
        }

        let edge_id = EdgeId(self.edges.len());
        let edge = Edge::new(source, label, destination);
        self.nodes[source.0].register_edge(edge_id, &edge, parent, child);
        self.nodes[destination.0].register_edge(edge_id, &edge, parent, child);
        self.edges.push(edge);
        debug!(
            edge = edge_id.0,
            source = source.0,
            destination = destination.0,
            "created edge"
        );
        true
    }

    /// Bulk load from `(parent, child, label)` triples.
    ///
    /// Unlike [`add_edge`](Self::add_edge), missing endpoints are created.
    /// Returns the number of triples that added a new edge or label.
    pub fn load_edges<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator<Item = (N, N, E)>,
    {
        let mut added = 0;
        for (parent, child, label) in edges {
            if !self.has_node(&parent) {
                self.add_node(parent.clone());
            }
            if !self.has_node(&child) {
                self.add_node(child.clone());
            }
            if self.add_edge(&parent, &child, label) {
                added += 1;
            }
        }
        added
    }

    /// Labels of the nodes `label` has an edge to. Empty for unknown nodes.
    pub fn neighbors_out(&self, label: &N) -> HashSet<N> {
        self.node_entry(label)
            .map(Node::neighbor_labels_out)
            .unwrap_or_default()
    }

    /// Labels of the nodes with an edge into `label`. Empty for unknown nodes.
    pub fn neighbors_in(&self, label: &N) -> HashSet<N> {
        self.node_entry(label)
            .map(Node::neighbor_labels_in)
            .unwrap_or_default()
    }

    /// Labels on the edge `from -> to`; empty if there is none.
    pub fn labels_between(&self, from: &N, to: &N) -> HashSet<E> {
        self.node_entry(from)
            .map(|n| n.labels_towards(to, &self.edges))
            .unwrap_or_default()
    }

    pub fn node(&self, label: &N) -> Option<NodeRef<'_, N, E>> {
        self.node_entry(label).map(|node| NodeRef { graph: self, node })
    }

    /// The edge `from -> to`, if one exists.
    pub fn edge(&self, from: &N, to: &N) -> Option<EdgeRef<'_, N, E>> {
        let id = self.node_entry(from)?.edge_towards(to)?;
        self.edge_ref(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_, N, E>> {
        self.edges.iter().enumerate().map(move |(i, edge)| EdgeRef {
            graph: self,
            id: EdgeId(i),
            edge,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of ordered pairs with at least one label.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total number of labels over all edges.
    pub fn label_count(&self) -> usize {
        self.edges.iter().map(Edge::label_count).sum()
    }

    /// Copy of all node labels.
    pub fn nodes(&self) -> HashSet<N> {
        self.index.keys().cloned().collect()
    }

    pub fn node_labels(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter().map(Node::label)
    }

    pub(crate) fn node_id(&self, label: &N) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    pub(crate) fn node_at(&self, id: NodeId) -> &Node<N> {
        &self.nodes[id.0]
    }

    pub(crate) fn edge_at(&self, id: EdgeId) -> &Edge<E> {
        &self.edges[id.0]
    }

    fn node_entry(&self, label: &N) -> Option<&Node<N>> {
        self.index.get(label).map(|id| &self.nodes[id.0])
    }

    fn edge_ref(&self, id: EdgeId) -> Option<EdgeRef<'_, N, E>> {
        self.edges.get(id.0).map(|edge| EdgeRef {
            graph: self,
            id,
            edge,
        })
    }
}

impl<N, E> Graph<N, E>
where
    N: Eq + Hash + Clone + Debug,
    E: Eq + Hash + Clone + Debug,
{
    /// Verify the representation invariants of the whole structure.
    ///
    /// Not called on the mutation path. Intended for tests and for callers
    /// that want to audit a graph after bulk construction.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (key, id) in &self.index {
            match self.nodes.get(id.0) {
                Some(node) if node.label() == key => {}
                other => {
                    return Err(InvariantViolation::KeyLabelMismatch {
                        key: format!("{key:?}"),
                        label: other
                            .map(|n| format!("{:?}", n.label()))
                            .unwrap_or_else(|| "<missing>".to_string()),
                    })
                }
            }
        }

        for (slot, node) in self.nodes.iter().enumerate() {
            if node.id().0 != slot {
                return Err(InvariantViolation::MisplacedNode {
                    label: format!("{:?}", node.label()),
                    slot,
                    id: node.id().0,
                });
            }
            if self.index.get(node.label()) != Some(&node.id()) {
                return Err(InvariantViolation::UnindexedNode(format!(
                    "{:?}",
                    node.label()
                )));
            }
        }

        let mut pairs: HashMap<(NodeId, NodeId), usize> = HashMap::with_capacity(self.edges.len());
        for (i, edge) in self.edges.iter().enumerate() {
            let (Some(source), Some(destination)) = (
                self.nodes.get(edge.source().0),
                self.nodes.get(edge.destination().0),
            ) else {
                let node = if self.nodes.get(edge.source().0).is_none() {
                    edge.source().0
                } else {
                    edge.destination().0
                };
                return Err(InvariantViolation::DanglingEndpoint { edge: i, node });
            };

            if edge.label_count() == 0 {
                return Err(InvariantViolation::EmptyLabelSet(i));
            }

            if let Some(&first) = pairs.get(&(source.id(), destination.id())) {
                return Err(InvariantViolation::DuplicatePair {
                    first,
                    second: i,
                    source_label: format!("{:?}", source.label()),
                    destination_label: format!("{:?}", destination.label()),
                });
            }
            pairs.insert((source.id(), destination.id()), i);

            if source.edge_towards(destination.label()) != Some(EdgeId(i)) {
                return Err(InvariantViolation::UnregisteredOutgoing {
                    edge: i,
                    source_label: format!("{:?}", source.label()),
                });
            }
            if destination.edge_from(source.label()) != Some(EdgeId(i)) {
                return Err(InvariantViolation::UnregisteredIncoming {
                    edge: i,
                    destination_label: format!("{:?}", destination.label()),
                });
            }
        }

        for node in &self.nodes {
            for (neighbor, edge_id) in node.outgoing() {
                let consistent = self.edges.get(edge_id.0).is_some_and(|e| {
                    e.source() == node.id()
                        && self
                            .nodes
                            .get(e.destination().0)
                            .is_some_and(|d| d.label() == neighbor)
                });
                if !consistent {
                    return Err(inconsistent(node, neighbor, edge_id));
                }
            }
            for (neighbor, edge_id) in node.incoming() {
                let consistent = self.edges.get(edge_id.0).is_some_and(|e| {
                    e.destination() == node.id()
                        && self
                            .nodes
                            .get(e.source().0)
                            .is_some_and(|s| s.label() == neighbor)
                });
                if !consistent {
                    return Err(inconsistent(node, neighbor, edge_id));
                }
            }
        }

        Ok(())
    }
}

fn inconsistent<N: Debug + Eq + Hash + Clone>(
    node: &Node<N>,
    neighbor: &N,
    edge: EdgeId,
) -> InvariantViolation {
    InvariantViolation::InconsistentAdjacency {
        label: format!("{:?}", node.label()),
        neighbor: format!("{neighbor:?}"),
        edge: edge.0,
    }
}

impl<N, E> Default for Graph<N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Extend<(N, N, E)> for Graph<N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = (N, N, E)>>(&mut self, iter: I) {
        self.load_edges(iter);
    }
}

impl<N, E> FromIterator<(N, N, E)> for Graph<N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (N, N, E)>>(iter: I) -> Self {
        let mut graph = Self::new();
        graph.load_edges(iter);
        graph
    }
}

/// Read-only view of a node, borrowed from its graph.
pub struct NodeRef<'g, N, E> {
    graph: &'g Graph<N, E>,
    node: &'g Node<N>,
}

impl<N, E> Clone for NodeRef<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, E> Copy for NodeRef<'_, N, E> {}

impl<'g, N, E> NodeRef<'g, N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn label(&self) -> &'g N {
        self.node.label()
    }

    pub fn edge_towards(&self, label: &N) -> Option<EdgeRef<'g, N, E>> {
        self.graph.edge_ref(self.node.edge_towards(label)?)
    }

    pub fn edge_from(&self, label: &N) -> Option<EdgeRef<'g, N, E>> {
        self.graph.edge_ref(self.node.edge_from(label)?)
    }

    pub fn neighbor_labels_out(&self) -> HashSet<N> {
        self.node.neighbor_labels_out()
    }

    pub fn neighbor_labels_in(&self) -> HashSet<N> {
        self.node.neighbor_labels_in()
    }

    pub fn labels_towards(&self, label: &N) -> HashSet<E> {
        self.node.labels_towards(label, &self.graph.edges)
    }

    pub fn out_degree(&self) -> usize {
        self.node.out_degree()
    }

    pub fn in_degree(&self) -> usize {
        self.node.in_degree()
    }

    pub fn incoming_edge_weight(&self) -> usize {
        self.node.incoming_edge_weight(&self.graph.edges)
    }

    pub fn outgoing_edge_weight(&self) -> usize {
        self.node.outgoing_edge_weight(&self.graph.edges)
    }
}

impl<N, E> PartialEq for NodeRef<'_, N, E> {
    /// Identity comparison: two views are equal when they point at the same
    /// node of the same graph.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.node, other.node)
    }
}

impl<N: Debug, E> Debug for NodeRef<'_, N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("label", &self.node.label())
            .finish()
    }
}

/// Read-only view of an edge. Endpoints can be followed but not replaced.
pub struct EdgeRef<'g, N, E> {
    graph: &'g Graph<N, E>,
    id: EdgeId,
    edge: &'g Edge<E>,
}

impl<N, E> Clone for EdgeRef<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, E> Copy for EdgeRef<'_, N, E> {}

impl<'g, N, E> EdgeRef<'g, N, E>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> NodeRef<'g, N, E> {
        NodeRef {
            graph: self.graph,
            node: self.graph.node_at(self.edge.source()),
        }
    }

    pub fn destination(&self) -> NodeRef<'g, N, E> {
        NodeRef {
            graph: self.graph,
            node: self.graph.node_at(self.edge.destination()),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.edge.is_self_loop()
    }

    pub fn labels(&self) -> HashSet<E> {
        self.edge.labels()
    }

    pub fn has_label(&self, label: &E) -> bool {
        self.edge.has_label(label)
    }

    pub fn label_count(&self) -> usize {
        self.edge.label_count()
    }

    pub fn min_weight_label<F>(&self, weight: F) -> Option<(&'g E, f64)>
    where
        F: Fn(&E) -> f64,
    {
        self.edge.min_weight_label(weight)
    }
}

impl<N: Debug, E> Debug for EdgeRef<'_, N, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeRef")
            .field("source", self.graph.nodes[self.edge.source().0].label())
            .field(
                "destination",
                self.graph.nodes[self.edge.destination().0].label(),
            )
            .field("label_count", &self.edge.label_count())
            .finish()
    }
}
