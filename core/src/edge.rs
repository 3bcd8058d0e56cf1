use std::collections::HashSet;
use std::hash::Hash;

use crate::node::NodeId;

/// Arena index of an edge inside its owning [`Graph`](crate::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A directed connection between two nodes.
///
/// There is exactly one `Edge` per ordered (source, destination) pair in a
/// graph. Parallel connections are collapsed into its label set, which is
/// never empty and only grows. Endpoints are fixed at construction.
#[derive(Debug, Clone)]
pub(crate) struct Edge<E> {
    source: NodeId,
    destination: NodeId,
    labels: HashSet<E>,
}

impl<E> Edge<E> {
    pub(crate) fn source(&self) -> NodeId {
        self.source
    }

    pub(crate) fn destination(&self) -> NodeId {
        self.destination
    }

    pub(crate) fn is_self_loop(&self) -> bool {
        self.source == self.destination
    }

    pub(crate) fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl<E: Eq + Hash + Clone> Edge<E> {
    pub(crate) fn new(source: NodeId, label: E, destination: NodeId) -> Self {
        let mut labels = HashSet::with_capacity(1);
        labels.insert(label);
        Self {
            source,
            destination,
            labels,
        }
    }

    /// Add a label. Returns false if it was already present.
    pub(crate) fn add_label(&mut self, label: E) -> bool {
        self.labels.insert(label)
    }

    #[cfg(test)]
    pub(crate) fn clear_labels(&mut self) {
        self.labels.clear();
    }

    /// Copy of the label set.
    pub(crate) fn labels(&self) -> HashSet<E> {
        self.labels.clone()
    }

    pub(crate) fn has_label(&self, label: &E) -> bool {
        self.labels.contains(label)
    }

    /// The label with the smallest weight and that weight.
    ///
    /// This is the effective cost of the edge for traversal. Ties between
    /// labels of equal weight resolve to whichever the set yields first.
    /// Always `Some` for an edge owned by a graph.
    pub(crate) fn min_weight_label<F>(&self, weight: F) -> Option<(&E, f64)>
    where
        F: Fn(&E) -> f64,
    {
        self.labels
            .iter()
            .map(|label| (label, weight(label)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
