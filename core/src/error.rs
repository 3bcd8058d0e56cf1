use thiserror::Error;

/// A broken representation invariant, reported by
/// [`Graph::check_invariants`](crate::Graph::check_invariants).
///
/// Labels are rendered with `Debug` so the error does not need to be generic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[error("node index key {key} maps to node labeled {label}")]
    KeyLabelMismatch { key: String, label: String },
    #[error("node {label} is stored at slot {slot} but carries id {id}")]
    MisplacedNode {
        label: String,
        slot: usize,
        id: usize,
    },
    #[error("node {0} is missing from the label index")]
    UnindexedNode(String),
    #[error("edge {edge} references node slot {node} which does not exist")]
    DanglingEndpoint { edge: usize, node: usize },
    #[error("edge {0} has an empty label set")]
    EmptyLabelSet(usize),
    #[error("edges {first} and {second} both connect {source_label} -> {destination_label}")]
    DuplicatePair {
        first: usize,
        second: usize,
        source_label: String,
        destination_label: String,
    },
    #[error("edge {edge} is not registered as outgoing of {source_label}")]
    UnregisteredOutgoing { edge: usize, source_label: String },
    #[error("edge {edge} is not registered as incoming of {destination_label}")]
    UnregisteredIncoming {
        edge: usize,
        destination_label: String,
    },
    #[error("node {label} lists edge {edge} under neighbor {neighbor}, which does not match its endpoints")]
    InconsistentAdjacency {
        label: String,
        neighbor: String,
        edge: usize,
    },
}
