//! multigraph-core: generic labeled directed multigraph.
//!
//! Nodes are identified by a label `N`. Between any ordered pair of nodes
//! there is at most one edge, which carries a set of labels `E`; adding a
//! second label for the same pair grows that set instead of creating a
//! parallel edge. Self-loops are allowed. The graph is insert-only.
//!
//! On top of the structure the crate provides single-source shortest
//! distances and shortest-path reconstruction, with edge costs derived on
//! demand from the labels by a caller-supplied weight function.

mod edge;
mod error;
mod graph;
mod node;
mod traversal;

pub use edge::EdgeId;
pub use error::InvariantViolation;
pub use graph::{EdgeRef, Graph, NodeRef};
pub use node::NodeId;
pub use traversal::{find_path, path_cost, shortest_distances, Direction, PathStep};
