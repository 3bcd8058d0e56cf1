use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use tracing::{debug, trace, warn};

use crate::edge::Edge;
use crate::graph::Graph;
use crate::node::NodeId;

/// Which adjacency a traversal follows.
///
/// `Outgoing` walks edges from source to destination, `Incoming` walks them
/// backwards, which yields distances *to* the root instead of from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One hop of a reconstructed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathStep<N, E> {
    pub source: N,
    pub destination: N,
    /// The label of minimal weight on the edge `source -> destination`.
    pub label: E,
}

/// Heap entry. Ordered by distance reversed so `BinaryHeap` pops the minimum.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f64,
    node: NodeId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Final distance of a node and the order in which it was settled.
#[derive(Debug, Clone, Copy)]
struct Settled {
    distance: f64,
    rank: usize,
}

/// Iterate the neighbors of `node` in `direction`, paired with the connecting edge.
fn iter_neighbors<'a, N, E>(
    graph: &'a Graph<N, E>,
    node: NodeId,
    direction: Direction,
) -> impl Iterator<Item = (NodeId, &'a Edge<E>)> + 'a
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
{
    let (use_out, use_inc) = match direction {
        Direction::Outgoing => (true, false),
        Direction::Incoming => (false, true),
    };
    let node = graph.node_at(node);

    let out_iter = node
        .outgoing()
        .filter(move |_| use_out)
        .map(move |(_, id)| {
            let edge = graph.edge_at(id);
            (edge.destination(), edge)
        });

    let in_iter = node
        .incoming()
        .filter(move |_| use_inc)
        .map(move |(_, id)| {
            let edge = graph.edge_at(id);
            (edge.source(), edge)
        });

    out_iter.chain(in_iter)
}

/// Lazy-deletion Dijkstra over arena indices.
///
/// Improved entries are pushed again rather than decreased; stale ones are
/// dropped when popped because their node is already settled.
fn settle<N, E, F>(
    graph: &Graph<N, E>,
    head: NodeId,
    direction: Direction,
    weight: &F,
) -> HashMap<NodeId, Settled>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
    F: Fn(&E) -> f64,
{
    let mut settled: HashMap<NodeId, Settled> = HashMap::new();
    let mut heap = BinaryHeap::new();
    heap.push(Candidate {
        distance: 0.0,
        node: head,
    });

    while let Some(Candidate { distance, node }) = heap.pop() {
        if settled.contains_key(&node) {
            continue;
        }
        let rank = settled.len();
        settled.insert(node, Settled { distance, rank });
        trace!(node = node.0, distance, rank, "settled");

        for (next, edge) in iter_neighbors(graph, node, direction) {
            if settled.contains_key(&next) {
                continue;
            }
            if let Some((_, w)) = edge.min_weight_label(weight) {
                heap.push(Candidate {
                    distance: distance + w,
                    node: next,
                });
            }
        }
    }

    settled
}

/// Shortest distance from `head` to every node reachable from it.
///
/// With [`Direction::Incoming`] the edges are followed backwards, giving the
/// distance from every node that can reach `head` to `head`. The cost of an
/// edge is the smallest `weight` over its labels. Weights must be
/// non-negative. An unknown `head` yields `{head: 0.0}`.
pub fn shortest_distances<N, E, F>(
    graph: &Graph<N, E>,
    head: &N,
    direction: Direction,
    weight: F,
) -> HashMap<N, f64>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
    F: Fn(&E) -> f64,
{
    let Some(head_id) = graph.node_id(head) else {
        return HashMap::from([(head.clone(), 0.0)]);
    };

    let settled = settle(graph, head_id, direction, &weight);
    debug!(reached = settled.len(), ?direction, "shortest distances computed");

    settled
        .into_iter()
        .map(|(id, s)| (graph.node_at(id).label().clone(), s.distance))
        .collect()
}

/// One shortest path from `start` to `target`, or `None` if `target` is not
/// reachable.
///
/// Distances to `target` are computed first by walking edges backwards; the
/// path is then built forward by always stepping to a neighbor whose
/// distance plus edge cost equals the current distance. Only neighbors that
/// were settled earlier than the current node qualify, which rules out
/// cycling through zero-weight edges. Among equal candidates the one seen
/// last wins. `start == target` gives an empty path.
pub fn find_path<N, E, F>(
    graph: &Graph<N, E>,
    start: &N,
    target: &N,
    weight: F,
) -> Option<Vec<PathStep<N, E>>>
where
    N: Eq + Hash + Clone,
    E: Eq + Hash + Clone,
    F: Fn(&E) -> f64,
{
    let Some(target_id) = graph.node_id(target) else {
        // an unknown target only reaches itself
        return (start == target).then(Vec::new);
    };

    let to_target = settle(graph, target_id, Direction::Incoming, &weight);
    let mut current = graph.node_id(start)?;
    let mut remaining = *to_target.get(&current)?;
    let total = remaining.distance;
    let mut path = Vec::new();

    while current != target_id {
        let mut best: Option<(NodeId, &E, Settled)> = None;
        let mut best_cost = remaining.distance;

        for (next, edge) in iter_neighbors(graph, current, Direction::Outgoing) {
            let Some(&next_settled) = to_target.get(&next) else {
                continue;
            };
            if next_settled.rank >= remaining.rank {
                continue;
            }
            let Some((label, w)) = edge.min_weight_label(&weight) else {
                continue;
            };
            let candidate = next_settled.distance + w;
            if candidate <= best_cost {
                best_cost = candidate;
                best = Some((next, label, next_settled));
            }
        }

        let Some((next, label, next_settled)) = best else {
            // Only reachable when `weight` answers differently between calls.
            warn!(
                node = current.0,
                distance = remaining.distance,
                "no successor matches the distance to target"
            );
            return None;
        };

        path.push(PathStep {
            source: graph.node_at(current).label().clone(),
            destination: graph.node_at(next).label().clone(),
            label: label.clone(),
        });
        current = next;
        remaining = next_settled;
    }

    debug!(steps = path.len(), cost = total, "path reconstructed");
    Some(path)
}

/// Sum of the weights of the labels a path reports.
pub fn path_cost<N, E, F>(path: &[PathStep<N, E>], weight: F) -> f64
where
    F: Fn(&E) -> f64,
{
    path.iter().map(|step| weight(&step.label)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn parse(label: &&str) -> f64 {
        label.parse().unwrap()
    }

    type Labeled = Graph<&'static str, &'static str>;

    fn graph(nodes: &[&'static str], edges: &[(&'static str, &'static str, &'static str)]) -> Labeled {
        let mut g = Graph::new();
        for &n in nodes {
            g.add_node(n);
        }
        for &(from, to, label) in edges {
            assert!(g.add_edge(&from, &to, label));
        }
        g
    }

    /// A->D (10, 9), A->B (10, 9), B->D (0), A->C (5), C->D (1)
    fn diamond() -> Labeled {
        graph(
            &["A", "B", "C", "D"],
            &[
                ("A", "D", "10.0"),
                ("A", "D", "9.0"),
                ("A", "B", "10.0"),
                ("A", "B", "9.0"),
                ("B", "D", "0.0"),
                ("A", "C", "5.0"),
                ("C", "D", "1.0"),
            ],
        )
    }

    fn step(source: &'static str, destination: &'static str, label: &'static str) -> PathStep<&'static str, &'static str> {
        PathStep {
            source,
            destination,
            label,
        }
    }

    // --- distance tests ---

    #[test]
    fn test_distances_forward() {
        let g = diamond();
        let d = shortest_distances(&g, &"A", Direction::Outgoing, parse);
        assert_eq!(
            d,
            HashMap::from([("A", 0.0), ("B", 9.0), ("C", 5.0), ("D", 6.0)])
        );
    }

    #[test]
    fn test_distances_reverse() {
        let g = diamond();
        let d = shortest_distances(&g, &"D", Direction::Incoming, parse);
        assert_eq!(
            d,
            HashMap::from([("A", 6.0), ("B", 0.0), ("C", 1.0), ("D", 0.0)])
        );
    }

    #[test]
    fn test_distances_only_reachable_nodes() {
        let g = diamond();
        let d = shortest_distances(&g, &"C", Direction::Outgoing, parse);
        assert_eq!(d, HashMap::from([("C", 0.0), ("D", 1.0)]));

        let d = shortest_distances(&g, &"A", Direction::Incoming, parse);
        assert_eq!(d, HashMap::from([("A", 0.0)]));
    }

    #[test]
    fn test_distances_unknown_head() {
        let g = diamond();
        let d = shortest_distances(&g, &"Z", Direction::Outgoing, parse);
        assert_eq!(d, HashMap::from([("Z", 0.0)]));
    }

    #[test]
    fn test_distances_use_cheapest_label() {
        let g = graph(&["A", "B"], &[("A", "B", "5.0"), ("A", "B", "1.5"), ("A", "B", "3.0")]);
        let d = shortest_distances(&g, &"A", Direction::Outgoing, parse);
        assert_eq!(d[&"B"], 1.5);
    }

    #[test]
    fn test_distances_ignore_self_loop() {
        let g = graph(&["A", "B"], &[("A", "A", "0.0"), ("A", "B", "2.0"), ("B", "B", "1.0")]);
        let d = shortest_distances(&g, &"A", Direction::Outgoing, parse);
        assert_eq!(d, HashMap::from([("A", 0.0), ("B", 2.0)]));
    }

    #[test]
    fn test_distances_with_cycle() {
        let g = graph(
            &["A", "B", "C"],
            &[("A", "B", "1.0"), ("B", "C", "1.0"), ("C", "A", "1.0")],
        );
        let d = shortest_distances(&g, &"B", Direction::Outgoing, parse);
        assert_eq!(d, HashMap::from([("A", 2.0), ("B", 0.0), ("C", 1.0)]));
    }

    #[test]
    fn test_distances_custom_weight_function() {
        let g: Graph<u32, &str> = [(1, 2, "IMPLIES"), (2, 3, "SUPPORTS"), (1, 3, "CONTRADICTS")]
            .into_iter()
            .collect();
        let d = shortest_distances(&g, &1, Direction::Outgoing, |l: &&str| l.len() as f64);
        assert_eq!(d[&2], 7.0);
        assert_eq!(d[&3], 11.0);
        let d = shortest_distances(&g, &1, Direction::Outgoing, |_: &&str| 1.0);
        assert_eq!(d[&3], 1.0);
    }

    // --- path tests ---

    #[test]
    fn test_find_path() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[
                ("A", "D", "10.0"),
                ("A", "D", "9.5"),
                ("A", "B", "10.0"),
                ("A", "B", "9.0"),
                ("B", "D", "0.0"),
                ("A", "C", "5.0"),
                ("C", "D", "6.0"),
            ],
        );
        let path = find_path(&g, &"A", &"D", parse).unwrap();
        assert_eq!(path, vec![step("A", "B", "9.0"), step("B", "D", "0.0")]);
        assert_eq!(path_cost(&path, parse), 9.0);
    }

    #[test]
    fn test_find_path_diamond_cost_matches_distance() {
        let g = diamond();
        let path = find_path(&g, &"A", &"D", parse).unwrap();
        assert_eq!(path, vec![step("A", "C", "5.0"), step("C", "D", "1.0")]);
    }

    #[test]
    fn test_find_path_unreachable() {
        let g = graph(&["A", "B", "C"], &[("A", "B", "1.0"), ("C", "B", "1.0")]);
        assert_eq!(find_path(&g, &"A", &"C", parse), None);
        // edges are directed
        assert_eq!(find_path(&g, &"B", &"A", parse), None);
    }

    #[test]
    fn test_find_path_unknown_nodes() {
        let g = diamond();
        assert_eq!(find_path(&g, &"Z", &"D", parse), None);
        assert_eq!(find_path(&g, &"A", &"Z", parse), None);
        assert_eq!(find_path(&g, &"Z", &"Z", parse), Some(vec![]));
    }

    #[test]
    fn test_find_path_to_self() {
        let g = graph(&["A", "B"], &[("A", "A", "0.0"), ("A", "B", "1.0")]);
        assert_eq!(find_path(&g, &"A", &"A", parse), Some(vec![]));
    }

    #[test]
    fn test_find_path_zero_weight_cycle_terminates() {
        let g = graph(
            &["A", "B", "T"],
            &[("A", "B", "0.0"), ("B", "A", "0.0"), ("A", "T", "1.0"), ("B", "B", "0.0")],
        );
        let from_b = find_path(&g, &"B", &"T", parse).unwrap();
        assert_eq!(path_cost(&from_b, parse), 1.0);
        assert_eq!(from_b.last().unwrap().destination, "T");

        let from_a = find_path(&g, &"A", &"T", parse).unwrap();
        assert_eq!(from_a, vec![step("A", "T", "1.0")]);
    }

    #[test]
    fn test_find_path_reports_cheapest_label() {
        let g = graph(
            &["A", "B", "C"],
            &[("A", "B", "4.0"), ("A", "B", "2.0"), ("B", "C", "7.0"), ("B", "C", "3.0")],
        );
        let path = find_path(&g, &"A", &"C", parse).unwrap();
        assert_eq!(path, vec![step("A", "B", "2.0"), step("B", "C", "3.0")]);
    }

    #[test]
    fn test_find_path_equal_cost_routes() {
        let g = graph(
            &["S", "L", "R", "T"],
            &[("S", "L", "1.0"), ("S", "R", "1.0"), ("L", "T", "1.0"), ("R", "T", "1.0")],
        );
        let path = find_path(&g, &"S", &"T", parse).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path_cost(&path, parse), 2.0);
        assert_eq!(path[0].destination, path[1].source);
    }

    #[test]
    fn test_candidate_heap_pops_minimum() {
        let mut heap = BinaryHeap::new();
        for (i, d) in [3.0, 0.5, 7.0, 0.5, 2.0].into_iter().enumerate() {
            heap.push(Candidate {
                distance: d,
                node: NodeId(i),
            });
        }
        let order: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|c| c.distance)).collect();
        assert_eq!(order, vec![0.5, 0.5, 2.0, 3.0, 7.0]);
    }

    // --- properties ---

    fn random_graph() -> impl Strategy<Value = Graph<u8, u8>> {
        (
            1u8..10,
            prop::collection::vec((0u8..10, 0u8..10, 0u8..20), 0..40),
        )
            .prop_map(|(n, edges)| {
                let mut g = Graph::new();
                for i in 0..n {
                    g.add_node(i);
                }
                for (a, b, w) in edges {
                    g.add_edge(&a, &b, w);
                }
                g
            })
    }

    fn cost(label: &u8) -> f64 {
        f64::from(*label)
    }

    fn min_cost(g: &Graph<u8, u8>, a: u8, b: u8) -> f64 {
        g.labels_between(&a, &b).iter().map(cost).fold(f64::INFINITY, f64::min)
    }

    proptest! {
        #[test]
        fn prop_distances_are_tight(g in random_graph(), head in 0u8..10) {
            let d = shortest_distances(&g, &head, Direction::Outgoing, cost);
            prop_assert_eq!(d.get(&head).copied(), Some(0.0));

            for e in g.edges() {
                let (u, v) = (*e.source().label(), *e.destination().label());
                if let Some(du) = d.get(&u) {
                    let dv = d.get(&v).copied();
                    prop_assert!(dv.is_some());
                    prop_assert!(dv.unwrap() <= du + min_cost(&g, u, v));
                }
            }

            for (&v, &dv) in &d {
                if v == head {
                    continue;
                }
                let tight = g
                    .neighbors_in(&v)
                    .into_iter()
                    .filter_map(|u| d.get(&u).map(|du| du + min_cost(&g, u, v)))
                    .any(|c| c == dv);
                prop_assert!(tight);
            }
        }

        #[test]
        fn prop_reverse_distances_match_forward(g in random_graph(), target in 0u8..10) {
            let reverse = shortest_distances(&g, &target, Direction::Incoming, cost);
            for (source, dist) in &reverse {
                let forward = shortest_distances(&g, source, Direction::Outgoing, cost);
                prop_assert_eq!(forward.get(&target).copied(), Some(*dist));
            }
        }

        #[test]
        fn prop_find_path_is_shortest(g in random_graph(), start in 0u8..10, target in 0u8..10) {
            let forward = shortest_distances(&g, &start, Direction::Outgoing, cost);
            let path = find_path(&g, &start, &target, cost);

            match (forward.get(&target), path) {
                (Some(&expected), Some(path)) => {
                    prop_assert_eq!(path_cost(&path, cost), expected);
                    let mut at = start;
                    let mut visited = HashSet::from([start]);
                    for s in &path {
                        prop_assert_eq!(s.source, at);
                        prop_assert!(g.labels_between(&s.source, &s.destination).contains(&s.label));
                        prop_assert_eq!(cost(&s.label), min_cost(&g, s.source, s.destination));
                        prop_assert!(visited.insert(s.destination));
                        at = s.destination;
                    }
                    prop_assert_eq!(at, target);
                }
                (None, None) => {}
                (expected, path) => {
                    prop_assert!(false, "distance {:?} but path {:?}", expected, path);
                }
            }
        }
    }
}
