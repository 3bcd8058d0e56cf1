use std::collections::VecDeque;
use std::time::Instant;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use multigraph_core::{find_path, path_cost, shortest_distances, Direction, Graph};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Node labels are plain integers; edge labels are relationship kinds.
type BenchGraph = Graph<u64, Rel>;

#[derive(Parser)]
#[command(
    name = "multigraph-bench",
    version,
    about = "Time construction and shortest-path queries on synthetic multigraphs"
)]
struct Cli {
    /// Topology to generate
    #[arg(value_enum, default_value = "all")]
    mode: Mode,

    /// Number of nodes per generated graph
    #[arg(long, default_value_t = 200_000)]
    nodes: u64,

    /// Offset added to every generator's RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path queries to run per topology
    #[arg(long, default_value_t = 5)]
    paths: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run all generators and benchmark each
    All,
    /// Fractal branching tree (deep paths)
    Lsystem,
    /// Preferential attachment via edge sampling (hub-and-spoke)
    Scalefree,
    /// Watts-Strogatz ring lattice + shortcuts
    Smallworld,
    /// Erdos-Renyi uniform random edges
    Random,
    /// Two dense cliques connected by a thin bridge
    Barbell,
    /// Diffusion-limited aggregation (organic branching)
    Dla,
}

type Generator = fn(u64, u64) -> BenchGraph;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.nodes < 16 {
        bail!("--nodes must be at least 16, got {}", cli.nodes);
    }

    let generators: Vec<(&str, Generator)> = match cli.mode {
        Mode::Lsystem => vec![("L-system tree", gen_lsystem)],
        Mode::Scalefree => vec![("Scale-free (edge sampling)", gen_scale_free)],
        Mode::Smallworld => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        Mode::Random => vec![("Erdos-Renyi random", gen_random)],
        Mode::Barbell => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        Mode::Dla => vec![("DLA (organic branching)", gen_dla)],
        Mode::All => vec![
            ("L-system tree", gen_lsystem as Generator),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (clique-bridge-clique)", gen_barbell),
            ("DLA (organic branching)", gen_dla),
        ],
    };

    println!("multigraph-bench");
    println!("================");
    println!();

    for (name, generator) in generators {
        run_benchmark(name, generator, &cli);
    }
    Ok(())
}

fn run_benchmark(name: &str, generator: Generator, cli: &Cli) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", cli.nodes);

    let t = Instant::now();
    let graph = generator(cli.nodes, cli.seed);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s — {} nodes, {} edges, {} labels",
        gen_time.as_secs_f64(),
        graph.node_count(),
        graph.edge_count(),
        graph.label_count()
    );
    info!(topology = name, nodes = graph.node_count(), "graph generated");

    // Distances from node 0 in both directions
    println!();
    println!("{:>10} {:>12} {:>12} {:>10}", "direction", "reached", "max dist", "time");
    println!("{:->10} {:->12} {:->12} {:->10}", "", "", "", "");
    for (label, direction) in [("out", Direction::Outgoing), ("in", Direction::Incoming)] {
        let t = Instant::now();
        let distances = shortest_distances(&graph, &0, direction, Rel::cost);
        let elapsed = t.elapsed();
        let max = distances.values().copied().fold(0.0f64, f64::max);
        println!(
            "{:>10} {:>12} {:>12.1} {:>8.1}ms",
            label,
            distances.len(),
            max,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    // Path queries from node 0 towards nodes spread over the id range
    println!();
    let count = graph.node_count() as u64;
    for i in 1..=cli.paths as u64 {
        let target = (count - 1) * i / cli.paths as u64;
        let t = Instant::now();
        let path = find_path(&graph, &0, &target, Rel::cost);
        let elapsed = t.elapsed();
        match path {
            Some(p) => println!(
                "Path 0 → {}: {} hops, cost {:.1} in {:.1}ms",
                target,
                p.len(),
                path_cost(&p, Rel::cost),
                elapsed.as_secs_f64() * 1000.0
            ),
            None => println!(
                "Path 0 → {}: no path ({:.1}ms)",
                target,
                elapsed.as_secs_f64() * 1000.0
            ),
        }
    }

    if let Err(e) = graph.check_invariants() {
        println!("invariant check failed: {e}");
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators — all O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    fn rel(&mut self) -> Rel {
        Rel::RANDOM[self.next(Rel::RANDOM.len() as u64) as usize]
    }
}

/// Relationship kinds used as edge labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Rel {
    Implies,
    Supports,
    Contradicts,
    RelatedTo,
    Requires,
    Bridges,
    Next,
}

impl Rel {
    /// Kinds drawn at random by the generators. `Bridges` and `Next` are
    /// only placed explicitly by the barbell topology.
    const RANDOM: [Rel; 5] = [
        Rel::Implies,
        Rel::Supports,
        Rel::Contradicts,
        Rel::RelatedTo,
        Rel::Requires,
    ];

    /// Traversal cost of one hop along this kind.
    fn cost(&self) -> f64 {
        match self {
            Rel::Implies | Rel::Bridges | Rel::Next => 1.0,
            Rel::Requires => 1.5,
            Rel::Supports => 2.0,
            Rel::RelatedTo => 4.0,
            Rel::Contradicts => 8.0,
        }
    }
}

fn with_nodes(node_count: u64, edge_hint: u64) -> BenchGraph {
    let mut graph = Graph::with_capacity(node_count as usize, edge_hint as usize);
    for i in 0..node_count {
        graph.add_node(i);
    }
    graph
}

/// L-system fractal tree: deep branching with self-similar structure.
///
/// Each node spawns `branching_factor` children. Produces deep paths (log depth)
/// with exponential width. Back edges to the parent make the tree walkable in
/// both directions.
fn gen_lsystem(node_count: u64, seed: u64) -> BenchGraph {
    let mut graph = with_nodes(node_count, node_count * 2);
    let mut rng = FastRng::new(42 + seed);

    let branching = 3u64; // each node gets 3 children
    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                graph.add_edge(&parent, &child, rng.rel());
                graph.add_edge(&child, &parent, rng.rel());
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    graph
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge and connecting
/// to one of its endpoints. Nodes with more edges are more likely to be picked.
/// Repeated picks of the same pair collapse into extra labels.
fn gen_scale_free(node_count: u64, seed: u64) -> BenchGraph {
    let edges_per_node = 10u64;
    let mut graph = with_nodes(node_count, node_count * edges_per_node);
    let mut rng = FastRng::new(12345 + seed);

    let mut edge_endpoints: Vec<u64> =
        Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    // Seed: small clique, both directions
    let clique = 5u64;
    for i in 0..clique {
        for j in (i + 1)..clique {
            graph.add_edge(&i, &j, rng.rel());
            graph.add_edge(&j, &i, rng.rel());
            edge_endpoints.push(i);
            edge_endpoints.push(j);
        }
    }

    // Grow: each new node attaches to `edges_per_node` existing nodes
    for new_node in clique..node_count {
        let attach = edges_per_node.min(new_node);
        for _ in 0..attach {
            let idx = rng.next(edge_endpoints.len() as u64) as usize;
            let target = edge_endpoints[idx];
            if target != new_node {
                // alternate direction so both hubs and leaves are reachable
                if rng.next(2) == 0 {
                    graph.add_edge(&new_node, &target, rng.rel());
                } else {
                    graph.add_edge(&target, &new_node, rng.rel());
                }
                edge_endpoints.push(new_node);
                edge_endpoints.push(target);
            }
        }
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Start with each node connected to K nearest neighbors on a ring,
/// then rewire each edge with probability p. Produces high clustering
/// with short path lengths.
fn gen_small_world(node_count: u64, seed: u64) -> BenchGraph {
    let k = 10u64; // neighbors on each side
    let p = 0.05f64; // rewire probability
    let mut graph = with_nodes(node_count, node_count * k);
    let mut rng = FastRng::new(67890 + seed);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let rel = rng.rel();

            if rng.next_f64() < p {
                let rewired = rng.next(node_count);
                if rewired != i {
                    graph.add_edge(&i, &rewired, rel);
                } else {
                    graph.add_edge(&i, &neighbor, rel);
                }
            } else {
                graph.add_edge(&i, &neighbor, rel);
            }
        }
    }

    graph
}

/// Erdos-Renyi: uniform random edges.
///
/// We target ~10 edges per node on average. Baseline topology with no
/// structure. Self-loops are kept; they never shorten a path.
fn gen_random(node_count: u64, seed: u64) -> BenchGraph {
    let target_edges = node_count * 10;
    let mut graph = with_nodes(node_count, target_edges);
    let mut rng = FastRng::new(54321 + seed);

    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        graph.add_edge(&from, &to, rng.rel());
    }

    graph
}

/// Barbell: two dense cliques connected by a single thin bridge.
///
/// Worst case for "find path through bottleneck." Each clique has n/2 nodes
/// densely connected; they're joined by a chain of ~10 bridge nodes.
fn gen_barbell(node_count: u64, seed: u64) -> BenchGraph {
    let bridge_len = 10u64;
    let clique_size = (node_count - bridge_len) / 2;
    let mut graph = with_nodes(clique_size * 2 + bridge_len, clique_size * 40 + bridge_len);
    let mut rng = FastRng::new(99999 + seed);

    // Clique A: nodes 0..clique_size, each connected to ~20 random others in the clique
    for i in 0..clique_size {
        for _ in 0..20u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                graph.add_edge(&i, &target, rng.rel());
            }
        }
    }

    // Bridge: chain from last node of A to first node of B
    let bridge_start = clique_size;
    graph.add_edge(&(clique_size - 1), &bridge_start, Rel::Bridges);
    for id in (bridge_start + 1)..(bridge_start + bridge_len) {
        graph.add_edge(&(id - 1), &id, Rel::Next);
    }

    // Clique B: nodes after bridge
    let b_start = bridge_start + bridge_len;
    graph.add_edge(&(b_start - 1), &b_start, Rel::Bridges);

    for i in 0..clique_size {
        for _ in 0..20u64.min(clique_size - 1) {
            let target = rng.next(clique_size);
            if target != i {
                graph.add_edge(&(b_start + i), &(b_start + target), rng.rel());
            }
        }
    }

    graph
}

/// DLA (Diffusion-Limited Aggregation): organic branching growth.
///
/// Each new node attaches to a random node on the growth surface, with
/// occasional long-range jumps. Edges point from the surface outwards so
/// node 0 reaches everything.
fn gen_dla(node_count: u64, seed: u64) -> BenchGraph {
    let mut graph = with_nodes(node_count, node_count * 2);
    let mut rng = FastRng::new(77777 + seed);

    // Recent additions that new particles attach to.
    let mut surface: VecDeque<u64> = VecDeque::with_capacity(10001);
    surface.push_back(0);
    let surface_max = 10000usize;

    for new_node in 1..node_count {
        let attach_to = surface[rng.next(surface.len() as u64) as usize];
        graph.add_edge(&attach_to, &new_node, rng.rel());

        // 10% chance of a second connection (creates loops / shortcuts)
        if rng.next(10) == 0 && new_node > 1 {
            let other = rng.next(new_node);
            if other != attach_to {
                graph.add_edge(&new_node, &other, rng.rel());
            }
        }

        surface.push_back(new_node);
        if surface.len() > surface_max {
            surface.pop_front();
        }
    }

    graph
}
