//! Community detection on the variable incidence graph.
//!
//! # Louvain Method
//!
//! The Louvain method greedily maximises the modularity
//!
//! ```text
//! Q = Σ_c [ L_c / m − γ · (d_c / 2m)² ]
//! ```
//!
//! where `m` is the total edge weight, `L_c` the weight of edges inside community `c`,
//! `d_c` the total degree of `c`, and `γ` the resolution.
//!
//! ## Algorithm Overview
//!
//! 1. Start with every node in its own community
//! 2. Visit nodes in a random order; move each node to the neighbouring community
//!    with the largest positive modularity gain; repeat until no node moves
//! 3. Collapse every community into a single node (intra-community edges become
//!    self-loops) and go back to step 2
//! 4. Stop once a level improves modularity by no more than `threshold`
//!
//! The node visiting order is the only source of randomness, so a fixed seed gives
//! a fixed partition.
//!
//! # References
//!
//! - V. D. Blondel, J.-L. Guillaume, R. Lambiotte, E. Lefebvre.
//!   "Fast unfolding of communities in large networks." J. Stat. Mech. 2008.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::graph::{Graph, IncidenceGraph};
use crate::partition::Partition;
use crate::types::Var;

/// Anything that can split the incidence graph into communities.
///
/// Implementations must be deterministic for a given seed and must place every
/// variable (isolated ones included) in exactly one group.
pub trait CommunityDetector {
    fn partition(&self, graph: &IncidenceGraph, seed: u64) -> Partition;
}

/// Seeded Louvain modularity maximisation.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution `γ`; values above 1 favour smaller communities.
    pub resolution: f64,
    /// Minimum modularity gain for another aggregation level.
    pub threshold: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            threshold: 1e-7,
        }
    }
}

impl CommunityDetector for Louvain {
    fn partition(&self, graph: &IncidenceGraph, seed: u64) -> Partition {
        let groups = self
            .communities(graph.graph(), seed)
            .into_iter()
            .map(|group| group.into_iter().map(|u| Var::new(u as u32 + 1)).collect())
            .collect();
        Partition::from_groups(groups)
    }
}

/// Result of one local-moving phase.
struct Level {
    /// Communities as sets of original nodes.
    partition: Vec<Vec<usize>>,
    /// Communities as sets of nodes of the current (aggregated) graph.
    inner: Vec<Vec<usize>>,
    improvement: bool,
}

impl Louvain {
    /// Returns communities as lists of node indices of `graph`.
    pub fn communities(&self, graph: &Graph, seed: u64) -> Vec<Vec<usize>> {
        let n = graph.num_nodes();
        let singletons: Vec<Vec<usize>> = (0..n).map(|u| vec![u]).collect();
        if graph.total_weight() == 0.0 {
            return singletons;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let m = graph.total_weight();
        let mut modularity = self.modularity(graph, &singletons);

        let mut current = graph.clone();
        let mut level = self.one_level(&current, m, &singletons, &mut rng);
        let mut levels = 1;

        loop {
            let new_modularity = self.modularity(&current, &level.inner);
            log::debug!(
                "Louvain level {}: {} communities, modularity {:.6}",
                levels,
                level.partition.len(),
                new_modularity
            );
            if new_modularity - modularity <= self.threshold {
                break;
            }
            modularity = new_modularity;
            current = aggregate(&current, &level.inner);
            let next = self.one_level(&current, m, &level.partition, &mut rng);
            if !next.improvement {
                break;
            }
            level = next;
            levels += 1;
        }

        level.partition
    }

    /// Local moving phase over `graph`, whose node `u` stands for the original nodes `members[u]`.
    fn one_level(&self, graph: &Graph, m: f64, members: &[Vec<usize>], rng: &mut ChaCha8Rng) -> Level {
        let n = graph.num_nodes();
        let mut node2com: Vec<usize> = (0..n).collect();
        let degrees: Vec<f64> = (0..n).map(|u| graph.degree(u)).collect();
        let mut stot = degrees.clone();

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        // Scratch space for per-community neighbour weights.
        let mut weights2com = vec![0.0; n];
        let mut is_touched = vec![false; n];
        let mut touched: Vec<usize> = Vec::new();

        let mut improvement = false;
        let mut moves = 1;
        while moves > 0 {
            moves = 0;
            for &u in &order {
                let old_com = node2com[u];
                let degree = degrees[u];

                for &(v, w) in graph.neighbors(u) {
                    if v == u {
                        continue;
                    }
                    let com = node2com[v];
                    if !is_touched[com] {
                        is_touched[com] = true;
                        touched.push(com);
                    }
                    weights2com[com] += w;
                }

                stot[old_com] -= degree;
                let remove_cost =
                    -weights2com[old_com] / m + self.resolution * (stot[old_com] * degree) / (2.0 * m * m);

                let mut best_gain = 0.0;
                let mut best_com = old_com;
                for &com in &touched {
                    let gain = remove_cost + weights2com[com] / m
                        - self.resolution * (stot[com] * degree) / (2.0 * m * m);
                    if gain > best_gain {
                        best_gain = gain;
                        best_com = com;
                    }
                }
                stot[best_com] += degree;

                for &com in &touched {
                    weights2com[com] = 0.0;
                    is_touched[com] = false;
                }
                touched.clear();

                if best_com != old_com {
                    node2com[u] = best_com;
                    improvement = true;
                    moves += 1;
                }
            }
        }

        let mut inner: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut partition: Vec<Vec<usize>> = vec![Vec::new(); n];
        for u in 0..n {
            inner[node2com[u]].push(u);
            partition[node2com[u]].extend_from_slice(&members[u]);
        }
        inner.retain(|c| !c.is_empty());
        partition.retain(|c| !c.is_empty());

        Level {
            partition,
            inner,
            improvement,
        }
    }

    fn modularity(&self, graph: &Graph, communities: &[Vec<usize>]) -> f64 {
        let m = graph.total_weight();
        if m == 0.0 {
            return 0.0;
        }
        let mut com_of = vec![usize::MAX; graph.num_nodes()];
        for (c, community) in communities.iter().enumerate() {
            for &u in community {
                com_of[u] = c;
            }
        }

        let mut q = 0.0;
        for (c, community) in communities.iter().enumerate() {
            let mut internal = 0.0;
            let mut degree_sum = 0.0;
            for &u in community {
                degree_sum += graph.degree(u);
                for &(v, w) in graph.neighbors(u) {
                    if v == u {
                        internal += w;
                    } else if com_of[v] == c {
                        // Seen from both endpoints.
                        internal += w / 2.0;
                    }
                }
            }
            q += internal / m - self.resolution * (degree_sum / (2.0 * m)).powi(2);
        }
        q
    }
}

/// Collapses every community of `inner` into one node.
fn aggregate(graph: &Graph, inner: &[Vec<usize>]) -> Graph {
    let mut com_of = vec![0; graph.num_nodes()];
    for (c, community) in inner.iter().enumerate() {
        for &u in community {
            com_of[u] = c;
        }
    }
    let edges = (0..graph.num_nodes()).flat_map(|u| {
        let com_of = &com_of;
        graph
            .neighbors(u)
            .iter()
            .filter(move |&&(v, _)| v >= u)
            .map(move |&(v, w)| (com_of[u], com_of[v], w))
    });
    Graph::from_edges(inner.len(), edges)
}
