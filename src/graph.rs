//! Variable incidence graph (VIG) of the standard clauses.
//!
//! Nodes are the variables `1..=num_vars` (isolated ones included); two variables are
//! adjacent whenever they co-occur in a standard clause. Cardinality constraints do not
//! contribute edges.

use std::collections::BTreeMap;

use crate::formula::Formula;
use crate::types::Var;

/// Undirected weighted graph over node indices `0..num_nodes`.
///
/// A self-loop contributes twice its weight to the node degree.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    adjacency: Vec<Vec<(usize, f64)>>,
    total_weight: f64,
}

impl Graph {
    /// Builds a graph from an edge list; parallel edges are summed.
    pub fn from_edges(num_nodes: usize, edges: impl IntoIterator<Item = (usize, usize, f64)>) -> Self {
        let mut maps: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); num_nodes];
        let mut total_weight = 0.0;
        for (u, v, w) in edges {
            *maps[u].entry(v).or_insert(0.0) += w;
            if u != v {
                *maps[v].entry(u).or_insert(0.0) += w;
            }
            total_weight += w;
        }
        let adjacency = maps.into_iter().map(|m| m.into_iter().collect()).collect();
        Self {
            adjacency,
            total_weight,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Sum of all edge weights (each undirected edge counted once).
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Neighbours of `node` with edge weights, sorted by neighbour index.
    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.adjacency[node]
    }

    /// Weighted degree of `node`.
    pub fn degree(&self, node: usize) -> f64 {
        self.adjacency[node]
            .iter()
            .map(|&(v, w)| if v == node { 2.0 * w } else { w })
            .sum()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(u, adj)| adj.iter().filter(|&&(v, _)| v >= u).count())
            .sum()
    }
}

/// The variable incidence graph of a formula. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct IncidenceGraph {
    graph: Graph,
}

impl IncidenceGraph {
    /// Builds the VIG.
    ///
    /// With `multi_edges`, every co-occurrence adds weight 1 to the edge; otherwise each
    /// edge has weight 1 no matter how many clauses share the pair.
    pub fn new(formula: &Formula, multi_edges: bool) -> Self {
        let mut edges: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for clause in &formula.clauses {
            let vars: Vec<usize> = clause.iter().map(|lit| lit.var().index()).collect();
            for i in 0..vars.len() {
                for j in (i + 1)..vars.len() {
                    let key = (vars[i].min(vars[j]), vars[i].max(vars[j]));
                    let weight = edges.entry(key).or_insert(0.0);
                    if multi_edges {
                        *weight += 1.0;
                    } else {
                        *weight = 1.0;
                    }
                }
            }
        }
        let graph = Graph::from_edges(
            formula.num_vars as usize,
            edges.into_iter().map(|((u, v), w)| (u, v, w)),
        );
        log::debug!(
            "Built incidence graph with {} nodes and {} edges",
            graph.num_nodes(),
            graph.num_edges()
        );
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn num_vars(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Whether `a` and `b` share at least one clause.
    pub fn adjacent(&self, a: Var, b: Var) -> bool {
        self.graph
            .neighbors(a.index())
            .binary_search_by_key(&b.index(), |&(v, _)| v)
            .is_ok()
    }
}
