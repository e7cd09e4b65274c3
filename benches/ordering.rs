//! Benchmarks for ordering strategies and encoders.
//!
//! Run with:
//! ```bash
//! cargo bench --bench ordering
//! ```

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use knf_order::community::Louvain;
use knf_order::encode::{encode, Scheme};
use knf_order::formula::Formula;
use knf_order::order::{graph_order, occurrence_order, GraphConfig};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Random 3-clauses plus a few wide cardinality constraints, reproducible per seed.
fn random_formula(seed: u64, num_vars: u32, num_clauses: usize) -> Formula {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut formula = Formula::new(num_vars);
    let lit = |rng: &mut ChaCha8Rng| {
        let var = rng.random_range(1..=num_vars) as i32;
        if rng.random_bool(0.5) {
            var
        } else {
            -var
        }
    };
    for _ in 0..num_clauses {
        let clause: Vec<i32> = (0..3).map(|_| lit(&mut rng)).collect();
        formula.add_clause(clause);
    }
    for _ in 0..4 {
        let lits: Vec<i32> = (0..num_vars / 4).map(|_| lit(&mut rng)).collect();
        formula.add_constraint((num_vars / 8).max(2), lits);
    }
    formula.declared_clauses = formula.clauses.len() + formula.constraints.len();
    formula
}

fn bench_occurrence(c: &mut Criterion) {
    let mut group = c.benchmark_group("occurrence_order");
    for &num_vars in &[100u32, 1000, 10000] {
        let formula = random_formula(42, num_vars, num_vars as usize * 4);
        group.throughput(Throughput::Elements(num_vars as u64));
        group.bench_with_input(BenchmarkId::from_parameter(num_vars), &formula, |b, formula| {
            b.iter(|| occurrence_order(formula).unwrap())
        });
    }
    group.finish();
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_order");
    group.sample_size(10);
    let config = GraphConfig {
        max_iterations: 3,
        timeout: Duration::from_secs(60),
        ..Default::default()
    };
    for &num_vars in &[100u32, 1000] {
        let formula = random_formula(7, num_vars, num_vars as usize * 4);
        group.bench_with_input(BenchmarkId::from_parameter(num_vars), &formula, |b, formula| {
            b.iter(|| graph_order(formula, &config, &Louvain::default()).unwrap())
        });
    }
    group.finish();
}

fn bench_encoders(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let formula = random_formula(3, 400, 0);
    let constraint = &formula.constraints[0];
    for scheme in Scheme::ALL.into_iter().filter(|s| !s.is_passthrough()) {
        group.bench_with_input(BenchmarkId::from_parameter(scheme), constraint, |b, constraint| {
            b.iter(|| encode(constraint, 0, scheme, formula.num_vars).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_occurrence, bench_graph, bench_encoders);
criterion_main!(benches);
