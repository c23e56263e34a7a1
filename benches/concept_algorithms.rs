//! Criterion benchmarks for concept-graph algorithms
//!
//! Covers the per-query hot paths:
//! - Context extraction and path enumeration over growing graphs
//! - Dense product and Gauss-Jordan inversion
//! - Finite/infinite random walks, dense vs sparse

use concept_graph::{
    context_chain, finite_random_walk, finite_random_walk_sparse, infinite_random_walk,
    infinite_random_walk_sparse, paths, spreading_activation, ConceptGraph, DenseMatrix, NodeId,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// Generate scale-free concept graph (Barabási-Albert model approximation)
fn generate_scale_free_graph(num_nodes: usize, edges_per_node: usize) -> ConceptGraph {
    let labels = ["IsA", "PartOf", "UsedFor", "AtLocation"];
    let mut graph = ConceptGraph::new();
    let mut rng_state = 12345_u64; // Simple LCG for reproducibility

    for node in 0..num_nodes {
        graph.add_node(NodeId(node as u32));
        for _ in 0..edges_per_node {
            rng_state = rng_state.wrapping_mul(1103515245).wrapping_add(12345);
            let target = (rng_state % num_nodes as u64) as u32;
            let weight = ((rng_state >> 16) % 1000) as f32 / 4000.0;

            if target != node as u32 {
                let label = labels[(rng_state >> 8) as usize % labels.len()];
                graph.add_edge(NodeId(node as u32), NodeId(target), label, weight);
            }
        }
    }

    graph
}

/// Benchmark: chained-context BFS
fn bench_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("context_chain");

    for size in [100, 1000, 10000].iter() {
        let graph = generate_scale_free_graph(*size, 3);

        group.bench_with_input(BenchmarkId::new("radius_3", size), &graph, |b, graph| {
            b.iter(|| black_box(context_chain(black_box(graph), NodeId(0), 3)));
        });
    }

    group.finish();
}

/// Benchmark: bounded simple-path enumeration
fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("paths");

    for size in [50, 200, 1000].iter() {
        let graph = generate_scale_free_graph(*size, 3);
        let dst = NodeId((*size / 2) as u32);

        group.bench_with_input(BenchmarkId::new("max_len_3", size), &graph, |b, graph| {
            b.iter(|| black_box(paths(black_box(graph), NodeId(0), dst, 3)));
        });
    }

    group.finish();
}

/// Benchmark: spreading activation from a handful of seeds
fn bench_activation(c: &mut Criterion) {
    let mut group = c.benchmark_group("spreading_activation");
    let seeds = [NodeId(0), NodeId(1), NodeId(2)];

    for size in [100, 1000, 5000].iter() {
        let graph = generate_scale_free_graph(*size, 3);

        group.bench_with_input(BenchmarkId::new("three_seeds", size), &graph, |b, graph| {
            b.iter(|| black_box(spreading_activation(black_box(graph), &seeds, 0.8)));
        });
    }

    group.finish();
}

/// Benchmark: dense kernel product and inversion
fn bench_dense_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_kernel");

    for n in [16, 64, 128].iter() {
        let rows: Vec<Vec<f32>> = (0..*n)
            .map(|i| {
                (0..*n)
                    .map(|j| if i == j { *n as f32 } else { ((i * 31 + j * 17) % 7) as f32 / 7.0 })
                    .collect()
            })
            .collect();
        let matrix = DenseMatrix::from_rows(rows).unwrap();

        group.bench_with_input(BenchmarkId::new("product", n), &matrix, |b, m| {
            b.iter(|| black_box(m.product(black_box(m)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("invert", n), &matrix, |b, m| {
            b.iter(|| black_box(m.invert().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark: random walks, dense vs sparse
fn bench_random_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_walk");

    for size in [32, 128].iter() {
        let graph = generate_scale_free_graph(*size, 2);

        group.bench_with_input(BenchmarkId::new("finite_dense", size), &graph, |b, g| {
            b.iter(|| black_box(finite_random_walk(black_box(g), 0.8, 3).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("finite_sparse", size), &graph, |b, g| {
            b.iter(|| black_box(finite_random_walk_sparse(black_box(g), 0.8, 3).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("infinite_dense", size), &graph, |b, g| {
            b.iter(|| black_box(infinite_random_walk(black_box(g), 0.3)));
        });
        group.bench_with_input(BenchmarkId::new("infinite_sparse", size), &graph, |b, g| {
            b.iter(|| black_box(infinite_random_walk_sparse(black_box(g), 0.3)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_context,
    bench_paths,
    bench_activation,
    bench_dense_kernel,
    bench_random_walks
);
criterion_main!(benches);
