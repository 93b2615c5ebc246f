use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hdxstat::aggregate::{fractional_uptake_table, summarize_replicates};
use hdxstat::ingest::Measurement;
use hdxstat::pipeline::{Pipeline, PipelineConfig};
use hdxstat::position::PositionEngine;
use hdxstat::runner::NoopSink;

const STATES: [&str; 3] = ["apo", "holo", "mutant"];
const EXPOSURES: [f64; 4] = [0.0, 10.0, 60.0, 300.0];

/// Build a cluster of overlapping peptides tiling a protein of `length` residues
fn create_cluster(length: u32, replicates: usize) -> Vec<Measurement> {
    let mut rows = Vec::new();
    let mut seed = 0usize;

    let mut start = 0;
    while start + 12 <= length {
        let end = start + 12;
        for (s, state) in STATES.iter().enumerate() {
            for exposure in EXPOSURES {
                let uptake = 8.0 * (1.0 - (-(0.01 + 0.005 * s as f64) * exposure).exp());
                for _ in 0..replicates {
                    seed += 1;
                    rows.push(Measurement {
                        protein: "BENCH".to_string(),
                        sequence: format!("PEP{start}"),
                        start,
                        end,
                        exposure,
                        state: state.to_string(),
                        charge: 1,
                        center: 1400.0 + uptake + (seed as f64 * 0.37).sin() * 0.05,
                        intensity: 1e5,
                        max_uptake: 10.0,
                        mhp: 1400.0,
                    });
                }
            }
        }
        start += 4;
    }

    rows
}

/// Benchmark a single position computation
fn bench_compute_position(c: &mut Criterion) {
    let rows = create_cluster(300, 3);
    let summaries = summarize_replicates(&rows, 2).unwrap();
    let peptides = fractional_uptake_table(&summaries).unwrap();
    let engine = PositionEngine::new();

    c.bench_function("compute_position", |b| {
        b.iter(|| engine.compute_position("BENCH", black_box(150), &peptides))
    });
}

/// Benchmark the full pipeline at increasing worker counts
fn bench_pipeline_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_workers");
    let rows = create_cluster(600, 3);
    group.throughput(Throughput::Elements(600));
    group.sample_size(20);

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            let pipeline = Pipeline::new(PipelineConfig::with_workers(workers));
            b.iter(|| pipeline.run(black_box(&rows), &mut NoopSink).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_position, bench_pipeline_workers);
criterion_main!(benches);
