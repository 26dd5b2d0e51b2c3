//! Criterion benchmarks for the branch-and-bound solver.
//!
//! Instances are generated on a deterministic spiral so runs are comparable
//! across machines; each instance carries a handful of recharge points and
//! one obstacle.

#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use skyroute_core::test_support::InstanceLayout;
use skyroute_core::{Instance, SolveRequest, Solver};
use skyroute_solver_bnb::BranchAndBoundSolver;

#[expect(
    clippy::cast_precision_loss,
    reason = "benchmark sizes are tiny"
)]
fn spiral(count: usize, scale: f64) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * 2.4;
            let radius = scale * (1.0 + i as f64).sqrt();
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}

fn instance(deliveries: usize) -> Instance {
    InstanceLayout {
        deliveries: spiral(deliveries, 3.0),
        recharges: spiral(3, 5.0),
        zone: Some((2.5, 2.5, 4.5, 4.5)),
    }
    .build()
}

fn bench_solve(c: &mut Criterion) {
    let solver = BranchAndBoundSolver::new();
    let request = SolveRequest::new(Duration::from_secs(5));
    let mut group = c.benchmark_group("branch_and_bound");
    for deliveries in [4_usize, 6, 8] {
        let problem = instance(deliveries);
        group.bench_with_input(
            BenchmarkId::from_parameter(deliveries),
            &problem,
            |b, input| b.iter(|| solver.solve(input, &request)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
