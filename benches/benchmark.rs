use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lh2_calibration::collector::PointCollector;
use lh2_calibration::frame::RawSweepSample;
use lh2_calibration::projection::project;
use lh2_calibration::solver::HomographySolver;
use lh2_calibration::types::ReferenceCorner;

fn bench_project(c: &mut Criterion) {
    c.bench_function("project", |b| {
        b.iter(|| project(black_box(100_000), black_box(110_000), black_box(2)))
    });
}

fn bench_solve(c: &mut Criterion) {
    let counts = [
        (100_000, 110_000),
        (104_000, 114_000),
        (100_000, 112_000),
        (104_000, 116_000),
    ];
    let mut collector = PointCollector::new();
    for (corner, (c1, c2)) in ReferenceCorner::ALL.iter().zip(counts) {
        collector.set_pending(RawSweepSample::new(c1, 0, c2, 2));
        collector.commit_point(*corner).unwrap();
    }
    let solver = HomographySolver::default();

    c.bench_function("solve_calibration", |b| {
        b.iter(|| solver.solve(black_box(collector.points())))
    });
}

criterion_group!(benches, bench_project, bench_solve);
criterion_main!(benches);
