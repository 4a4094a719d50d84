//! Criterion benchmark for the `perft` node counter, which doubles as a
//! performance and a correctness regression test.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use zugzwang::chess::perft::perft;
use zugzwang::chess::position::Position;

fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    for (position, depth, nodes) in &[
        (Position::starting(), 1, 20),
        (Position::starting(), 2, 400),
        (Position::starting(), 3, 8_902),
        (Position::starting(), 4, 197_281),
    ] {
        group.throughput(criterion::Throughput::Elements(*nodes));
        group.bench_with_input(
            BenchmarkId::new("perft", format!("position {position}, depth {depth}")),
            depth,
            |b, &depth| {
                b.iter(|| {
                    assert_eq!(perft(position, depth), *nodes);
                });
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = perft_benches;
    config = Criterion::default().sample_size(10);
    targets = perft_bench
}

criterion_main!(perft_benches);
