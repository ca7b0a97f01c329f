use criterion::{black_box, criterion_group, criterion_main, Criterion};
use plantgrid_logic::exits::{compute_layout, ExitSet};
use plantgrid_logic::grid::Grid;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_compute_layout(c: &mut Criterion) {
    let grid = Grid::new(20, 20).unwrap();
    let exits = ExitSet::new(&grid, [0, 19, 380, 399]).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("compute_layout 20x20, 4 exits", |b| {
        b.iter(|| compute_layout(black_box(&grid), black_box(&exits), &mut rng))
    });
}

criterion_group!(benches, bench_compute_layout);
criterion_main!(benches);
