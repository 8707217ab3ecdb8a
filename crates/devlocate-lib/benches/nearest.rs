use criterion::{criterion_group, criterion_main, Criterion};
use devlocate_lib::{find_nearest, Coordinate, User, UserStore};
use once_cell::sync::Lazy;
use std::hint::black_box;

static BUILTIN: Lazy<UserStore> = Lazy::new(UserStore::builtin);

// Synthetic store roughly a hundred times the shipped dataset.
static SCATTERED: Lazy<Vec<User>> = Lazy::new(|| {
    (0..1500)
        .map(|i| {
            let lat = 40.0 + (i % 50) as f64 * 0.02;
            let lon = -74.5 + (i / 50) as f64 * 0.03;
            User::new(i, format!("user-{i}"), lat, lon)
        })
        .collect()
});

fn benchmark_nearest(c: &mut Criterion) {
    let query = Coordinate::new(40.7128, -74.0060);

    c.bench_function("nearest_builtin_k5", |b| {
        let users = BUILTIN.all();
        b.iter(|| {
            let ranked = find_nearest(black_box(query), users, 5).expect("query succeeds");
            black_box(ranked.len())
        });
    });

    c.bench_function("nearest_scattered_k25", |b| {
        let users = SCATTERED.as_slice();
        b.iter(|| {
            let ranked = find_nearest(black_box(query), users, 25).expect("query succeeds");
            black_box(ranked.len())
        });
    });
}

criterion_group!(benches, benchmark_nearest);
criterion_main!(benches);
