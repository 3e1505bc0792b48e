use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use lazyq::prelude::*;

fn make_rows(rows: usize) -> Vec<(i64, String)> {
    let mut out = Vec::with_capacity(rows);
    for i in 0..rows {
        out.push(((i as i64 * 7919) % 1024, format!("row-{}", i)));
    }
    out
}

fn bench_join(c: &mut Criterion) {
    let outer = from_vec((0..4096i64).collect::<Vec<_>>());
    let inner = from_vec(make_rows(4096));
    let joined = outer.join(inner, |o| *o % 1024, |i| i.0, |o, i| (*o, i.1.len()));
    let cancel = CancellationToken::new();
    c.bench_function("join_4k_x_4k", |b| {
        b.iter(|| {
            let n = block_on(joined.count(&cancel)).unwrap();
            black_box(n);
        })
    });
}

fn bench_order_by(c: &mut Criterion) {
    let sorted = from_vec(make_rows(8192))
        .order_by(|r| r.0)
        .then_by_descending(|r| r.1.clone());
    let cancel = CancellationToken::new();
    c.bench_function("order_by_then_by_8k", |b| {
        b.iter(|| {
            let rows = block_on(sorted.to_vec(&cancel)).unwrap();
            black_box(rows);
        })
    });
}

fn bench_chained_concat(c: &mut Criterion) {
    let mut chain = range(0, 16).concat(range(16, 16));
    for i in 2..256 {
        chain = chain.concat(range(i * 16, 16));
    }
    let cancel = CancellationToken::new();
    c.bench_function("concat_256_sources", |b| {
        b.iter(|| {
            let total = block_on(chain.sum(&cancel)).unwrap();
            black_box(total);
        })
    });
}

fn bench_group_by(c: &mut Criterion) {
    let grouped = range(0, 16384).group_by(|x| x % 97);
    let cancel = CancellationToken::new();
    c.bench_function("group_by_16k_97_keys", |b| {
        b.iter(|| {
            let groups = block_on(grouped.count(&cancel)).unwrap();
            black_box(groups);
        })
    });
}

criterion_group!(
    operators,
    bench_join,
    bench_order_by,
    bench_chained_concat,
    bench_group_by
);
criterion_main!(operators);
