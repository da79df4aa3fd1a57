// Copyright 2025 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use vellum_index::{Aabb, Backend, Flat, Index, Key, RTree};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Shapes scattered over a 2000x2000 canvas, like a busy design file.
fn gen_canvas_rects(count: usize) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let w = 8.0 + rng.next_f64() * 120.0;
        let h = 8.0 + rng.next_f64() * 120.0;
        let x0 = rng.next_f64() * (2000.0 - w);
        let y0 = rng.next_f64() * (2000.0 - h);
        out.push(Aabb::from_xywh(x0, y0, w, h));
    }
    out
}

fn items(rects: &[Aabb]) -> Vec<(Aabb, u32)> {
    rects
        .iter()
        .copied()
        .enumerate()
        .map(|(i, r)| (r, i as u32))
        .collect()
}

fn bench_build<B: Backend + Default>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(format!("{name}_build"));
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let bulk = items(&rects);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_each_n{n}"), |b| {
            b.iter_batched(
                || Index::<u32, B>::with_backend(B::default()),
                |mut idx| {
                    for &(r, p) in &bulk {
                        let _ = idx.insert(r, p);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("insert_bulk_n{n}"), |b| {
            b.iter_batched(
                || Index::<u32, B>::with_backend(B::default()),
                |mut idx| {
                    black_box(idx.insert_bulk(&bulk).len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_queries<B: Backend + Default>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(format!("{name}_query"));
    let bulk = items(&gen_canvas_rects(4096));
    let mut idx = Index::<u32, B>::with_backend(B::default());
    let _ = idx.insert_bulk(&bulk);
    group.bench_function("rubber_band", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..64 {
                let x = (q % 8) as f64 * 250.0;
                let y = (q / 8) as f64 * 250.0;
                total += idx.query_rect(Aabb::from_xywh(x, y, 200.0, 200.0)).count();
            }
            black_box(total);
        })
    });
    group.bench_function("pointer_pick", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 16) as f64 * 125.0;
                let y = (q / 16) as f64 * 125.0;
                total += idx.query_point(x, y).count();
            }
            black_box(total);
        })
    });
    group.finish();
}

/// Dragging a selection: every frame removes and re-inserts the moved boxes.
fn bench_drag_churn<B: Backend + Default>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(format!("{name}_drag"));
    let rects = gen_canvas_rects(4096);
    let bulk = items(&rects);
    group.bench_function("move_256_of_4096", |b| {
        b.iter_batched(
            || {
                let mut idx = Index::<u32, B>::with_backend(B::default());
                let keys: Vec<Key> = idx.insert_bulk(&bulk);
                (idx, keys)
            },
            |(mut idx, mut keys)| {
                for step in 1..=8 {
                    let dx = f64::from(step) * 3.0;
                    for (i, key) in keys.iter_mut().enumerate().take(256) {
                        let r = rects[i];
                        let _ = idx.remove(*key);
                        *key = idx.insert(
                            Aabb::new(r.min_x + dx, r.min_y, r.max_x + dx, r.max_y),
                            i as u32,
                        );
                    }
                }
                black_box(idx.query_rect(Aabb::from_xywh(0.0, 0.0, 500.0, 500.0)).count());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_rtree(c: &mut Criterion) {
    bench_build::<RTree>(c, "rtree");
    bench_queries::<RTree>(c, "rtree");
    bench_drag_churn::<RTree>(c, "rtree");
}

fn bench_flat(c: &mut Criterion) {
    bench_build::<Flat>(c, "flat");
    bench_queries::<Flat>(c, "flat");
    bench_drag_churn::<Flat>(c, "flat");
}

criterion_group!(benches, bench_rtree, bench_flat);
criterion_main!(benches);
