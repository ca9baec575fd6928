// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use solidbool::geometry::primitives::cuboid;
use solidbool::geometry::{compact_vertices, face_face_intersect, ClipMode, HalfEdgeMesh};
use solidbool::{BooleanKernel, BooleanOp, Primitive, Tolerance};

fn bench_clipper(c: &mut Criterion) {
    let mut group = c.benchmark_group("clipper");
    let tol = Tolerance::default();

    for sides in [8u32, 32, 128] {
        let a = Primitive::cylinder(1.0, 1.0, sides).to_solid().unwrap();
        let b = Primitive::Prism {
            base: (0..sides)
                .map(|i| {
                    let t = 2.0 * std::f64::consts::PI * (i as f64 + 0.5) / sides as f64;
                    nalgebra::Point2::new(0.5 + t.cos(), 0.25 + t.sin())
                })
                .collect(),
            z0: 0.0,
            z1: 1.0,
        }
        .to_solid()
        .unwrap();
        // Bottom caps share the plane z = 0
        let (fa, fb) = (&a.faces[0], &b.faces[0]);

        group.bench_with_input(BenchmarkId::new("inner", sides), &sides, |bench, _| {
            bench.iter(|| face_face_intersect(black_box(fa), black_box(fb), ClipMode::Inner, &tol));
        });
        group.bench_with_input(BenchmarkId::new("outer", sides), &sides, |bench, _| {
            bench.iter(|| face_face_intersect(black_box(fa), black_box(fb), ClipMode::Outer, &tol));
        });
    }

    group.finish();
}

fn bench_compaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("compaction");
    let tol = Tolerance::default();

    for sides in [16u32, 64, 256] {
        let solid = Primitive::cylinder(2.0, 1.0, sides).to_solid().unwrap();
        group.bench_with_input(BenchmarkId::new("compact_and_rebuild", sides), &solid, |bench, solid| {
            bench.iter(|| {
                let compacted = compact_vertices(black_box(&solid.faces), &tol);
                HalfEdgeMesh::from_compacted(&compacted)
            });
        });
    }

    group.finish();
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    let kernel = BooleanKernel::default();

    let cube1 = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_solid().unwrap();
    let cube2 = cuboid(Point3::new(0.0, -4.0, -4.0), Point3::new(8.0, 4.0, 4.0));
    let rod = Primitive::cylinder(20.0, 3.0, 32).to_solid().unwrap();

    for op in [BooleanOp::Union, BooleanOp::Intersect, BooleanOp::Subtract] {
        group.bench_with_input(BenchmarkId::new("cubes", op), &op, |b, &op| {
            b.iter(|| kernel.run(black_box(&cube1), black_box(&cube2), op).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("cube_rod", op), &op, |b, &op| {
            b.iter(|| kernel.run(black_box(&cube1), black_box(&rod), op).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clipper, bench_compaction, bench_boolean_ops);
criterion_main!(benches);
