// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Simple B-rep producers used as Boolean operands

use super::face::{Face, Solid};
use crate::error::GeometryResult;
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;

/// Planar-faced primitives
#[derive(Debug, Clone)]
pub enum Primitive {
    /// Axis-aligned box between two corners
    Cuboid { min: Point3<f64>, max: Point3<f64> },
    /// Counter-clockwise base polygon extruded from `z0` to `z1`
    Prism { base: Vec<Point2<f64>>, z0: f64, z1: f64 },
    /// Regular `fn_`-gon prism of radius `r` standing on z = 0
    Cylinder { h: f64, r: f64, fn_: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        let min = if center {
            Point3::from(-size / 2.0)
        } else {
            Point3::origin()
        };
        Self::Cuboid { min, max: min + size }
    }

    pub fn cylinder(h: f64, r: f64, fn_: u32) -> Self {
        let segments = if fn_ >= 3 { fn_ } else { 32 };
        Self::Cylinder { h, r, fn_: segments }
    }

    pub fn to_solid(&self) -> GeometryResult<Solid> {
        match self {
            Self::Cuboid { min, max } => Ok(cuboid(*min, *max)),
            Self::Prism { base, z0, z1 } => prism(base, *z0, *z1),
            Self::Cylinder { h, r, fn_ } => {
                let base: Vec<Point2<f64>> = (0..*fn_)
                    .map(|i| {
                        let a = 2.0 * PI * i as f64 / *fn_ as f64;
                        Point2::new(r * a.cos(), r * a.sin())
                    })
                    .collect();
                prism(&base, 0.0, *h)
            }
        }
    }
}

/// Axis-aligned box with outward-facing quads
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Solid {
    let points = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    let quads = [
        vec![4, 5, 6, 7], // z+
        vec![0, 3, 2, 1], // z-
        vec![1, 2, 6, 5], // x+
        vec![0, 4, 7, 3], // x-
        vec![3, 7, 6, 2], // y+
        vec![0, 1, 5, 4], // y-
    ];
    let faces = quads
        .iter()
        .map(|quad| {
            let pts: Vec<Point3<f64>> = quad.iter().map(|&i| points[i]).collect();
            let normal = (pts[1] - pts[0]).cross(&(pts[2] - pts[1])).normalize();
            Face::new(normal, pts, vec![vec![0, 1, 2, 3]])
        })
        .collect();
    Solid::new(faces)
}

/// Extrude a counter-clockwise polygon between two heights
pub fn prism(base: &[Point2<f64>], z0: f64, z1: f64) -> GeometryResult<Solid> {
    let n = base.len();
    let mut points = Vec::with_capacity(2 * n);
    points.extend(base.iter().map(|p| Point3::new(p.x, p.y, z0)));
    points.extend(base.iter().map(|p| Point3::new(p.x, p.y, z1)));

    let mut polygons = Vec::with_capacity(n + 2);
    polygons.push((0..n).rev().collect::<Vec<usize>>());
    polygons.push((n..2 * n).collect::<Vec<usize>>());
    for i in 0..n {
        let j = (i + 1) % n;
        polygons.push(vec![i, j, n + j, n + i]);
    }
    Solid::from_indexed(&points, &polygons)
}
