// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grouping of closed loops into faces with holes

use super::bbox::BoundingBox;
use super::face::Face;
use super::predicates::{locate_point, signed_area_along, Location, Projection};
use crate::config::Tolerance;
use nalgebra::{Point2, Point3, Vector3};
use tracing::warn;

struct LoopInfo {
    points: Vec<Point3<f64>>,
    flat: Vec<Point2<f64>>,
    area: f64,
    bbox: BoundingBox,
}

/// Turn a set of closed coplanar loops into faces.
///
/// Loops wound counter-clockwise around `normal` are outer boundaries; the
/// others are holes. Each hole joins the smallest outer loop that contains it.
/// Zero-area loops are dropped, as are holes with no containing outer loop.
pub fn loops_to_faces(loops: Vec<Vec<Point3<f64>>>, normal: &Vector3<f64>, tol: &Tolerance) -> Vec<Face> {
    let normal = normal.normalize();
    let projection = Projection::for_normal(&normal);

    let mut outers: Vec<LoopInfo> = Vec::new();
    let mut holes: Vec<LoopInfo> = Vec::new();
    for ring in loops {
        let points = dedup_ring(ring, tol.linear);
        if points.len() < 3 {
            continue;
        }
        let area = signed_area_along(&points, &normal);
        if area.abs() <= tol.linear_sq() {
            continue;
        }
        let info = LoopInfo {
            flat: projection.project_all(&points),
            bbox: BoundingBox::from_points(points.iter()),
            points,
            area,
        };
        if area > 0.0 {
            outers.push(info);
        } else {
            holes.push(info);
        }
    }

    let mut assigned: Vec<Vec<LoopInfo>> = outers.iter().map(|_| Vec::new()).collect();
    for hole in holes {
        match find_container(&hole, &outers, tol) {
            Some(owner) => assigned[owner].push(hole),
            None => warn!(area = hole.area, "dropping hole loop with no enclosing outer loop"),
        }
    }

    outers
        .into_iter()
        .zip(assigned)
        .map(|(outer, holes)| {
            let rings = std::iter::once(outer.points)
                .chain(holes.into_iter().map(|h| h.points))
                .collect();
            Face::from_loops(normal, rings)
        })
        .collect()
}

/// Index of the smallest outer loop enclosing `hole`
fn find_container(hole: &LoopInfo, outers: &[LoopInfo], tol: &Tolerance) -> Option<usize> {
    outers
        .iter()
        .enumerate()
        .filter(|(_, outer)| outer.bbox.contains_box(&hole.bbox, tol.linear))
        .filter(|(_, outer)| outer.area + tol.linear_sq() >= -hole.area)
        .filter(|(_, outer)| loop_inside(&hole.flat, &outer.flat, tol.linear))
        .min_by(|(_, x), (_, y)| x.area.total_cmp(&y.area))
        .map(|(i, _)| i)
}

/// First vertex of `inner` that is clearly inside or outside `outer` decides;
/// a loop lying entirely on the boundary counts as inside.
fn loop_inside(inner: &[Point2<f64>], outer: &[Point2<f64>], eps: f64) -> bool {
    let region = [outer.to_vec()];
    for p in inner {
        match locate_point(p, &region, eps) {
            Location::Inside => return true,
            Location::Outside => return false,
            Location::Boundary => continue,
        }
    }
    true
}

/// Remove consecutive repeated points, including the wrap-around pair
fn dedup_ring(ring: Vec<Point3<f64>>, eps: f64) -> Vec<Point3<f64>> {
    let mut out: Vec<Point3<f64>> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last().map_or(true, |q| (p - q).norm() > eps) {
            out.push(p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= eps {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, ccw: bool) -> Vec<Point3<f64>> {
        let mut pts = vec![
            Point3::new(x0, y0, 0.0),
            Point3::new(x1, y0, 0.0),
            Point3::new(x1, y1, 0.0),
            Point3::new(x0, y1, 0.0),
        ];
        if !ccw {
            pts.reverse();
        }
        pts
    }

    #[test]
    fn test_hole_joins_enclosing_outer() {
        let tol = Tolerance::default();
        let loops = vec![
            rect(0.0, 0.0, 10.0, 10.0, true),
            rect(2.0, 2.0, 4.0, 4.0, false),
            rect(20.0, 0.0, 21.0, 1.0, true),
        ];
        let faces = loops_to_faces(loops, &Vector3::z(), &tol);

        assert_eq!(faces.len(), 2);
        let big = faces.iter().find(|f| f.loops.len() == 2).unwrap();
        assert_relative_eq!(big.area(), 96.0);
    }

    #[test]
    fn test_island_inside_hole_nests_correctly() {
        let tol = Tolerance::default();
        let loops = vec![
            rect(0.0, 0.0, 10.0, 10.0, true),
            rect(1.0, 1.0, 9.0, 9.0, false),
            rect(3.0, 3.0, 7.0, 7.0, true),
            rect(4.0, 4.0, 6.0, 6.0, false),
        ];
        let faces = loops_to_faces(loops, &Vector3::z(), &tol);

        assert_eq!(faces.len(), 2);
        let areas: Vec<f64> = faces.iter().map(Face::area).collect();
        assert!(areas.iter().any(|a| (a - 36.0).abs() < 1e-9));
        assert!(areas.iter().any(|a| (a - 12.0).abs() < 1e-9));
    }

    #[test]
    fn test_degenerate_and_orphan_loops_dropped() {
        let tol = Tolerance::default();
        let sliver = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let loops = vec![sliver, rect(0.0, 0.0, 1.0, 1.0, false)];
        assert!(loops_to_faces(loops, &Vector3::z(), &tol).is_empty());
    }
}
