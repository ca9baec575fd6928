// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar face clipper
//!
//! Clips one planar polygon with holes against another lying in the same
//! plane. Both boundaries are split at every mutual contact (true crossings,
//! vertices on edges, collinear overlaps), each piece is classified against
//! the other polygon, and the pieces the mode keeps are chained back into
//! loops.

use super::assembler::loops_to_faces;
use super::face::Face;
use super::predicates::{
    classify_segment_touch, cross2, locate_point, point_on_segment_interior, Location, Projection,
    SegmentTouch,
};
use super::trace::{normalize_edges, trace_loops};
use crate::config::Tolerance;
use nalgebra::{Point2, Point3};
use std::collections::HashSet;
use tracing::debug;

/// Which part of the subject face to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipMode {
    /// Overlap of subject and clip
    Inner,
    /// Subject minus clip
    Outer,
}

/// A polygon's loops flattened into one index sequence with per-loop links
#[derive(Debug, Clone)]
pub(crate) struct FlatPolygon {
    pub vertices: Vec<usize>,
    pub next: Vec<usize>,
}

impl FlatPolygon {
    pub fn from_loops(loops: &[Vec<usize>]) -> Self {
        let total = loops.iter().map(Vec::len).sum();
        let mut vertices = Vec::with_capacity(total);
        let mut next = Vec::with_capacity(total);
        for ring in loops {
            let start = vertices.len();
            let n = ring.len();
            for (k, &v) in ring.iter().enumerate() {
                vertices.push(v);
                next.push(start + (k + 1) % n);
            }
        }
        Self { vertices, next }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Edge `k` as (from, to) vertex ids
    pub fn edge(&self, k: usize) -> (usize, usize) {
        (self.vertices[k], self.vertices[self.next[k]])
    }
}

/// Points shared by both polygons, welded within the linear tolerance
struct PointPool {
    pts3: Vec<Point3<f64>>,
    pts2: Vec<Point2<f64>>,
    eps: f64,
}

impl PointPool {
    fn insert(&mut self, p3: Point3<f64>, p2: Point2<f64>) -> usize {
        if let Some(i) = self.pts2.iter().position(|q| (q - p2).norm() <= self.eps) {
            return i;
        }
        self.pts3.push(p3);
        self.pts2.push(p2);
        self.pts3.len() - 1
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    t: f64,
    vertex: usize,
    exits: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
struct Fragment {
    from: usize,
    to: usize,
    /// Exit flag of the crossing this fragment starts at
    after_crossing: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inside,
    Outside,
    SharedSame,
    SharedOpposite,
}

/// Working state for one subject/clip pair
struct PlanarClip {
    pool: PointPool,
    subject: FlatPolygon,
    clip: FlatPolygon,
    subject_loops: Vec<Vec<usize>>,
    clip_loops: Vec<Vec<usize>>,
    splits_a: Vec<Vec<Split>>,
    splits_b: Vec<Vec<Split>>,
    eps: f64,
}

impl PlanarClip {
    fn new(fa: &Face, fb: &Face, tol: &Tolerance) -> Self {
        let projection = Projection::for_normal(&fa.normal);
        let mut pool = PointPool {
            pts3: Vec::new(),
            pts2: Vec::new(),
            eps: tol.linear,
        };

        let mut pooled_loops = |face: &Face| -> Vec<Vec<usize>> {
            face.loops
                .iter()
                .map(|ring| {
                    let mut ids: Vec<usize> = Vec::with_capacity(ring.len());
                    for &i in ring {
                        let p = face.pts[i];
                        let id = pool.insert(p, projection.project(&p));
                        if ids.last() != Some(&id) {
                            ids.push(id);
                        }
                    }
                    while ids.len() > 1 && ids.first() == ids.last() {
                        ids.pop();
                    }
                    ids
                })
                .filter(|ids| ids.len() >= 3)
                .collect()
        };
        let subject_loops = pooled_loops(fa);
        let clip_loops = pooled_loops(fb);

        let subject = FlatPolygon::from_loops(&subject_loops);
        let clip = FlatPolygon::from_loops(&clip_loops);
        Self {
            splits_a: vec![Vec::new(); subject.len()],
            splits_b: vec![Vec::new(); clip.len()],
            pool,
            subject,
            clip,
            subject_loops,
            clip_loops,
            eps: tol.linear,
        }
    }

    fn p2(&self, id: usize) -> Point2<f64> {
        self.pool.pts2[id]
    }

    /// Record every contact between the two boundaries as edge splits
    fn split_edges(&mut self) {
        let eps = self.eps;
        for ka in 0..self.subject.len() {
            let (a0, a1) = self.subject.edge(ka);
            let (p0, p1) = (self.p2(a0), self.p2(a1));
            for kb in 0..self.clip.len() {
                let (b0, b1) = self.clip.edge(kb);
                let (q0, q1) = (self.p2(b0), self.p2(b1));
                if !rects_overlap(&p0, &p1, &q0, &q1, eps) {
                    continue;
                }

                match classify_segment_touch(&p0, &p1, &q0, &q1, eps) {
                    SegmentTouch::Disjoint => {}
                    SegmentTouch::Crossing { t, u } => {
                        let r = p1 - p0;
                        let s = q1 - q0;
                        // The subject leaves the clip region here
                        let exits = cross2(&s, &r) < 0.0;
                        let a3 = self.pool.pts3[a0];
                        let b3 = self.pool.pts3[a1];
                        let id = self.pool.insert(a3 + (b3 - a3) * t, p0 + r * t);
                        self.splits_a[ka].push(Split { t, vertex: id, exits: Some(exits) });
                        self.splits_b[kb].push(Split { t: u, vertex: id, exits: Some(exits) });
                    }
                    SegmentTouch::Touching | SegmentTouch::Collinear => {
                        for (v, q) in [(b0, q0), (b1, q1)] {
                            if let Some(t) = point_on_segment_interior(&q, &p0, &p1, eps) {
                                self.splits_a[ka].push(Split { t, vertex: v, exits: None });
                            }
                        }
                        for (v, p) in [(a0, p0), (a1, p1)] {
                            if let Some(u) = point_on_segment_interior(&p, &q0, &q1, eps) {
                                self.splits_b[kb].push(Split { t: u, vertex: v, exits: None });
                            }
                        }
                    }
                }
            }
        }
    }

    /// Whether the boundaries meet anywhere, shared vertices included
    fn boundaries_touch(&self) -> bool {
        if self.splits_a.iter().chain(&self.splits_b).any(|s| !s.is_empty()) {
            return true;
        }
        let subject_ids: HashSet<usize> = self.subject.vertices.iter().copied().collect();
        self.clip.vertices.iter().any(|v| subject_ids.contains(v))
    }

    fn fragments(polygon: &FlatPolygon, splits: &mut [Vec<Split>]) -> Vec<Fragment> {
        let mut out = Vec::new();
        for (k, edge_splits) in splits.iter_mut().enumerate() {
            let (from, to) = polygon.edge(k);
            edge_splits.sort_by(|x, y| x.t.total_cmp(&y.t));

            let mut current = from;
            let mut exits = None;
            for split in edge_splits.iter() {
                if split.vertex == current {
                    exits = exits.or(split.exits);
                    continue;
                }
                out.push(Fragment { from: current, to: split.vertex, after_crossing: exits });
                current = split.vertex;
                exits = split.exits;
            }
            if current != to {
                out.push(Fragment { from: current, to, after_crossing: exits });
            }
        }
        out
    }

    fn locate_midpoint(&self, fragment: &Fragment, loops: &[Vec<Point2<f64>>]) -> Location {
        let mid = nalgebra::center(&self.p2(fragment.from), &self.p2(fragment.to));
        locate_point(&mid, loops, self.eps)
    }

    fn flat_loops(&self, loops: &[Vec<usize>]) -> Vec<Vec<Point2<f64>>> {
        loops
            .iter()
            .map(|ring| ring.iter().map(|&i| self.p2(i)).collect())
            .collect()
    }

    /// Directed edges of the result, split-and-classify path
    fn select_fragments(&mut self, mode: ClipMode) -> Vec<(usize, usize)> {
        let frags_a = Self::fragments(&self.subject, &mut self.splits_a);
        let frags_b = Self::fragments(&self.clip, &mut self.splits_b);
        let keys_a: HashSet<(usize, usize)> = frags_a.iter().map(|f| (f.from, f.to)).collect();
        let keys_b: HashSet<(usize, usize)> = frags_b.iter().map(|f| (f.from, f.to)).collect();
        let region_a = self.flat_loops(&self.subject_loops);
        let region_b = self.flat_loops(&self.clip_loops);

        let mut edges = Vec::new();
        for frag in &frags_a {
            let side = if keys_b.contains(&(frag.from, frag.to)) {
                Side::SharedSame
            } else if keys_b.contains(&(frag.to, frag.from)) {
                Side::SharedOpposite
            } else if let Some(exits) = frag.after_crossing {
                if exits {
                    Side::Outside
                } else {
                    Side::Inside
                }
            } else {
                match self.locate_midpoint(frag, &region_b) {
                    Location::Inside => Side::Inside,
                    Location::Outside | Location::Boundary => Side::Outside,
                }
            };
            let keep = match mode {
                ClipMode::Inner => matches!(side, Side::Inside | Side::SharedSame),
                ClipMode::Outer => matches!(side, Side::Outside | Side::SharedOpposite),
            };
            if keep {
                edges.push((frag.from, frag.to));
            }
        }

        for frag in &frags_b {
            if keys_a.contains(&(frag.from, frag.to)) || keys_a.contains(&(frag.to, frag.from)) {
                continue;
            }
            let inside = match frag.after_crossing {
                Some(exits) => exits,
                None => self.locate_midpoint(frag, &region_a) == Location::Inside,
            };
            if inside {
                match mode {
                    ClipMode::Inner => edges.push((frag.from, frag.to)),
                    ClipMode::Outer => edges.push((frag.to, frag.from)),
                }
            }
        }
        edges
    }

    /// Directed edges of the result when the boundaries never meet
    fn clip_without_crossings(&self, mode: ClipMode) -> Vec<(usize, usize)> {
        let region_a = self.flat_loops(&self.subject_loops);
        let region_b = self.flat_loops(&self.clip_loops);
        let loop_inside = |ring: &[usize], region: &[Vec<Point2<f64>>]| {
            let frag = Fragment { from: ring[0], to: ring[1], after_crossing: None };
            self.locate_midpoint(&frag, region) == Location::Inside
        };
        let ring_edges = |ring: &[usize], reverse: bool| -> Vec<(usize, usize)> {
            (0..ring.len())
                .map(|k| {
                    let (a, b) = (ring[k], ring[(k + 1) % ring.len()]);
                    if reverse {
                        (b, a)
                    } else {
                        (a, b)
                    }
                })
                .collect()
        };

        let mut edges = Vec::new();
        for ring in &self.subject_loops {
            let inside = loop_inside(ring, &region_b);
            if inside == (mode == ClipMode::Inner) {
                edges.extend(ring_edges(ring, false));
            }
        }
        for ring in &self.clip_loops {
            if loop_inside(ring, &region_a) {
                edges.extend(ring_edges(ring, mode == ClipMode::Outer));
            }
        }
        edges
    }
}

/// Clip `fa` against `fb`, both lying in `fa`'s plane.
///
/// `Inner` keeps the overlap, `Outer` keeps `fa` minus `fb`. An empty result
/// means nothing of that kind remains; the clipper never fails.
pub fn face_face_intersect(fa: &Face, fb: &Face, mode: ClipMode, tol: &Tolerance) -> Vec<Face> {
    let mut clip = PlanarClip::new(fa, fb, tol);
    if clip.subject_loops.is_empty() {
        return Vec::new();
    }
    if clip.clip_loops.is_empty() {
        return match mode {
            ClipMode::Inner => Vec::new(),
            ClipMode::Outer => vec![fa.clone()],
        };
    }

    clip.split_edges();
    let edges = if clip.boundaries_touch() {
        clip.select_fragments(mode)
    } else {
        clip.clip_without_crossings(mode)
    };

    let edges = normalize_edges(&edges);
    let traced = trace_loops(&edges, &clip.pool.pts2);
    if traced.open_edges > 0 {
        debug!(open_edges = traced.open_edges, ?mode, "clipper left unclosed edges");
    }

    let loops = traced
        .loops
        .into_iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| ring.into_iter().map(|i| clip.pool.pts3[i]).collect())
        .collect();
    loops_to_faces(loops, &fa.normal, tol)
}

fn rects_overlap(p0: &Point2<f64>, p1: &Point2<f64>, q0: &Point2<f64>, q1: &Point2<f64>, eps: f64) -> bool {
    (0..2).all(|k| {
        p0[k].min(p1[k]) <= q0[k].max(q1[k]) + eps && q0[k].min(q1[k]) <= p0[k].max(p1[k]) + eps
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Face {
        Face::from_polygon(vec![
            Point3::new(x0, y0, 0.0),
            Point3::new(x1, y0, 0.0),
            Point3::new(x1, y1, 0.0),
            Point3::new(x0, y1, 0.0),
        ])
        .unwrap()
    }

    fn total_area(faces: &[Face]) -> f64 {
        faces.iter().map(Face::area).sum()
    }

    #[test]
    fn test_overlapping_squares() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);

        let inner = face_face_intersect(&a, &b, ClipMode::Inner, &tol);
        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);

        assert_eq!(inner.len(), 1);
        assert_relative_eq!(total_area(&inner), 1.0, epsilon = 1e-9);
        assert_eq!(outer.len(), 1);
        assert_relative_eq!(total_area(&outer), 3.0, epsilon = 1e-9);
        assert_eq!(outer[0].loops[0].len(), 6);
    }

    #[test]
    fn test_identical_faces() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 1.0, 1.0);

        let inner = face_face_intersect(&a, &a, ClipMode::Inner, &tol);
        assert_eq!(inner.len(), 1);
        assert_relative_eq!(total_area(&inner), 1.0, epsilon = 1e-12);
        assert!(face_face_intersect(&a, &a, ClipMode::Outer, &tol).is_empty());
    }

    #[test]
    fn test_clip_inside_subject_makes_hole() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);

        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].loops.len(), 2);
        assert_relative_eq!(total_area(&outer), 15.0, epsilon = 1e-9);

        let inner = face_face_intersect(&a, &b, ClipMode::Inner, &tol);
        assert_relative_eq!(total_area(&inner), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disjoint_faces() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(5.0, 5.0, 6.0, 6.0);

        assert!(face_face_intersect(&a, &b, ClipMode::Inner, &tol).is_empty());
        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);
        assert_relative_eq!(total_area(&outer), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shared_edge_and_t_junction() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 2.0, 1.0);
        let b = rect(1.0, 0.0, 3.0, 1.0);

        let inner = face_face_intersect(&a, &b, ClipMode::Inner, &tol);
        assert_relative_eq!(total_area(&inner), 1.0, epsilon = 1e-12);
        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);
        assert_relative_eq!(total_area(&outer), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vertex_touch_only() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);

        assert!(face_face_intersect(&a, &b, ClipMode::Inner, &tol).is_empty());
        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);
        assert_relative_eq!(total_area(&outer), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opposite_orientation_face_keeps_normal() {
        let tol = Tolerance::default();
        let a = rect(0.0, 0.0, 2.0, 2.0).reversed();
        let b = rect(1.0, 0.0, 3.0, 2.0).reversed();

        let inner = face_face_intersect(&a, &b, ClipMode::Inner, &tol);
        assert_eq!(inner.len(), 1);
        assert_relative_eq!(inner[0].normal, -Vector3::z());
        assert_relative_eq!(total_area(&inner), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_crossing_bars_split_subject() {
        let tol = Tolerance::default();
        let a = rect(0.0, 1.0, 3.0, 2.0);
        let b = rect(1.0, 0.0, 2.0, 3.0);

        let inner = face_face_intersect(&a, &b, ClipMode::Inner, &tol);
        assert_eq!(inner.len(), 1);
        assert_relative_eq!(total_area(&inner), 1.0, epsilon = 1e-12);

        // Four proper crossings cut the bar into two end pieces
        let outer = face_face_intersect(&a, &b, ClipMode::Outer, &tol);
        assert_eq!(outer.len(), 2);
        assert_relative_eq!(total_area(&outer), 2.0, epsilon = 1e-12);
    }
}
