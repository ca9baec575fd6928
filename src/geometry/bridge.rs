// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Reduction of faces with holes to a single bridged loop
//!
//! Each hole is spliced into the outer loop through a pair of opposite
//! bridge edges. The bridged loop visits the bridge endpoints twice, which
//! is how the mesh rebuild recognises bridges later on.

use super::face::Face;
use super::predicates::{ccw_angle, segment_hits_rect, segments_cross_properly, Projection};
use crate::config::Tolerance;
use nalgebra::Point2;

struct BridgeBuilder {
    flat: Vec<Point2<f64>>,
    outer: Vec<usize>,
    pending: Vec<Vec<usize>>,
    /// Holes whose merge was interrupted to merge a blocking hole first
    in_flight: Vec<Vec<usize>>,
    eps: f64,
}

/// Collapse every hole of `face` into its outer loop.
///
/// Holes are merged last-first. For each one the hole vertex farthest from
/// the hole centroid is bridged to the nearest outer vertex the bridge can
/// reach without crossing any boundary.
pub fn split_multi_loops(face: Face, tol: &Tolerance) -> Face {
    if face.loops.len() <= 1 {
        return face;
    }

    let projection = Projection::for_normal(&face.normal);
    let mut loops = face.loops.clone();
    let outer = loops.remove(0);
    let mut builder = BridgeBuilder {
        flat: projection.project_all(&face.pts),
        outer,
        pending: loops,
        in_flight: Vec::new(),
        eps: tol.linear,
    };
    while let Some(hole) = builder.pending.pop() {
        builder.merge_hole(hole);
    }

    let mut bridged = Face::new(face.normal, face.pts, vec![builder.outer]);
    bridged.status = face.status;
    bridged.coincidence = face.coincidence;
    bridged
}

impl BridgeBuilder {
    fn merge_hole(&mut self, hole: Vec<usize>) {
        let h_pos = self.farthest_from_centroid(&hole);
        let h = hole[h_pos];

        let mut order: Vec<usize> = (0..self.outer.len()).collect();
        order.sort_by(|&i, &j| {
            self.dist_sq(h, self.outer[i])
                .total_cmp(&self.dist_sq(h, self.outer[j]))
                .then(i.cmp(&j))
        });
        let Some(&nearest) = order.first() else {
            return;
        };

        if let Some(blocker) = self.pass_loops(h, self.outer[nearest]) {
            let blocking_hole = self.pending.remove(blocker);
            self.in_flight.push(hole);
            self.merge_hole(blocking_hole);
            if let Some(hole) = self.in_flight.pop() {
                self.merge_hole(hole);
            }
            return;
        }

        let chosen = order
            .iter()
            .copied()
            .find(|&pos| !self.bridge_crosses(h, self.outer[pos], &hole))
            .unwrap_or(nearest);
        let k = self.deal_with_mult_bridge(self.outer[chosen], h).unwrap_or(chosen);

        let mut spliced = Vec::with_capacity(self.outer.len() + hole.len() + 2);
        spliced.extend_from_slice(&self.outer[..=k]);
        spliced.extend(hole[h_pos..].iter().chain(&hole[..=h_pos]).copied());
        spliced.extend_from_slice(&self.outer[k..]);
        self.outer = spliced;
    }

    fn dist_sq(&self, a: usize, b: usize) -> f64 {
        (self.flat[a] - self.flat[b]).norm_squared()
    }

    fn farthest_from_centroid(&self, ring: &[usize]) -> usize {
        let sum = ring
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, &i| acc + self.flat[i].coords);
        let centroid = Point2::from(sum / ring.len() as f64);
        let mut best = 0;
        let mut best_d = f64::NEG_INFINITY;
        for (pos, &i) in ring.iter().enumerate() {
            let d = (self.flat[i] - centroid).norm_squared();
            if d > best_d {
                best = pos;
                best_d = d;
            }
        }
        best
    }

    /// Pending hole that the bridge `h`→`o` runs through, if any
    fn pass_loops(&self, h: usize, o: usize) -> Option<usize> {
        let (a, b) = (self.flat[h], self.flat[o]);
        self.pending.iter().position(|ring| {
            let (lo, hi) = self.rect_of(ring);
            segment_hits_rect(&a, &b, &lo, &hi) && self.ring_crossed(ring, h, o)
        })
    }

    fn rect_of(&self, ring: &[usize]) -> (Point2<f64>, Point2<f64>) {
        let mut lo = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &i in ring {
            let p = self.flat[i];
            lo = Point2::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Point2::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        (lo, hi)
    }

    fn ring_crossed(&self, ring: &[usize], h: usize, o: usize) -> bool {
        let (a, b) = (self.flat[h], self.flat[o]);
        (0..ring.len()).any(|k| {
            let (u, v) = (ring[k], ring[(k + 1) % ring.len()]);
            if u == h || v == h || u == o || v == o {
                return false;
            }
            segments_cross_properly(&a, &b, &self.flat[u], &self.flat[v], self.eps)
        })
    }

    fn bridge_crosses(&self, h: usize, o: usize, hole: &[usize]) -> bool {
        self.ring_crossed(&self.outer, h, o)
            || self.ring_crossed(hole, h, o)
            || self.pending.iter().any(|ring| self.ring_crossed(ring, h, o))
            || self.in_flight.iter().any(|ring| self.ring_crossed(ring, h, o))
    }

    /// Among repeated occurrences of outer vertex `o`, the one whose interior
    /// wedge contains the bridge direction towards `h`
    fn deal_with_mult_bridge(&self, o: usize, h: usize) -> Option<usize> {
        let occurrences: Vec<usize> = (0..self.outer.len()).filter(|&k| self.outer[k] == o).collect();
        if occurrences.len() <= 1 {
            return occurrences.first().copied();
        }
        let n = self.outer.len();
        let towards = self.flat[h] - self.flat[o];
        occurrences.iter().copied().find(|&k| {
            let next = self.flat[self.outer[(k + 1) % n]] - self.flat[o];
            let prev = self.flat[self.outer[(k + n - 1) % n]] - self.flat[o];
            ccw_angle(&next, &towards) <= ccw_angle(&next, &prev)
        })
    }
}
