// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex compaction
//!
//! Face fragments carry private point buffers. Compaction orders all points
//! along a space-filling recursion, welds points closer than the linear
//! tolerance and rewrites every face as one index loop into a shared buffer.

use super::bridge::split_multi_loops;
use super::face::{Coincidence, Face, FaceStatus};
use crate::config::Tolerance;
use nalgebra::{Point3, Vector3};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Shared-vertex solid: one index loop per face plus per-face tags
#[derive(Debug, Clone, Default)]
pub struct CompactedSolid {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<Vec<usize>>,
    pub normals: Vec<Vector3<f64>>,
    pub status: Vec<Option<FaceStatus>>,
    pub coincidence: Vec<Coincidence>,
}

impl CompactedSolid {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Keep the listed faces, reversing those flagged, and drop unused points
    pub fn subset(&self, picks: &[(usize, bool)]) -> CompactedSolid {
        let mut out = CompactedSolid {
            points: self.points.clone(),
            ..CompactedSolid::default()
        };
        for &(f, reversed) in picks {
            let mut ring = self.faces[f].clone();
            let mut normal = self.normals[f];
            if reversed {
                ring.reverse();
                normal = -normal;
            }
            out.faces.push(ring);
            out.normals.push(normal);
            out.status.push(self.status[f]);
            out.coincidence.push(self.coincidence[f]);
        }
        out.prune_points();
        out
    }

    /// Remove points no face references, preserving the order of the rest
    pub fn prune_points(&mut self) {
        let mut remap = vec![usize::MAX; self.points.len()];
        for ring in &self.faces {
            for &i in ring {
                remap[i] = 0;
            }
        }
        let mut points = Vec::new();
        for (i, p) in self.points.iter().enumerate() {
            if remap[i] == 0 {
                remap[i] = points.len();
                points.push(*p);
            }
        }
        for ring in &mut self.faces {
            for i in ring.iter_mut() {
                *i = remap[*i];
            }
        }
        self.points = points;
    }

    /// Expand back into independent faces (bridged loops stay bridged)
    pub fn to_faces(&self) -> Vec<Face> {
        self.faces
            .iter()
            .enumerate()
            .map(|(f, ring)| {
                let pts = ring.iter().map(|&i| self.points[i]).collect();
                let mut face = Face::new(self.normals[f], pts, vec![(0..ring.len()).collect()]);
                face.status = self.status[f];
                face.coincidence = self.coincidence[f];
                face
            })
            .collect()
    }
}

/// Permutation of `points` along a Hilbert-like octant recursion.
///
/// Each level splits the range around the median of one axis (values within
/// `eps` of the median form their own middle band), then recurses on the next
/// axis. Alternate halves are visited in mirrored order so neighbouring
/// cells stay adjacent in the output.
pub fn spatial_sort(points: &[Point3<f64>], eps: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    sort_range(&mut order, points, 0, false, 0, eps);
    order
}

fn sort_range(idx: &mut [usize], points: &[Point3<f64>], axis: usize, mirrored: bool, stalled: u8, eps: f64) {
    if idx.len() <= 1 || stalled >= 3 {
        return;
    }
    let next_axis = (axis + 1) % 3;

    let mut keys: Vec<f64> = idx.iter().map(|&i| points[i][axis]).collect();
    let mid = keys.len() / 2;
    let (_, median, _) = keys.select_nth_unstable_by(mid, f64::total_cmp);
    let median = *median;

    let mut less = Vec::new();
    let mut equal = Vec::new();
    let mut greater = Vec::new();
    for &i in idx.iter() {
        let v = points[i][axis];
        if v < median - eps {
            less.push(i);
        } else if v > median + eps {
            greater.push(i);
        } else {
            equal.push(i);
        }
    }

    if less.is_empty() && greater.is_empty() {
        sort_range(idx, points, next_axis, mirrored, stalled + 1, eps);
        return;
    }

    let (head, tail) = if mirrored { (greater, less) } else { (less, greater) };
    let (n_head, n_equal) = (head.len(), equal.len());
    for (slot, i) in idx.iter_mut().zip(head.into_iter().chain(equal).chain(tail)) {
        *slot = i;
    }

    let (head_part, rest) = idx.split_at_mut(n_head);
    let (equal_part, tail_part) = rest.split_at_mut(n_equal);
    sort_range(head_part, points, next_axis, mirrored, 0, eps);
    sort_range(equal_part, points, next_axis, mirrored, 0, eps);
    sort_range(tail_part, points, next_axis, !mirrored, 0, eps);
}

/// Weld points along `order`: each point joins the first earlier
/// representative within `eps`, otherwise it becomes one.
///
/// Returns the representative points (in `order`) and, for every input
/// point, the index of its representative.
pub fn coalesce(points: &[Point3<f64>], order: &[usize], eps: f64) -> (Vec<Point3<f64>>, Vec<usize>) {
    let cell = eps.max(f64::MIN_POSITIVE);
    let key = |p: &Point3<f64>| -> [i64; 3] {
        [
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        ]
    };

    let mut grid: HashMap<[i64; 3], Vec<usize>> = HashMap::new();
    let mut reps: Vec<Point3<f64>> = Vec::new();
    let mut remap = vec![0; points.len()];

    for &i in order {
        let p = &points[i];
        let k = key(p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbour = [
                        k[0].saturating_add(dx),
                        k[1].saturating_add(dy),
                        k[2].saturating_add(dz),
                    ];
                    if let Some(bucket) = grid.get(&neighbour) {
                        if let Some(&r) = bucket.iter().find(|&&r| (reps[r] - p).norm() <= eps) {
                            found = Some(r);
                            break 'search;
                        }
                    }
                }
            }
        }
        remap[i] = match found {
            Some(r) => r,
            None => {
                reps.push(*p);
                grid.entry(k).or_default().push(reps.len() - 1);
                reps.len() - 1
            }
        };
    }
    (reps, remap)
}

/// Weld all face points into one shared buffer.
///
/// Faces with holes are bridged first. Consecutive repeated indices are
/// removed; faces that collapse below three vertices are discarded.
pub fn compact_vertices(faces: &[Face], tol: &Tolerance) -> CompactedSolid {
    let single: Vec<Cow<'_, Face>> = faces
        .iter()
        .map(|face| {
            if face.loops.len() > 1 {
                Cow::Owned(split_multi_loops(face.clone(), tol))
            } else {
                Cow::Borrowed(face)
            }
        })
        .collect();

    let mut all = Vec::new();
    let mut spans = Vec::with_capacity(single.len());
    for face in &single {
        let start = all.len();
        if let Some(ring) = face.loops.first() {
            all.extend(ring.iter().map(|&i| face.pts[i]));
        }
        spans.push(start..all.len());
    }

    let order = spatial_sort(&all, tol.linear);
    let (points, remap) = coalesce(&all, &order, tol.linear);

    let mut out = CompactedSolid {
        points,
        ..CompactedSolid::default()
    };
    let mut collapsed = 0;
    for (face, span) in single.iter().zip(spans) {
        let mut ring: Vec<usize> = Vec::with_capacity(span.len());
        for i in span {
            let v = remap[i];
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            collapsed += 1;
            continue;
        }
        out.faces.push(ring);
        out.normals.push(face.normal);
        out.status.push(face.status);
        out.coincidence.push(face.coincidence);
    }
    if collapsed > 0 {
        debug!(collapsed, "discarded faces that collapsed during welding");
    }
    out.prune_points();
    out
}

/// Tag `AInB` / `BInA` face pairs that cover the same vertex set.
///
/// Returns the number of coincident pairs found.
pub fn mark_coincident_faces(solid: &mut CompactedSolid) -> usize {
    let mut vertex_faces: Vec<Vec<usize>> = vec![Vec::new(); solid.points.len()];
    for (f, ring) in solid.faces.iter().enumerate() {
        if solid.status[f] == Some(FaceStatus::BInA) {
            for &v in ring {
                vertex_faces[v].push(f);
            }
        }
    }

    let signature = |ring: &[usize]| -> Vec<usize> {
        let mut sig = ring.to_vec();
        sig.sort_unstable();
        sig.dedup();
        sig
    };

    let mut pairs = 0;
    for f in 0..solid.faces.len() {
        if solid.status[f] != Some(FaceStatus::AInB) {
            continue;
        }
        let sig = signature(&solid.faces[f]);
        let Some(&anchor) = sig.first() else {
            continue;
        };
        let partner = vertex_faces[anchor].iter().copied().find(|&g| {
            !solid.coincidence[g].is_coincident() && signature(&solid.faces[g]) == sig
        });
        if let Some(g) = partner {
            let kind = if solid.normals[f].dot(&solid.normals[g]) > 0.0 {
                Coincidence::SameDirection
            } else {
                Coincidence::OppositeDirection
            };
            solid.coincidence[f] = kind;
            solid.coincidence[g] = kind;
            pairs += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::cuboid;

    #[test]
    fn test_spatial_sort_is_permutation() {
        let points: Vec<Point3<f64>> = (0..50)
            .map(|i| {
                let f = i as f64;
                Point3::new((f * 0.37).sin(), (f * 1.3).cos(), (f * 0.11) % 1.0)
            })
            .collect();
        let mut order = spatial_sort(&points, 1e-10);
        order.sort_unstable();
        assert_eq!(order, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_coalesce_welds_close_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1e-12, 0.0, 0.0),
            Point3::new(1.0, 5e-11, 0.0),
        ];
        let order = spatial_sort(&points, 1e-10);
        let (reps, remap) = coalesce(&points, &order, 1e-10);
        assert_eq!(reps.len(), 2);
        assert_eq!(remap[0], remap[2]);
        assert_eq!(remap[1], remap[3]);
        assert_ne!(remap[0], remap[1]);
    }

    #[test]
    fn test_cube_compacts_to_eight_points() {
        let tol = Tolerance::default();
        let cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let compacted = compact_vertices(&cube.faces, &tol);

        assert_eq!(compacted.points.len(), 8);
        assert_eq!(compacted.face_count(), 6);
        assert!(compacted.faces.iter().all(|ring| ring.len() == 4));
    }

    #[test]
    fn test_compaction_is_idempotent() {
        let tol = Tolerance::default();
        let cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let once = compact_vertices(&cube.faces, &tol);
        let twice = compact_vertices(&once.to_faces(), &tol);

        assert_eq!(once.points, twice.points);
        assert_eq!(once.faces, twice.faces);
    }

    #[test]
    fn test_coincident_faces_detected() {
        let tol = Tolerance::default();
        let cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let a = cube.faces[0].clone().with_status(FaceStatus::AInB);
        let same = cube.faces[0].clone().with_status(FaceStatus::BInA);
        let opposite = cube.faces[2].reversed().with_status(FaceStatus::BInA);
        let other = cube.faces[2].clone().with_status(FaceStatus::AInB);

        let mut compacted = compact_vertices(&[a, same, opposite, other], &tol);
        assert_eq!(mark_coincident_faces(&mut compacted), 2);
        assert_eq!(compacted.coincidence[0], Coincidence::SameDirection);
        assert_eq!(compacted.coincidence[1], Coincidence::SameDirection);
        assert_eq!(compacted.coincidence[2], Coincidence::OppositeDirection);
        assert_eq!(compacted.coincidence[3], Coincidence::OppositeDirection);
    }

    #[test]
    fn test_subset_reverses_and_prunes() {
        let tol = Tolerance::default();
        let cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let compacted = compact_vertices(&cube.faces, &tol);

        let top = compacted.subset(&[(0, true)]);
        assert_eq!(top.points.len(), 4);
        assert_eq!(top.normals[0], -compacted.normals[0]);
        let original: Vec<Point3<f64>> = compacted.faces[0].iter().rev().map(|&i| compacted.points[i]).collect();
        let kept: Vec<Point3<f64>> = top.faces[0].iter().map(|&i| top.points[i]).collect();
        assert_eq!(original, kept);
    }
}
