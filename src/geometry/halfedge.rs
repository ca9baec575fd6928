// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh representation of Boolean results
//! Rebuilt from a compacted solid; partners are paired by undirected vertex key

use super::compact::CompactedSolid;
use super::face::{Coincidence, Face, FaceStatus, Solid};
use super::predicates::signed_area_along;
use crate::error::{GeometryError, GeometryResult};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Half-edge in a half-edge mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// Vertex this half-edge starts at
    pub origin: usize,
    /// Next half-edge around the same face
    pub next: usize,
    /// Previous half-edge around the same face
    pub prev: usize,
    /// Face this half-edge belongs to
    pub face: usize,
    /// Opposite half-edge in the neighbouring face
    pub partner: Option<usize>,
    /// Reverse half-edge in the same face when this edge bridges a hole
    pub bridge: Option<usize>,
}

impl HalfEdge {
    pub fn is_bridge(&self) -> bool {
        self.bridge.is_some()
    }
}

/// Face record: one half-edge of its loop plus the tags carried through the Boolean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFace {
    pub edge: usize,
    pub normal: Vector3<f64>,
    pub status: Option<FaceStatus>,
    pub coincidence: Coincidence,
}

/// Outcome of partner pairing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingReport {
    /// Partner pairs formed
    pub paired: usize,
    /// Bridge edge pairs recognised
    pub bridges: usize,
    /// Non-bridge half-edges left without a partner
    pub unpaired: usize,
    /// Edge groups whose size or orientation could not be paired
    pub anomalies: usize,
}

/// Half-edge mesh with full topological connectivity
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub points: Vec<Point3<f64>>,
    pub faces: Vec<MeshFace>,
    pub half_edges: Vec<HalfEdge>,
}

impl HalfEdgeMesh {
    /// Create an empty half-edge mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build loops and partners from a compacted solid
    pub fn from_compacted(solid: &CompactedSolid) -> (Self, PairingReport) {
        let mut mesh = HalfEdgeMesh {
            points: solid.points.clone(),
            ..HalfEdgeMesh::default()
        };
        for (f, ring) in solid.faces.iter().enumerate() {
            let base = mesh.half_edges.len();
            let n = ring.len();
            for (k, &origin) in ring.iter().enumerate() {
                mesh.half_edges.push(HalfEdge {
                    origin,
                    next: base + (k + 1) % n,
                    prev: base + (k + n - 1) % n,
                    face: f,
                    partner: None,
                    bridge: None,
                });
            }
            mesh.faces.push(MeshFace {
                edge: base,
                normal: solid.normals[f],
                status: solid.status[f],
                coincidence: solid.coincidence[f],
            });
        }
        let report = mesh.pair_edges();
        (mesh, report)
    }

    pub fn destination(&self, e: usize) -> usize {
        self.half_edges[self.half_edges[e].next].origin
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Half-edges around face `f`, starting at its anchor edge
    pub fn face_edges(&self, f: usize) -> Vec<usize> {
        let start = self.faces[f].edge;
        let mut out = vec![start];
        let mut e = self.half_edges[start].next;
        while e != start && out.len() <= self.half_edges.len() {
            out.push(e);
            e = self.half_edges[e].next;
        }
        out
    }

    /// Vertex indices around face `f`
    pub fn face_loop(&self, f: usize) -> Vec<usize> {
        self.face_edges(f)
            .into_iter()
            .map(|e| self.half_edges[e].origin)
            .collect()
    }

    /// Every non-bridge half-edge has a partner
    pub fn is_closed(&self) -> bool {
        self.half_edges
            .iter()
            .all(|he| he.is_bridge() || he.partner.is_some())
    }

    /// Pair half-edges sharing an undirected vertex pair.
    ///
    /// Same-face reverse pairs are bridges and never get partners. Two edges
    /// of opposite direction become partners. Larger balanced groups (several
    /// solids meeting along one edge) are paired radially: sorted by the angle
    /// of their face around the edge, each edge pointing against the axis is
    /// paired with its counter-clockwise neighbour. Anything else is left
    /// unpaired and reported.
    fn pair_edges(&mut self) -> PairingReport {
        let mut groups: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
        for e in 0..self.half_edges.len() {
            let (a, b) = (self.half_edges[e].origin, self.destination(e));
            if a != b {
                groups.entry((a.min(b), a.max(b))).or_default().push(e);
            }
        }

        let mut report = PairingReport::default();
        for (&(lo, hi), group) in &groups {
            let rest = self.mark_bridges(group, &mut report);
            match rest.len() {
                0 | 1 => {}
                2 if self.half_edges[rest[0]].origin != self.half_edges[rest[1]].origin => {
                    self.link(rest[0], rest[1]);
                    report.paired += 1;
                }
                n if n >= 4 && n % 2 == 0 && self.is_balanced(&rest, lo) => {
                    if !self.pair_radially(&rest, lo, hi, &mut report) {
                        report.anomalies += 1;
                        warn!(lo, hi, edges = n, "radial pairing left edges unpaired");
                    }
                }
                n => {
                    report.anomalies += 1;
                    warn!(lo, hi, edges = n, "cannot pair edge group");
                }
            }
        }

        report.unpaired = self
            .half_edges
            .iter()
            .filter(|he| !he.is_bridge() && he.partner.is_none())
            .count();
        report
    }

    fn mark_bridges(&mut self, group: &[usize], report: &mut PairingReport) -> Vec<usize> {
        let mut taken: HashSet<usize> = HashSet::new();
        for (i, &x) in group.iter().enumerate() {
            if taken.contains(&x) {
                continue;
            }
            let mate = group[i + 1..].iter().copied().find(|&y| {
                !taken.contains(&y)
                    && self.half_edges[y].face == self.half_edges[x].face
                    && self.half_edges[y].origin != self.half_edges[x].origin
            });
            if let Some(y) = mate {
                self.half_edges[x].bridge = Some(y);
                self.half_edges[y].bridge = Some(x);
                taken.insert(x);
                taken.insert(y);
                report.bridges += 1;
            }
        }
        group.iter().copied().filter(|e| !taken.contains(e)).collect()
    }

    fn is_balanced(&self, edges: &[usize], lo: usize) -> bool {
        let forward = edges.iter().filter(|&&e| self.half_edges[e].origin == lo).count();
        2 * forward == edges.len()
    }

    fn pair_radially(&mut self, edges: &[usize], lo: usize, hi: usize, report: &mut PairingReport) -> bool {
        let axis = (self.points[hi] - self.points[lo]).normalize();
        let helper = if axis.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        let u = axis.cross(&helper).normalize();
        let v = axis.cross(&u);

        let mut sorted: Vec<(f64, usize)> = edges
            .iter()
            .map(|&e| {
                let he = &self.half_edges[e];
                let dir = if he.origin == lo { axis } else { -axis };
                let wing = self.faces[he.face].normal.cross(&dir);
                (wing.dot(&v).atan2(wing.dot(&u)), e)
            })
            .collect();
        sorted.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        let n = sorted.len();
        let mut complete = true;
        for i in 0..n {
            let e = sorted[i].1;
            let f = sorted[(i + 1) % n].1;
            let backward = self.half_edges[e].origin == hi;
            let forward_next = self.half_edges[f].origin == lo;
            if backward {
                if forward_next && self.half_edges[f].partner.is_none() {
                    self.link(e, f);
                    report.paired += 1;
                } else {
                    complete = false;
                }
            }
        }
        complete
    }

    fn link(&mut self, a: usize, b: usize) {
        self.half_edges[a].partner = Some(b);
        self.half_edges[b].partner = Some(a);
    }

    /// Check loop closure, prev/next consistency and partner symmetry
    pub fn validate(&self) -> GeometryResult<()> {
        for (e, he) in self.half_edges.iter().enumerate() {
            if self.half_edges[he.next].prev != e || self.half_edges[he.prev].next != e {
                return Err(GeometryError::OpenLoop { edge: e });
            }
            if let Some(p) = he.partner {
                let mirror = &self.half_edges[p];
                if mirror.partner != Some(e)
                    || mirror.origin != self.destination(e)
                    || self.destination(p) != he.origin
                {
                    return Err(GeometryError::AsymmetricPartner { edge: e, partner: p });
                }
            }
        }
        for f in 0..self.faces.len() {
            let edges = self.face_edges(f);
            let last = edges[edges.len() - 1];
            if self.half_edges[last].next != self.faces[f].edge {
                return Err(GeometryError::OpenLoop { edge: self.faces[f].edge });
            }
        }
        Ok(())
    }

    /// Split each face's bridged loop back into an outer loop and holes
    pub fn to_solid(&self) -> Solid {
        let faces = (0..self.faces.len())
            .filter_map(|f| self.face_with_holes(f))
            .collect();
        Solid::new(faces)
    }

    fn face_with_holes(&self, f: usize) -> Option<Face> {
        let cycle = self.face_edges(f);
        let limit = cycle.len();
        let successor = |e: usize| -> usize {
            let mut n = self.half_edges[e].next;
            let mut steps = 0;
            while let Some(mate) = self.half_edges[n].bridge {
                n = self.half_edges[mate].next;
                steps += 1;
                if steps > limit {
                    break;
                }
            }
            n
        };

        let mut visited: HashSet<usize> = HashSet::new();
        let mut loops: Vec<Vec<Point3<f64>>> = Vec::new();
        for &start in &cycle {
            if self.half_edges[start].is_bridge() || visited.contains(&start) {
                continue;
            }
            let mut ring = Vec::new();
            let mut e = start;
            while visited.insert(e) && ring.len() <= limit {
                ring.push(self.points[self.half_edges[e].origin]);
                e = successor(e);
            }
            if ring.len() >= 3 {
                loops.push(ring);
            }
        }

        let normal = self.faces[f].normal;
        let outer = loops
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| {
                signed_area_along(x, &normal).total_cmp(&signed_area_along(y, &normal))
            })
            .map(|(i, _)| i)?;
        let outer_ring = loops.swap_remove(outer);
        let mut rings = vec![outer_ring];
        rings.extend(loops);

        let mut face = Face::from_loops(normal, rings);
        face.status = self.faces[f].status;
        face.coincidence = self.faces[f].coincidence;
        Some(face)
    }
}
