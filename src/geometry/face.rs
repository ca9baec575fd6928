// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar faces and boundary-represented solids

use super::bbox::BoundingBox;
use super::predicates::{newell_normal, signed_area_along};
use crate::error::{GeometryError, GeometryResult};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// Classification of a face fragment relative to the other operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceStatus {
    /// Piece of A lying inside B
    AInB,
    /// Piece of A lying outside B
    AOutB,
    /// Piece of B lying inside A
    BInA,
    /// Piece of B lying outside A
    BOutA,
}

/// Whether a face fragment coincides with a fragment of the other operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Coincidence {
    #[default]
    None,
    /// Same polygon, normals agree
    SameDirection,
    /// Same polygon, normals opposed (the solids touch here)
    OppositeDirection,
}

impl Coincidence {
    pub fn is_coincident(&self) -> bool {
        !matches!(self, Coincidence::None)
    }
}

/// A planar polygon with holes.
///
/// Loop 0 is the outer boundary, counter-clockwise around `normal`; every
/// other loop is a hole, clockwise around `normal`. Loops index into `pts`.
#[derive(Debug, Clone)]
pub struct Face {
    pub normal: Vector3<f64>,
    pub pts: Vec<Point3<f64>>,
    pub loops: Vec<Vec<usize>>,
    pub status: Option<FaceStatus>,
    pub coincidence: Coincidence,
    bbox: OnceCell<BoundingBox>,
}

impl Face {
    /// Create a face from a unit normal, a point buffer and its loops
    pub fn new(normal: Vector3<f64>, pts: Vec<Point3<f64>>, loops: Vec<Vec<usize>>) -> Self {
        Self {
            normal,
            pts,
            loops,
            status: None,
            coincidence: Coincidence::None,
            bbox: OnceCell::new(),
        }
    }

    /// Single-loop face whose normal follows the winding of `points`
    pub fn from_polygon(points: Vec<Point3<f64>>) -> GeometryResult<Self> {
        let n = newell_normal(points.iter());
        let len = n.norm();
        if points.len() < 3 {
            return Err(GeometryError::TooFewVertices { face: 0, count: points.len() });
        }
        if len == 0.0 {
            return Err(GeometryError::DegenerateFace { face: 0 });
        }
        let loop0 = (0..points.len()).collect();
        Ok(Self::new(n / len, points, vec![loop0]))
    }

    /// Build a face from loops of points (outer first) sharing one normal
    pub fn from_loops(normal: Vector3<f64>, loops: Vec<Vec<Point3<f64>>>) -> Self {
        let mut pts = Vec::new();
        let mut indices = Vec::with_capacity(loops.len());
        for ring in loops {
            let start = pts.len();
            indices.push((start..start + ring.len()).collect());
            pts.extend(ring);
        }
        Self::new(normal, pts, indices)
    }

    /// Tag with a new classification, clearing any earlier coincidence
    pub fn with_status(mut self, status: FaceStatus) -> Self {
        self.status = Some(status);
        self.coincidence = Coincidence::None;
        self
    }

    /// Lazily computed bounding box of all loop points
    pub fn bbox(&self) -> &BoundingBox {
        self.bbox.get_or_init(|| {
            BoundingBox::from_points(self.loops.iter().flatten().map(|&i| &self.pts[i]))
        })
    }

    /// Plane offset `d` such that `normal · x = d` on the face
    pub fn plane_offset(&self) -> f64 {
        let count = self.loops.iter().map(Vec::len).sum::<usize>();
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self
            .loops
            .iter()
            .flatten()
            .map(|&i| self.normal.dot(&self.pts[i].coords))
            .sum();
        sum / count as f64
    }

    pub fn loop_points(&self, index: usize) -> Vec<Point3<f64>> {
        self.loops[index].iter().map(|&i| self.pts[i]).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Net area: outer loop minus holes
    pub fn area(&self) -> f64 {
        (0..self.loops.len())
            .map(|i| signed_area_along(&self.loop_points(i), &self.normal))
            .sum()
    }

    /// Same region with opposite orientation
    pub fn reversed(&self) -> Face {
        let mut face = Face::new(
            -self.normal,
            self.pts.clone(),
            self.loops
                .iter()
                .map(|ring| ring.iter().rev().copied().collect())
                .collect(),
        );
        face.status = self.status;
        face.coincidence = self.coincidence;
        face
    }

    /// Check index bounds and loop sizes, reporting `face_index` in errors
    pub fn validate(&self, face_index: usize) -> GeometryResult<()> {
        for ring in &self.loops {
            if ring.len() < 3 {
                return Err(GeometryError::TooFewVertices { face: face_index, count: ring.len() });
            }
            if let Some(&bad) = ring.iter().find(|&&i| i >= self.pts.len()) {
                return Err(GeometryError::IndexOutOfRange {
                    face: face_index,
                    index: bad,
                    len: self.pts.len(),
                });
            }
        }
        Ok(())
    }

    /// Combine several coplanar faces into one multi-loop region.
    ///
    /// The result is only meaningful as a clipping region: it may hold more
    /// than one outer loop.
    pub(crate) fn merge_regions(normal: Vector3<f64>, faces: &[Face]) -> Face {
        let mut pts = Vec::new();
        let mut loops = Vec::new();
        for face in faces {
            let offset = pts.len();
            pts.extend_from_slice(&face.pts);
            loops.extend(
                face.loops
                    .iter()
                    .map(|ring| ring.iter().map(|&i| i + offset).collect::<Vec<_>>()),
            );
        }
        Face::new(normal, pts, loops)
    }
}

/// A closed polyhedral solid as a list of planar faces
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pub faces: Vec<Face>,
}

impl Solid {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    /// The empty solid
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Aggregate bounding box of every face
    pub fn bbox(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for face in &self.faces {
            bbox.merge(face.bbox());
        }
        bbox
    }

    /// Build a solid from a shared point list and single-loop polygons
    pub fn from_indexed(points: &[Point3<f64>], polygons: &[Vec<usize>]) -> GeometryResult<Self> {
        let mut faces = Vec::with_capacity(polygons.len());
        for (f, poly) in polygons.iter().enumerate() {
            if poly.len() < 3 {
                return Err(GeometryError::TooFewVertices { face: f, count: poly.len() });
            }
            let mut pts = Vec::with_capacity(poly.len());
            for &i in poly {
                let p = points.get(i).ok_or(GeometryError::IndexOutOfRange {
                    face: f,
                    index: i,
                    len: points.len(),
                })?;
                pts.push(*p);
            }
            let face = Face::from_polygon(pts).map_err(|err| match err {
                GeometryError::DegenerateFace { .. } => GeometryError::DegenerateFace { face: f },
                other => other,
            })?;
            faces.push(face);
        }
        Ok(Self::new(faces))
    }

    pub fn validate(&self) -> GeometryResult<()> {
        for (i, face) in self.faces.iter().enumerate() {
            face.validate(i)?;
        }
        Ok(())
    }

    /// Enclosed volume (divergence theorem over fan triangles)
    pub fn volume(&self) -> f64 {
        let mut six_v = 0.0;
        for face in &self.faces {
            for ring in &face.loops {
                if ring.len() < 3 {
                    continue;
                }
                let p0 = face.pts[ring[0]].coords;
                for w in ring[1..].windows(2) {
                    let p1 = face.pts[w[0]].coords;
                    let p2 = face.pts[w[1]].coords;
                    six_v += p0.dot(&p1.cross(&p2));
                }
            }
        }
        six_v / 6.0
    }

    /// Sum of net face areas
    pub fn surface_area(&self) -> f64 {
        self.faces.iter().map(Face::area).sum()
    }
}
