// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face-versus-solid intersection
//!
//! The plane of a face cuts the other solid along a set of closed loops.
//! Those loops form a planar region which then clips the face.

use super::assembler::loops_to_faces;
use super::clipper::{face_face_intersect, ClipMode};
use super::face::{Face, Solid};
use super::predicates::{plane_plane_line, point_on_segment_interior, Projection};
use super::trace::{normalize_edges, trace_loops};
use crate::config::Tolerance;
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

/// Oriented plane `normal · x = offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    pub fn of_face(face: &Face) -> Self {
        Self::new(face.normal, face.plane_offset())
    }

    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }
}

/// Directed piece of a plane/face intersection line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

/// Closed section loops and the number of segments that could not be closed
#[derive(Debug, Default)]
pub struct SectionLoops {
    pub loops: Vec<Vec<Point3<f64>>>,
    pub dropped_segments: usize,
}

/// Result of splitting one face against a solid
#[derive(Debug, Default)]
pub struct FaceSplit {
    pub inside: Vec<Face>,
    pub outside: Vec<Face>,
    pub dropped_segments: usize,
}

/// Which side of a plane a section is taken on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSide {
    /// Just past the plane along its normal
    Above,
    /// Just behind the plane
    Below,
}

/// Segments where `plane`, displaced infinitesimally towards `side`, meets
/// `face`.
///
/// Vertices on the plane never lie beyond the displaced plane, so a face
/// touching the plane along an edge or at a vertex only yields a segment
/// when it continues across to `side`. Faces lying in the plane yield
/// nothing on either side. Segments run along `plane.normal × face.normal`,
/// so a solid's section loops come out counter-clockwise around the plane
/// normal.
pub fn plane_face_intersect(plane: &Plane, face: &Face, side: SectionSide, tol: &Tolerance) -> Vec<Segment> {
    let Some((origin, dir)) =
        plane_plane_line(&plane.normal, plane.offset, &face.normal, face.plane_offset(), tol.angular)
    else {
        return Vec::new();
    };
    let unit = dir.normalize();
    let eps = tol.linear;
    let beyond = |s: f64| match side {
        SectionSide::Above => s > eps,
        SectionSide::Below => s < -eps,
    };

    let mut hits: Vec<(f64, Point3<f64>)> = Vec::new();
    for ring in &face.loops {
        let n = ring.len();
        for k in 0..n {
            let a = face.pts[ring[k]];
            let b = face.pts[ring[(k + 1) % n]];
            let (sa, sb) = (plane.signed_distance(&a), plane.signed_distance(&b));
            if beyond(sa) == beyond(sb) {
                continue;
            }
            let x = if sa.abs() <= eps {
                a
            } else if sb.abs() <= eps {
                b
            } else {
                a + (b - a) * (sa / (sa - sb))
            };
            hits.push(((x - origin).dot(&unit), x));
        }
    }
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));

    // The displaced plane crosses the boundary transversally, so sorted hits
    // alternate between entering and leaving the face
    hits
        .chunks_exact(2)
        .filter(|pair| pair[1].0 - pair[0].0 > eps)
        .map(|pair| Segment { start: pair[0].1, end: pair[1].1 })
        .collect()
}

/// Chain section segments into closed loops in the plane with `normal`.
///
/// Endpoints are welded, segments are split where another segment ends in
/// their interior, opposite duplicates cancel and repeated ones collapse.
/// Whatever cannot be closed is dropped and counted.
pub fn detect_loop(segments: &[Segment], normal: &Vector3<f64>, tol: &Tolerance) -> SectionLoops {
    let eps = tol.linear;
    let projection = Projection::for_normal(normal);

    let mut points: Vec<Point3<f64>> = Vec::new();
    let mut weld = |p: Point3<f64>| -> usize {
        if let Some(i) = points.iter().position(|q| (q - p).norm() <= eps) {
            return i;
        }
        points.push(p);
        points.len() - 1
    };
    let raw: Vec<(usize, usize)> = segments
        .iter()
        .map(|s| (weld(s.start), weld(s.end)))
        .filter(|(a, b)| a != b)
        .collect();

    let flat = projection.project_all(&points);
    let mut edges = Vec::with_capacity(raw.len());
    for (a, b) in raw {
        let mut cuts: Vec<(f64, usize)> = (0..flat.len())
            .filter(|&v| v != a && v != b)
            .filter_map(|v| point_on_segment_interior(&flat[v], &flat[a], &flat[b], eps).map(|t| (t, v)))
            .collect();
        cuts.sort_by(|x, y| x.0.total_cmp(&y.0));
        let mut current = a;
        for (_, v) in cuts {
            edges.push((current, v));
            current = v;
        }
        edges.push((current, b));
    }

    let edges = normalize_edges(&edges);
    let traced = trace_loops(&edges, &flat);
    if traced.open_edges > 0 {
        warn!(dropped = traced.open_edges, "dropping unclosed section segments");
    }

    SectionLoops {
        loops: traced
            .loops
            .into_iter()
            .filter(|ring| ring.len() >= 3)
            .map(|ring| ring.into_iter().map(|i| points[i]).collect())
            .collect(),
        dropped_segments: traced.open_edges,
    }
}

/// Section of `b` on one side of `plane`, assembled into a clip region
fn section_region(plane: &Plane, b: &Solid, side: SectionSide, tol: &Tolerance) -> (Vec<Segment>, SectionLoops) {
    let segments: Vec<Segment> = b
        .faces
        .iter()
        .flat_map(|fb| plane_face_intersect(plane, fb, side, tol))
        .collect();
    let section = detect_loop(&segments, &plane.normal, tol);
    debug!(?side, segments = segments.len(), loops = section.loops.len(), "sectioned solid");
    (segments, section)
}

fn clip_region(section: SectionLoops, normal: &Vector3<f64>, tol: &Tolerance) -> Option<Face> {
    let regions = loops_to_faces(section.loops, normal, tol);
    (!regions.is_empty()).then(|| Face::merge_regions(*normal, &regions))
}

/// Split `faces` into their parts inside and outside `region`
fn split_by_region(faces: Vec<Face>, region: Option<&Face>, tol: &Tolerance) -> (Vec<Face>, Vec<Face>) {
    let Some(region) = region else {
        return (Vec::new(), faces);
    };
    let mut inside = Vec::new();
    let mut outside = Vec::new();
    for face in &faces {
        inside.extend(face_face_intersect(face, region, ClipMode::Inner, tol));
        outside.extend(face_face_intersect(face, region, ClipMode::Outer, tol));
    }
    (inside, outside)
}

/// Split `fa` into the parts inside and outside solid `b`.
///
/// `b` is sectioned just above and just below `fa`'s plane. Where faces of
/// `b` lie in the plane the two sections differ; then the face is split by
/// both, and the part over a flush face of `b` becomes its own fragment so
/// it can be matched against that face later.
pub fn face_body_intersect(fa: &Face, b: &Solid, tol: &Tolerance) -> FaceSplit {
    if !fa.bbox().overlaps(&b.bbox(), tol.linear) {
        return FaceSplit {
            outside: vec![fa.clone()],
            ..FaceSplit::default()
        };
    }

    let plane = Plane::of_face(fa);
    let (above, upper) = section_region(&plane, b, SectionSide::Above, tol);
    let (below, lower) = section_region(&plane, b, SectionSide::Below, tol);
    let mut dropped_segments = upper.dropped_segments;

    let (over, beside) = split_by_region(vec![fa.clone()], clip_region(upper, &fa.normal, tol).as_ref(), tol);
    if above == below {
        return FaceSplit {
            inside: over,
            outside: beside,
            dropped_segments,
        };
    }

    dropped_segments += lower.dropped_segments;
    let lower = clip_region(lower, &fa.normal, tol);
    let (through, flush_above) = split_by_region(over, lower.as_ref(), tol);
    let (flush_below, outside) = split_by_region(beside, lower.as_ref(), tol);
    FaceSplit {
        inside: through.into_iter().chain(flush_above).chain(flush_below).collect(),
        outside,
        dropped_segments,
    }
}
