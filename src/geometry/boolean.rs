// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on planar B-rep solids
//!
//! Every face of each operand is split against the other solid, tagged with
//! where it ended up, and the tags decide which fragments form the result.

use super::compact::{compact_vertices, mark_coincident_faces, CompactedSolid};
use super::face::{Coincidence, Face, FaceStatus, Solid};
use super::halfedge::{HalfEdgeMesh, PairingReport};
use super::section::face_body_intersect;
use crate::config::{EngineConfig, Tolerance};
use crate::error::GeometryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersect,
    Subtract,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanOp::Union => write!(f, "union"),
            BooleanOp::Intersect => write!(f, "intersect"),
            BooleanOp::Subtract => write!(f, "subtract"),
        }
    }
}

/// The four classified fragment sets of one Boolean evaluation
#[derive(Debug, Clone, Default)]
pub struct FaceSets {
    pub a_in_b: Vec<Face>,
    pub a_out_b: Vec<Face>,
    pub b_in_a: Vec<Face>,
    pub b_out_a: Vec<Face>,
}

impl FaceSets {
    pub fn len(&self) -> usize {
        self.a_in_b.len() + self.a_out_b.len() + self.b_in_a.len() + self.b_out_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All fragments in set order, each tagged with its status
    pub fn into_tagged(self) -> Vec<Face> {
        let tag = |faces: Vec<Face>, status: FaceStatus| {
            faces.into_iter().map(move |f| f.with_status(status))
        };
        tag(self.a_in_b, FaceStatus::AInB)
            .chain(tag(self.a_out_b, FaceStatus::AOutB))
            .chain(tag(self.b_in_a, FaceStatus::BInA))
            .chain(tag(self.b_out_a, FaceStatus::BOutA))
            .collect()
    }
}

/// Counters collected while evaluating a Boolean
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanDiagnostics {
    /// Section segments dropped because they did not close into loops
    pub dropped_segments: usize,
    /// A-in-B / B-in-A fragment pairs covering the same polygon
    pub coincident_pairs: usize,
    /// Fragment counts: A in B, A out B, B in A, B out A
    pub fragments: [usize; 4],
    pub pairing: PairingReport,
}

/// Result of a Boolean evaluation
#[derive(Debug, Clone, Default)]
pub struct BooleanOutcome {
    pub compacted: CompactedSolid,
    pub mesh: HalfEdgeMesh,
    pub diagnostics: BooleanDiagnostics,
}

impl BooleanOutcome {
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Result faces with holes restored
    pub fn to_solid(&self) -> Solid {
        self.mesh.to_solid()
    }
}

/// Split every face of `a` against `b` and every face of `b` against `a`
pub fn classify_faces(a: &Solid, b: &Solid, tol: &Tolerance) -> (FaceSets, usize) {
    let mut sets = FaceSets::default();
    let mut dropped = 0;
    for fa in &a.faces {
        let split = face_body_intersect(fa, b, tol);
        sets.a_in_b.extend(split.inside);
        sets.a_out_b.extend(split.outside);
        dropped += split.dropped_segments;
    }
    for fb in &b.faces {
        let split = face_body_intersect(fb, a, tol);
        sets.b_in_a.extend(split.inside);
        sets.b_out_a.extend(split.outside);
        dropped += split.dropped_segments;
    }
    (sets, dropped)
}

/// Whether a tagged fragment belongs to the result, and reversed or not
fn keep_fragment(op: BooleanOp, status: Option<FaceStatus>, coincidence: Coincidence) -> Option<bool> {
    use FaceStatus::*;
    let same = coincidence == Coincidence::SameDirection;
    let opposite = coincidence == Coincidence::OppositeDirection;
    match (op, status?) {
        (BooleanOp::Union, AOutB | BOutA) => Some(false),
        (BooleanOp::Union, AInB) if same => Some(false),
        (BooleanOp::Intersect, AInB) if !opposite => Some(false),
        (BooleanOp::Intersect, BInA) if !coincidence.is_coincident() => Some(false),
        (BooleanOp::Subtract, AOutB) => Some(false),
        (BooleanOp::Subtract, AInB) if opposite => Some(false),
        (BooleanOp::Subtract, BInA) if !coincidence.is_coincident() => Some(true),
        _ => None,
    }
}

/// Pick the fragments that make up `op`'s result
pub fn select_faces(solid: &CompactedSolid, op: BooleanOp) -> CompactedSolid {
    let picks: Vec<(usize, bool)> = (0..solid.face_count())
        .filter_map(|f| keep_fragment(op, solid.status[f], solid.coincidence[f]).map(|rev| (f, rev)))
        .collect();
    solid.subset(&picks)
}

/// Evaluate `a op b`
#[instrument(skip_all, fields(op = %op, faces_a = a.len(), faces_b = b.len()))]
pub fn body_body_bool(a: &Solid, b: &Solid, op: BooleanOp, config: &EngineConfig) -> GeometryResult<BooleanOutcome> {
    a.validate()?;
    b.validate()?;
    let tol = &config.tolerance;

    let (sets, dropped_segments) = classify_faces(a, b, tol);
    let fragments = [sets.a_in_b.len(), sets.a_out_b.len(), sets.b_in_a.len(), sets.b_out_a.len()];
    debug!(?fragments, dropped_segments, "classified fragments");

    let mut compacted = compact_vertices(&sets.into_tagged(), tol);
    let coincident_pairs = mark_coincident_faces(&mut compacted);
    let selected = select_faces(&compacted, op);
    let (mesh, pairing) = HalfEdgeMesh::from_compacted(&selected);

    if config.validate_output {
        mesh.validate()?;
    }
    info!(
        faces = mesh.face_count(),
        vertices = mesh.vertex_count(),
        coincident_pairs,
        unpaired = pairing.unpaired,
        "boolean complete"
    );

    Ok(BooleanOutcome {
        compacted: selected,
        mesh,
        diagnostics: BooleanDiagnostics {
            dropped_segments,
            coincident_pairs,
            fragments,
            pairing,
        },
    })
}
