// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - planar B-rep faces, clipping and Boolean evaluation

pub mod analytics;
pub mod assembler;
pub mod bbox;
pub mod boolean;
pub mod bridge;
pub mod clipper;
pub mod compact;
pub mod face;
pub mod halfedge;
pub mod predicates;
pub mod primitives;
pub mod section;
pub(crate) mod trace;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use boolean::{body_body_bool, BooleanDiagnostics, BooleanOp, BooleanOutcome, FaceSets};
pub use clipper::{face_face_intersect, ClipMode};
pub use compact::{compact_vertices, CompactedSolid};
pub use face::{Coincidence, Face, FaceStatus, Solid};
pub use halfedge::{HalfEdge, HalfEdgeMesh, MeshFace, PairingReport};
pub use primitives::Primitive;
pub use section::{detect_loop, face_body_intersect, plane_face_intersect, FaceSplit, Plane, SectionSide, Segment};
