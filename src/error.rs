// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use thiserror::Error;

/// Structural problems in solids handed to the engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("face {face} references point {index} but only {len} points exist")]
    IndexOutOfRange { face: usize, index: usize, len: usize },

    #[error("face {face} has {count} vertices, at least 3 are required")]
    TooFewVertices { face: usize, count: usize },

    #[error("face {face} has no usable normal (zero area)")]
    DegenerateFace { face: usize },

    #[error("half-edge {edge} is not part of a closed next-cycle")]
    OpenLoop { edge: usize },

    #[error("half-edge {edge} has asymmetric partner {partner}")]
    AsymmetricPartner { edge: usize, partner: usize },
}

/// OBJ syntax errors, reported with the offending line number
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObjError {
    #[error("line {line}: expected three coordinates in vertex record")]
    MissingCoordinate { line: usize },

    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: face index {index} is out of range")]
    BadIndex { line: usize, index: i64 },
}

pub type GeometryResult<T> = std::result::Result<T, GeometryError>;
