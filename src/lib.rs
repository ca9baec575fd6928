// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidbool
//!
//! Face-by-face Boolean operations (union, intersection, difference) on
//! polyhedral solids with planar faces. Each face is clipped against the
//! other solid's cross-section, fragments are classified inside or outside,
//! and the selected fragments are welded into a half-edge mesh.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;

pub use config::{EngineConfig, Tolerance};
pub use error::{GeometryError, GeometryResult, ObjError};
pub use geometry::{BooleanOp, BooleanOutcome, Face, HalfEdgeMesh, Primitive, Solid};
pub use io::{read_obj, write_obj};
pub use kernel::BooleanKernel;

use anyhow::{Context, Result};
use std::path::Path;

/// Evaluate `a op b` with the default configuration
pub fn boolean(a: &Solid, b: &Solid, op: BooleanOp) -> GeometryResult<BooleanOutcome> {
    BooleanKernel::default().run(a, b, op)
}

/// Read two OBJ solids, evaluate `a op b` and return the result
pub fn boolean_files(a: impl AsRef<Path>, b: impl AsRef<Path>, op: BooleanOp, config: &EngineConfig) -> Result<BooleanOutcome> {
    let solid_a = read_obj(a)?;
    let solid_b = read_obj(b)?;
    geometry::body_body_bool(&solid_a, &solid_b, op, config).with_context(|| format!("Failed to evaluate {}", op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_basic_union() {
        let a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_solid().unwrap();
        let b = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_solid().unwrap();
        let result = boolean(&a, &b, BooleanOp::Union).unwrap();

        assert!(result.mesh.is_closed());
        assert_eq!(result.diagnostics.pairing.anomalies, 0);
        // Two unit cubes sharing an eighth of their volume
        assert_relative_eq!(result.to_solid().volume(), 1.875, epsilon = 1e-9);
    }
}
