// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for Boolean evaluation

use crate::config::{EngineConfig, Tolerance};
use crate::error::GeometryResult;
use crate::geometry::{body_body_bool, BooleanOp, BooleanOutcome, Solid};

/// Boolean kernel holding the engine configuration
#[derive(Debug, Clone, Default)]
pub struct BooleanKernel {
    config: EngineConfig,
}

impl BooleanKernel {
    /// Create a kernel with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Replace the linear tolerance
    pub fn with_tolerance(mut self, linear: f64) -> Self {
        self.config.tolerance = Tolerance::new(linear);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, a: &Solid, b: &Solid, op: BooleanOp) -> GeometryResult<BooleanOutcome> {
        body_body_bool(a, b, op, &self.config)
    }

    pub fn union(&self, a: &Solid, b: &Solid) -> GeometryResult<BooleanOutcome> {
        self.run(a, b, BooleanOp::Union)
    }

    pub fn intersect(&self, a: &Solid, b: &Solid) -> GeometryResult<BooleanOutcome> {
        self.run(a, b, BooleanOp::Intersect)
    }

    pub fn subtract(&self, a: &Solid, b: &Solid) -> GeometryResult<BooleanOutcome> {
        self.run(a, b, BooleanOp::Subtract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use crate::geometry::primitives::cuboid;
    use crate::geometry::Face;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_kernel_subtract_disjoint() {
        let kernel = BooleanKernel::default();
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = cuboid(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));

        let out = kernel.subtract(&a, &b).unwrap();
        assert_eq!(out.mesh.face_count(), 6);
        assert_relative_eq!(out.to_solid().volume(), 1.0, epsilon = 1e-12);

        let none = kernel.intersect(&a, &b).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_kernel_tolerance_override() {
        let kernel = BooleanKernel::default().with_tolerance(1e-6);
        assert_eq!(kernel.config().tolerance.linear, 1e-6);
    }

    #[test]
    fn test_kernel_rejects_malformed_input() {
        let kernel = BooleanKernel::default();
        let a = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let broken = Solid::new(vec![Face::new(
            Vector3::z(),
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![vec![0, 1]],
        )]);

        let err = kernel.union(&a, &broken).unwrap_err();
        assert!(matches!(err, GeometryError::TooFewVertices { face: 0, count: 2 }));
    }
}
