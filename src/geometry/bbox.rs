// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding box utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(&other.min);
        self.expand_to_include(&other.max);
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Closed overlap test, boxes touching within `eps` count as overlapping
    pub fn overlaps(&self, other: &BoundingBox, eps: f64) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (0..3).all(|k| self.min[k] <= other.max[k] + eps && other.min[k] <= self.max[k] + eps)
    }

    /// Whether `other` lies inside this box, allowing `eps` slack
    pub fn contains_box(&self, other: &BoundingBox, eps: f64) -> bool {
        (0..3).all(|k| self.min[k] - eps <= other.min[k] && other.max[k] <= self.max[k] + eps)
    }

    pub fn contains_point(&self, point: &Point3<f64>, eps: f64) -> bool {
        (0..3).all(|k| self.min[k] - eps <= point[k] && point[k] <= self.max[k] + eps)
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - other.min).abs().max() < tolerance && (self.max - other.max).abs().max() < tolerance
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let mut bbox = BoundingBox::empty();
        bbox.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        bbox.expand_to_include(&Point3::new(-1.0, -2.0, -3.0));

        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(bbox.center(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_touching_boxes_overlap() {
        let a = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = BoundingBox::new(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));

        assert!(a.overlaps(&b, 1e-10));
        assert!(!a.overlaps(&c, 1e-10));
        assert!(!a.overlaps(&BoundingBox::empty(), 1e-10));
    }

    #[test]
    fn test_containment() {
        let outer = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 0.0));
        let inner = BoundingBox::new(Point3::new(1.0, 1.0, 0.0), Point3::new(2.0, 2.0, 0.0));

        assert!(outer.contains_box(&inner, 1e-10));
        assert!(!inner.contains_box(&outer, 1e-10));
        assert!(outer.contains_point(&Point3::new(4.0, 0.0, 0.0), 1e-10));
    }
}
