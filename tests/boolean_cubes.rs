// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end Boolean scenarios on boxes

use approx::assert_relative_eq;
use nalgebra::{Point2, Point3};
use solidbool::geometry::primitives::{cuboid, prism};
use solidbool::{BooleanKernel, Solid};

fn centered_cube() -> Solid {
    cuboid(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5))
}

fn half_shifted_cube() -> Solid {
    cuboid(Point3::new(0.0, -0.5, -0.5), Point3::new(1.0, 0.5, 0.5))
}

fn unit_block() -> Solid {
    cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
}

/// Square bar running through the block along z
fn through_bar() -> Solid {
    cuboid(Point3::new(0.25, 0.25, -1.0), Point3::new(0.75, 0.75, 2.0))
}

/// Unit L-shaped prism with the square [0.5, 1]² cut out of it
fn l_prism() -> Solid {
    let base = [(0.0, 0.0), (1.0, 0.0), (1.0, 0.5), (0.5, 0.5), (0.5, 1.0), (0.0, 1.0)];
    prism(&base.map(|(x, y)| Point2::new(x, y)), 0.0, 1.0).unwrap()
}

/// Box filling the notch of the L prism exactly
fn notch_plug() -> Solid {
    cuboid(Point3::new(0.5, 0.5, 0.0), Point3::new(1.0, 1.0, 1.0))
}

#[test]
fn test_shifted_cubes_intersect() {
    let kernel = BooleanKernel::default();
    let out = kernel.intersect(&centered_cube(), &half_shifted_cube()).unwrap();

    assert_eq!(out.mesh.face_count(), 6);
    assert!(out.mesh.is_closed());
    assert_relative_eq!(out.to_solid().volume(), 0.5, epsilon = 1e-9);

    let bbox = out.to_solid().bbox();
    assert_relative_eq!(bbox.min, Point3::new(0.0, -0.5, -0.5), epsilon = 1e-12);
    assert_relative_eq!(bbox.max, Point3::new(0.5, 0.5, 0.5), epsilon = 1e-12);
}

#[test]
fn test_shifted_cubes_subtract() {
    let kernel = BooleanKernel::default();
    let out = kernel.subtract(&centered_cube(), &half_shifted_cube()).unwrap();

    assert_eq!(out.mesh.face_count(), 6);
    assert!(out.mesh.is_closed());
    assert_relative_eq!(out.to_solid().volume(), 0.5, epsilon = 1e-9);
}

#[test]
fn test_shifted_cubes_union_is_deterministic() {
    let kernel = BooleanKernel::default();
    let first = kernel.union(&centered_cube(), &half_shifted_cube()).unwrap();
    let second = kernel.union(&centered_cube(), &half_shifted_cube()).unwrap();

    assert_eq!(first.mesh.face_count(), 14);
    assert_eq!(first.mesh.face_count(), second.mesh.face_count());
    assert_eq!(first.mesh.points, second.mesh.points);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert!(first.mesh.is_closed());
    assert_relative_eq!(first.to_solid().volume(), 1.5, epsilon = 1e-9);
}

#[test]
fn test_subtract_then_intersect_is_empty() {
    let kernel = BooleanKernel::default();
    let difference = kernel.subtract(&centered_cube(), &half_shifted_cube()).unwrap();
    let remainder = difference.to_solid();

    let overlap = kernel.intersect(&remainder, &half_shifted_cube()).unwrap();
    assert!(overlap.is_empty());
    assert!(overlap.diagnostics.coincident_pairs >= 1);
}

#[test]
fn test_punch_through_subtract_leaves_tunnel() {
    let kernel = BooleanKernel::default();
    let out = kernel.subtract(&unit_block(), &through_bar()).unwrap();

    assert_eq!(out.mesh.face_count(), 10);
    assert!(out.mesh.is_closed());
    assert_eq!(out.diagnostics.pairing.anomalies, 0);
    // Top and bottom faces each carry one bridged hole
    assert_eq!(out.diagnostics.pairing.bridges, 2);
    assert_relative_eq!(out.to_solid().volume(), 0.75, epsilon = 1e-9);

    let solid = out.to_solid();
    let holed = solid.faces.iter().filter(|f| f.loops.len() == 2).count();
    assert_eq!(holed, 2);
}

#[test]
fn test_punch_through_intersect_and_union() {
    let kernel = BooleanKernel::default();

    let core = kernel.intersect(&unit_block(), &through_bar()).unwrap();
    assert_eq!(core.mesh.face_count(), 6);
    assert_relative_eq!(core.to_solid().volume(), 0.25, epsilon = 1e-9);

    let merged = kernel.union(&unit_block(), &through_bar()).unwrap();
    assert_eq!(merged.mesh.face_count(), 16);
    assert!(merged.mesh.is_closed());
    assert_relative_eq!(merged.to_solid().volume(), 1.5, epsilon = 1e-9);
}

#[test]
fn test_disjoint_union_keeps_both() {
    let kernel = BooleanKernel::default();
    let far = cuboid(Point3::new(3.0, 3.0, 3.0), Point3::new(4.0, 5.0, 6.0));
    let out = kernel.union(&unit_block(), &far).unwrap();

    assert_eq!(out.mesh.face_count(), 12);
    assert_eq!(out.mesh.vertex_count(), 16);
    assert_relative_eq!(out.to_solid().volume(), 1.0 + 6.0, epsilon = 1e-9);
}

#[test]
fn test_notch_plug_union_fills_block() {
    let kernel = BooleanKernel::default();
    let out = kernel.union(&l_prism(), &notch_plug()).unwrap();

    assert!(out.mesh.is_closed());
    assert_eq!(out.diagnostics.coincident_pairs, 2);
    assert_eq!(out.diagnostics.dropped_segments, 0);
    assert_eq!(out.diagnostics.pairing.anomalies, 0);
    assert_relative_eq!(out.to_solid().volume(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_notch_plug_subtract_keeps_l_prism() {
    let kernel = BooleanKernel::default();
    let out = kernel.subtract(&l_prism(), &notch_plug()).unwrap();

    assert_eq!(out.mesh.face_count(), 8);
    assert!(out.mesh.is_closed());
    assert_relative_eq!(out.to_solid().volume(), 0.75, epsilon = 1e-9);
}

#[test]
fn test_notch_plug_intersect_is_empty() {
    let kernel = BooleanKernel::default();
    let out = kernel.intersect(&l_prism(), &notch_plug()).unwrap();

    assert!(out.is_empty());
    assert_eq!(out.diagnostics.coincident_pairs, 2);
    assert_eq!(out.diagnostics.dropped_segments, 0);
}

#[test]
fn test_corner_removed_then_intersected_is_empty() {
    let kernel = BooleanKernel::default();
    let corner = cuboid(Point3::new(0.5, 0.5, 0.5), Point3::new(1.5, 1.5, 1.5));
    let notched = kernel.subtract(&unit_block(), &corner).unwrap();
    assert!(notched.mesh.is_closed());
    assert_relative_eq!(notched.to_solid().volume(), 0.875, epsilon = 1e-9);

    let overlap = kernel.intersect(&notched.to_solid(), &corner).unwrap();
    assert!(overlap.is_empty());
    assert_eq!(overlap.diagnostics.coincident_pairs, 3);
    assert_eq!(overlap.diagnostics.dropped_segments, 0);
}
