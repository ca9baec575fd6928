// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::bbox::BoundingBox;
use super::halfedge::HalfEdgeMesh;
use serde::{Deserialize, Serialize};

/// Statistics of a rebuilt Boolean result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshStats {
    /// Enclosed volume in cubic units
    pub volume: f64,
    /// Total face area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean of the vertex positions [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub face_count: usize,
    pub half_edge_count: usize,
    /// Half-edges with a partner on another face
    pub paired: usize,
    /// Half-edges that belong to hole bridges
    pub bridges: usize,
    /// Every non-bridge half-edge has a partner
    pub is_watertight: bool,
}

impl MeshStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            face_count: 0,
            half_edge_count: 0,
            paired: 0,
            bridges: 0,
            is_watertight: false,
        }
    }

    pub fn unpaired(&self) -> usize {
        self.half_edge_count - self.paired - self.bridges
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              SOLID ANALYTICS                             ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>12.6}                            ║", self.volume);
        println!("║ Surface Area:    {:>12.6}                            ║", self.surface_area);
        println!(
            "║ Centroid:        ({:>7.2}, {:>7.2}, {:>7.2})            ║",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        println!("║                                                          ║");
        println!("║ Bounding Box:                                            ║");
        println!(
            "║   Min: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!("║ Half-edges:      {:>10}                              ║", self.half_edge_count);
        println!("║   Paired:        {:>10}                              ║", self.paired);
        println!("║   Bridges:       {:>10}                              ║", self.bridges);
        println!("║   Unpaired:      {:>10}                              ║", self.unpaired());
        println!(
            "║ Watertight:      {:>10}                              ║",
            if self.is_watertight { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

impl Default for MeshStats {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute statistics for a half-edge mesh
pub fn analyze(mesh: &HalfEdgeMesh) -> MeshStats {
    if mesh.is_empty() || mesh.points.is_empty() {
        return MeshStats::empty();
    }

    let solid = mesh.to_solid();
    let bbox = BoundingBox::from_points(&mesh.points);
    let centroid = mesh
        .points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords)
        / mesh.points.len() as f64;

    let paired = mesh.half_edges.iter().filter(|he| he.partner.is_some()).count();
    let bridges = mesh.half_edges.iter().filter(|he| he.is_bridge()).count();

    MeshStats {
        volume: solid.volume(),
        surface_area: solid.surface_area(),
        bbox: [bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z],
        centroid: [centroid.x, centroid.y, centroid.z],
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        half_edge_count: mesh.half_edges.len(),
        paired,
        bridges,
        is_watertight: mesh.is_closed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerance;
    use crate::geometry::compact::compact_vertices;
    use crate::geometry::primitives::{cuboid, Primitive};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn mesh_of(solid: &crate::geometry::Solid) -> HalfEdgeMesh {
        HalfEdgeMesh::from_compacted(&compact_vertices(&solid.faces, &Tolerance::default())).0
    }

    #[test]
    fn test_analyze_cube() {
        let cube = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_solid().unwrap();
        let stats = analyze(&mesh_of(&cube));

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-9);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.face_count, 6);
        assert_eq!(stats.half_edge_count, 24);
        assert_eq!(stats.paired, 24);
        assert_eq!(stats.unpaired(), 0);
        assert!(stats.is_watertight);

        assert!(stats.centroid.iter().all(|c| c.abs() < 1e-12));
        assert_relative_eq!(stats.bbox[3] - stats.bbox[0], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_shell_not_watertight() {
        let mut cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        cube.faces.pop();
        let stats = analyze(&mesh_of(&cube));

        assert_eq!(stats.face_count, 5);
        assert_eq!(stats.unpaired(), 4);
        assert!(!stats.is_watertight);
    }

    #[test]
    fn test_empty_mesh_stats() {
        let stats = analyze(&HalfEdgeMesh::new());
        assert_eq!(stats.face_count, 0);
        assert_eq!(stats.volume, 0.0);
        assert!(!stats.is_watertight);
    }
}
