// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ reader and writer
//!
//! Only `v` and `f` records are interpreted. Faces with holes are written as
//! a single bridged loop, the same representation the half-edge mesh uses.

use crate::error::{GeometryResult, ObjError};
use crate::geometry::{HalfEdgeMesh, Solid};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Vertex and polygon records of an OBJ file, zero-based
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub points: Vec<Point3<f64>>,
    pub polygons: Vec<Vec<usize>>,
}

impl ObjData {
    pub fn into_solid(self) -> GeometryResult<Solid> {
        Solid::from_indexed(&self.points, &self.polygons)
    }
}

/// Parse OBJ text. Face tokens may carry `/t/n` suffixes and negative
/// (relative) indices.
pub fn parse_obj(source: &str) -> std::result::Result<ObjData, ObjError> {
    let mut data = ObjData::default();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in coords.iter_mut() {
                    let token = tokens.next().ok_or(ObjError::MissingCoordinate { line })?;
                    *c = token.parse().map_err(|_| ObjError::InvalidNumber {
                        line,
                        token: token.to_string(),
                    })?;
                }
                data.points.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let polygon = tokens
                    .map(|token| resolve_index(token, data.points.len(), line))
                    .collect::<std::result::Result<Vec<usize>, ObjError>>()?;
                data.polygons.push(polygon);
            }
            _ => {}
        }
    }
    Ok(data)
}

fn resolve_index(token: &str, count: usize, line: usize) -> std::result::Result<usize, ObjError> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        token: token.to_string(),
    })?;
    let resolved = if index > 0 {
        index - 1
    } else {
        count as i64 + index
    };
    if index == 0 || resolved < 0 || resolved >= count as i64 {
        return Err(ObjError::BadIndex { line, index });
    }
    Ok(resolved as usize)
}

/// Read an OBJ file into a solid
pub fn read_obj(path: impl AsRef<Path>) -> Result<Solid> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read OBJ file: {:?}", path))?;
    let data = parse_obj(&source).with_context(|| format!("Failed to parse OBJ file: {:?}", path))?;
    debug!(points = data.points.len(), polygons = data.polygons.len(), "parsed OBJ");
    let solid = data
        .into_solid()
        .with_context(|| format!("Invalid solid in OBJ file: {:?}", path))?;
    Ok(solid)
}

/// Serialize a mesh, one `f` record per face loop
pub fn to_obj_string(mesh: &HalfEdgeMesh) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# solidbool {}", env!("CARGO_PKG_VERSION"));
    for p in &mesh.points {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for f in 0..mesh.face_count() {
        out.push('f');
        for v in mesh.face_loop(f) {
            let _ = write!(out, " {}", v + 1);
        }
        out.push('\n');
    }
    out
}

/// Write a mesh to an OBJ file
pub fn write_obj(mesh: &HalfEdgeMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_obj_string(mesh)).with_context(|| format!("Failed to write OBJ file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerance;
    use crate::geometry::compact::compact_vertices;
    use crate::geometry::primitives::cuboid;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    fn cube_mesh() -> HalfEdgeMesh {
        let cube = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        HalfEdgeMesh::from_compacted(&compact_vertices(&cube.faces, &Tolerance::default())).0
    }

    #[test]
    fn test_parse_vertices_and_faces() {
        let src = "# comment\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1/1/1 2/2/1 -1\n";
        let data = parse_obj(src).unwrap();
        assert_eq!(data.points.len(), 3);
        assert_eq!(data.polygons, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        assert_eq!(parse_obj("v 1 2\n"), Err(ObjError::MissingCoordinate { line: 1 }));
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 x 0\n"),
            Err(ObjError::InvalidNumber { line: 2, token: "x".to_string() })
        );
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n"),
            Err(ObjError::BadIndex { line: 4, index: 4 })
        );
        assert_eq!(
            parse_obj("v 0 0 0\nf 0 1 1\n"),
            Err(ObjError::BadIndex { line: 2, index: 0 })
        );
    }

    #[test]
    fn test_string_round_trip_keeps_winding() {
        let mesh = cube_mesh();
        let data = parse_obj(&to_obj_string(&mesh)).unwrap();

        assert_eq!(data.points, mesh.points);
        let loops: Vec<Vec<usize>> = (0..mesh.face_count()).map(|f| mesh.face_loop(f)).collect();
        assert_eq!(data.polygons, loops);
    }

    #[test]
    fn test_file_round_trip() -> Result<()> {
        let file = NamedTempFile::new()?;
        write_obj(&cube_mesh(), file.path())?;

        let solid = read_obj(file.path())?;
        assert_eq!(solid.len(), 6);
        assert_relative_eq!(solid.volume(), 6.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_obj("/nonexistent/solid.obj").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read OBJ file"));
    }
}
