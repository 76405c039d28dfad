//! Thickness extrusion.
//!
//! Offsets the rim along the reversed averaged normal onto a parallel
//! "bottom" plane, chosen far enough out that the whole rim clears it by the
//! requested thickness, then stitches side walls between the two rims.
//! Closed fans get a wrap-around wall quad and a single bottom cap polygon;
//! open fans get an extended middle vertex on the bottom plane and a cap
//! quad at each end of the chain.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geom::{Plane, EPSILON};
use crate::mesh::{PolyMesh, VertexId};

use super::rim::{rim_triples, Rim};

/// A connector fragment after thickness extrusion.
///
/// Produced by [`extrude_thickness`]; consumed by
/// [`drill_holes`](super::holes::drill_holes).
#[derive(Debug, Clone)]
pub struct ExtrudedShell {
    pub(crate) mesh: PolyMesh,
    pub(crate) middle: VertexId,
    pub(crate) middle_position: Point3<f64>,
    pub(crate) closed: bool,
    pub(crate) top_rim: Vec<VertexId>,
    pub(crate) bottom_rim: Vec<VertexId>,
    pub(crate) extended_middle: Option<VertexId>,
    pub(crate) bottom_plane: Plane,
}

impl ExtrudedShell {
    /// The fragment mesh built so far.
    pub fn mesh(&self) -> &PolyMesh {
        &self.mesh
    }

    /// Whether the fan closes into a cycle.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of pairs the shell was built from.
    pub fn num_pairs(&self) -> usize {
        self.top_rim.len() / 2
    }

    /// The top rim vertices.
    pub fn top_rim(&self) -> &[VertexId] {
        &self.top_rim
    }

    /// The bottom rim vertices, paired index-for-index with the top rim.
    pub fn bottom_rim(&self) -> &[VertexId] {
        &self.bottom_rim
    }

    /// The extended middle vertex on the bottom plane (open fans only).
    pub fn extended_middle(&self) -> Option<VertexId> {
        self.extended_middle
    }

    /// The bottom offset plane.
    pub fn bottom_plane(&self) -> Plane {
        self.bottom_plane
    }

    /// Per-pair top rim triples `[edge, pair, edge]`.
    pub(crate) fn top_vert_triples(&self) -> Vec<[VertexId; 3]> {
        rim_triples(&self.top_rim, self.closed)
    }

    /// Per-pair bottom rim triples `[edge, pair, edge]`.
    pub(crate) fn bottom_vert_triples(&self) -> Vec<[VertexId; 3]> {
        rim_triples(&self.bottom_rim, self.closed)
    }
}

/// Extrude a rim to the given thickness.
///
/// The bottom plane's normal is the reversed averaged vertex normal; its
/// offset places it `thickness` beyond the rim vertex that reaches farthest
/// in that direction, so the extrusion fully clears the rim. Every rim
/// vertex (and, for open fans, the middle) is pushed onto the plane along
/// the plane normal to form the bottom rim.
///
/// Fails with [`MeshError::DegenerateGeometry`] when the averaged normal is
/// near zero (no usable plane).
pub fn extrude_thickness(rim: Rim, thickness: f64) -> Result<ExtrudedShell> {
    let norm = rim.normal.norm();
    if norm < EPSILON {
        return Err(MeshError::DegenerateGeometry {
            details: "near-zero averaged vertex normal".to_string(),
        });
    }
    let down: Vector3<f64> = -rim.normal / norm;

    let Rim {
        mut mesh,
        middle,
        middle_position,
        closed,
        top_rim,
        ..
    } = rim;

    // Farthest rim vertex along the downward normal, measured from the
    // middle-centered plane
    let mut farthest: f64 = 0.0;
    for &v in &top_rim {
        let h = down.dot(&(mesh.position(v) - middle_position));
        farthest = farthest.max(h);
    }

    let plane_point = middle_position + (farthest + thickness) * down;
    let bottom_plane = Plane::from_point_normal(&plane_point, down);

    // Project the top rim onto the bottom plane
    let mut bottom_rim = Vec::with_capacity(top_rim.len());
    for &v in &top_rim {
        let position = *mesh.position(v);
        let distance = bottom_plane.perpendicular_distance(&position)?;
        bottom_rim.push(mesh.add_vertex(position + distance * down));
    }

    let extended_middle = if closed {
        None
    } else {
        let distance = bottom_plane.perpendicular_distance(&middle_position)?;
        let extended = mesh.add_vertex(middle_position + distance * down);
        mesh.add_edge(middle, extended)?;
        Some(extended)
    };

    // Side walls between consecutive top/bottom vertex pairs
    for i in 0..top_rim.len() - 1 {
        mesh.add_face(&[top_rim[i], top_rim[i + 1], bottom_rim[i + 1], bottom_rim[i]])?;
    }

    if closed {
        let last = top_rim.len() - 1;
        mesh.add_face(&[top_rim[last], top_rim[0], bottom_rim[0], bottom_rim[last]])?;

        // Single bottom cap over the whole ring, wound opposite to the rim
        let cap: Vec<VertexId> = bottom_rim.iter().rev().copied().collect();
        mesh.add_face(&cap)?;
    } else {
        let extended = extended_middle.expect("open shell has an extended middle");
        let last = top_rim.len() - 1;
        mesh.add_face(&[middle, top_rim[0], bottom_rim[0], extended])?;
        mesh.add_face(&[top_rim[last], middle, extended, bottom_rim[last]])?;
    }

    Ok(ExtrudedShell {
        mesh,
        middle,
        middle_position,
        closed,
        top_rim,
        bottom_rim,
        extended_middle,
        bottom_plane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::build_adjacency;
    use crate::connector::pairs::{extract_pairs, sort_pairs};
    use crate::connector::rim::build_rim;
    use std::f64::consts::PI;

    fn closed_quad_fan() -> PolyMesh {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..8 {
            let angle = 2.0 * PI * k as f64 / 8.0;
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let ring = |k: usize| 1 + (k % 8);
        let faces: Vec<Vec<usize>> = (0..4)
            .map(|i| vec![0, ring(2 * i), ring(2 * i + 1), ring(2 * i + 2)])
            .collect();
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    fn open_triangle_fan() -> PolyMesh {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..4 {
            let angle = PI * k as f64 / 3.0;
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]];
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    fn shell_for(mesh: &PolyMesh, thickness: f64) -> ExtrudedShell {
        let adj = build_adjacency(mesh).unwrap();
        let center = VertexId::new(0);
        let fan = sort_pairs(center, extract_pairs(&adj, center).unwrap()).unwrap();
        let rim = build_rim(mesh, &adj, &fan, 0.5).unwrap();
        extrude_thickness(rim, thickness).unwrap()
    }

    #[test]
    fn test_closed_shell_walls_and_cap() {
        let mesh = closed_quad_fan();
        let shell = shell_for(&mesh, 0.3);

        assert!(shell.is_closed());
        assert!(shell.extended_middle().is_none());
        assert_eq!(shell.bottom_rim().len(), 8);
        // one wall quad per rim edge plus the single bottom cap
        assert_eq!(shell.mesh().num_faces(), 8 + 1);
        // middle + 8 top + 8 bottom
        assert_eq!(shell.mesh().num_vertices(), 17);
    }

    #[test]
    fn test_open_shell_extended_middle_and_end_caps() {
        let mesh = open_triangle_fan();
        let shell = shell_for(&mesh, 0.3);

        assert!(!shell.is_closed());
        assert!(shell.extended_middle().is_some());
        assert_eq!(shell.top_rim().len(), 7);
        assert_eq!(shell.bottom_rim().len(), 7);
        // 6 wall quads + 2 end caps
        assert_eq!(shell.mesh().num_faces(), 6 + 2);
        // middle + 7 top + 7 bottom + extended middle
        assert_eq!(shell.mesh().num_vertices(), 16);
    }

    #[test]
    fn test_bottom_rim_lies_on_bottom_plane() {
        let mesh = closed_quad_fan();
        let shell = shell_for(&mesh, 0.3);
        let plane = shell.bottom_plane();

        for &v in shell.bottom_rim() {
            let d = plane.perpendicular_distance(shell.mesh().position(v)).unwrap();
            assert!(d.abs() < 1e-9, "bottom vertex off plane by {}", d);
        }
    }

    #[test]
    fn test_bottom_plane_clears_rim_by_thickness() {
        // The planar fan's rim lies level with the middle, so the bottom
        // plane sits exactly `thickness` below it
        let mesh = closed_quad_fan();
        let thickness = 0.3;
        let shell = shell_for(&mesh, thickness);

        for (&top, &bottom) in shell.top_rim().iter().zip(shell.bottom_rim()) {
            let drop = (shell.mesh().position(top) - shell.mesh().position(bottom)).norm();
            assert!((drop - thickness).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_normal_fails() {
        // Hand-build a rim with a cancelled normal
        let mesh = closed_quad_fan();
        let adj = build_adjacency(&mesh).unwrap();
        let center = VertexId::new(0);
        let fan = sort_pairs(center, extract_pairs(&adj, center).unwrap()).unwrap();
        let mut rim = build_rim(&mesh, &adj, &fan, 0.5).unwrap();
        rim.normal = Vector3::zeros();

        let result = extrude_thickness(rim, 0.3);
        assert!(matches!(result, Err(MeshError::DegenerateGeometry { .. })));
    }
}
