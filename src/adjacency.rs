//! Derived mesh adjacency.
//!
//! [`AdjacencyIndex`] holds the three multi-valued mappings connector
//! generation needs (vertex to edges, vertex to faces, edge to faces) plus
//! the per-vertex averaged face normal. It is built once per input mesh, is
//! read-only afterwards, and can be shared freely across parallel per-vertex
//! workers.
//!
//! The per-key value lists preserve insertion order: edges in edge-creation
//! order, faces in face-creation order.

use nalgebra::Vector3;

use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, FaceId, PolyMesh, VertexId};

/// Read-only adjacency mappings and averaged vertex normals for a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyIndex {
    vertex_edges: Vec<Vec<EdgeId>>,
    vertex_faces: Vec<Vec<FaceId>>,
    edge_faces: Vec<Vec<FaceId>>,
    vertex_normals: Vec<Vector3<f64>>,
}

impl AdjacencyIndex {
    /// Edges incident to a vertex, in edge-creation order.
    #[inline]
    pub fn edges_at(&self, v: VertexId) -> &[EdgeId] {
        &self.vertex_edges[v.index()]
    }

    /// Faces incident to a vertex, in face-creation order.
    #[inline]
    pub fn faces_at(&self, v: VertexId) -> &[FaceId] {
        &self.vertex_faces[v.index()]
    }

    /// Faces incident to an edge, in face-creation order.
    #[inline]
    pub fn faces_of_edge(&self, e: EdgeId) -> &[FaceId] {
        &self.edge_faces[e.index()]
    }

    /// The averaged face normal at a vertex (mean of incident-face unit
    /// normals; in general not unit length itself).
    #[inline]
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        self.vertex_normals[v.index()]
    }
}

/// Build the adjacency mappings and averaged vertex normals for a mesh.
///
/// Every vertex and edge of the mesh gets an entry in each mapping. Fails
/// with [`MeshError::DegenerateTopology`] if any vertex has no incident
/// faces, because no averaged normal exists for it; a zero stand-in would
/// silently corrupt all downstream plane math.
pub fn build_adjacency(mesh: &PolyMesh) -> Result<AdjacencyIndex> {
    let mut vertex_edges = vec![Vec::new(); mesh.num_vertices()];
    let mut vertex_faces = vec![Vec::new(); mesh.num_vertices()];
    let mut edge_faces = vec![Vec::new(); mesh.num_edges()];

    for e in mesh.edge_ids() {
        for v in mesh.edge(e) {
            vertex_edges[v.index()].push(e);
        }
    }

    for f in mesh.face_ids() {
        for &v in mesh.face(f) {
            vertex_faces[v.index()].push(f);
        }
        for e in mesh.face_edges(f) {
            edge_faces[e.index()].push(f);
        }
    }

    let mut vertex_normals = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        let faces = &vertex_faces[v.index()];
        if faces.is_empty() {
            return Err(MeshError::DegenerateTopology { vertex: v });
        }
        let mut sum = Vector3::zeros();
        for &f in faces {
            sum += mesh.face_normal(f)?;
        }
        vertex_normals.push(sum / faces.len() as f64);
    }

    Ok(AdjacencyIndex {
        vertex_edges,
        vertex_faces,
        edge_faces,
        vertex_normals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::f64::consts::PI;

    /// A closed fan of 4 quads around a center vertex (vertex 0), with an
    /// 8-vertex ring in the z = 0 plane.
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

    /// An open fan of 3 triangles around a center vertex (vertex 0).
    fn open_triangle_fan() -> PolyMesh {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..4 {
            let angle = PI * k as f64 / 3.0;
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]];
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    #[test]
    fn test_closed_fan_counts() {
        let mesh = closed_quad_fan();
        let adj = build_adjacency(&mesh).unwrap();
        let center = VertexId::new(0);

        assert_eq!(adj.edges_at(center).len(), 4);
        assert_eq!(adj.faces_at(center).len(), 4);

        // Every spoke edge is shared by exactly two quads
        for &e in adj.edges_at(center) {
            assert_eq!(adj.faces_of_edge(e).len(), 2);
        }
    }

    #[test]
    fn test_open_fan_counts() {
        let mesh = open_triangle_fan();
        let adj = build_adjacency(&mesh).unwrap();
        let center = VertexId::new(0);

        assert_eq!(adj.edges_at(center).len(), 4);
        assert_eq!(adj.faces_at(center).len(), 3);

        // Two boundary spokes with one face, two interior spokes with two
        let mut face_counts: Vec<usize> = adj
            .edges_at(center)
            .iter()
            .map(|&e| adj.faces_of_edge(e).len())
            .collect();
        face_counts.sort_unstable();
        assert_eq!(face_counts, vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_faces_preserve_insertion_order() {
        let mesh = open_triangle_fan();
        let adj = build_adjacency(&mesh).unwrap();
        let faces = adj.faces_at(VertexId::new(0));
        let indices: Vec<usize> = faces.iter().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_averaged_normal_of_planar_fan() {
        let mesh = closed_quad_fan();
        let adj = build_adjacency(&mesh).unwrap();
        let n = adj.vertex_normal(VertexId::new(0));
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_isolated_vertex_is_degenerate_topology() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            // Vertex 3 belongs to no face
            Point3::new(9.0, 9.0, 9.0),
        ];
        let faces = vec![vec![0, 1, 2]];
        let mesh = PolyMesh::from_polygons(&positions, &faces).unwrap();

        let result = build_adjacency(&mesh);
        assert!(matches!(
            result,
            Err(MeshError::DegenerateTopology { vertex }) if vertex == VertexId::new(3)
        ));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mesh = closed_quad_fan();
        let first = build_adjacency(&mesh).unwrap();
        let second = build_adjacency(&mesh).unwrap();
        assert_eq!(first, second);
    }
}
