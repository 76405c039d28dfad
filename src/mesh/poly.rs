//! Polygon mesh container.
//!
//! [`PolyMesh`] is an owning, append-only container of vertices, edges, and
//! faces. Vertices carry only a position; edges are unordered, deduplicated
//! vertex pairs; faces are ordered vertex loops of three or more vertices.
//!
//! Connector generation only ever appends new geometry (existing entries are
//! never mutated in place), so ids handed out by the mutators stay valid for
//! the lifetime of the mesh.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geom;

use super::index::{EdgeId, FaceId, VertexId};

/// An append-only polygon mesh: positions, unique edges, and face loops.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    positions: Vec<Point3<f64>>,
    edges: Vec<[VertexId; 2]>,
    faces: Vec<Vec<VertexId>>,
    /// Canonical (lower index first) endpoint pair -> edge id.
    edge_lookup: HashMap<(usize, usize), EdgeId>,
}

impl PolyMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from vertex positions and polygon face loops.
    ///
    /// Each face is a loop of vertex indices (triangles and quads in typical
    /// input, but any loop of three or more is accepted). The edges implied
    /// by the face loops are created and deduplicated automatically.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyMesh`] when `faces` is empty,
    /// [`MeshError::InvalidVertexIndex`] for out-of-range indices, and
    /// [`MeshError::DegenerateFace`] for loops that are too short or repeat
    /// a vertex.
    pub fn from_polygons(positions: &[Point3<f64>], faces: &[Vec<usize>]) -> Result<Self> {
        if faces.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        for (fi, face) in faces.iter().enumerate() {
            for &vi in face {
                if vi >= positions.len() {
                    return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
                }
            }
        }

        let mut mesh = Self::new();
        for &pos in positions {
            mesh.add_vertex(pos);
        }
        for face in faces {
            let loop_ids: Vec<VertexId> = face.iter().map(|&vi| VertexId::new(vi)).collect();
            mesh.add_face(&loop_ids)?;
        }
        Ok(mesh)
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// Get the two endpoints of an edge.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> [VertexId; 2] {
        self.edges[e.index()]
    }

    /// Get the vertex loop of a face.
    #[inline]
    pub fn face(&self, f: FaceId) -> &[VertexId] {
        &self.faces[f.index()]
    }

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.num_vertices()).map(VertexId::new)
    }

    /// Iterate over all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.num_edges()).map(EdgeId::new)
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.num_faces()).map(FaceId::new)
    }

    /// Look up the edge connecting two vertices, if present.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_lookup.get(&canonical(a, b)).copied()
    }

    /// Compute the normal of a face from its first three vertices.
    ///
    /// Right-hand rule from `(v1 - v0) x (v2 - v0)`, normalized. Fails with
    /// [`MeshError::DegenerateGeometry`] when the three points are collinear.
    pub fn face_normal(&self, f: FaceId) -> Result<Vector3<f64>> {
        let face = self.face(f);
        geom::triangle_normal(
            self.position(face[0]),
            self.position(face[1]),
            self.position(face[2]),
        )
    }

    // ==================== Mutators ====================

    /// Append a new vertex at the given position.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.positions.len());
        self.positions.push(position);
        id
    }

    /// Append an edge between two distinct vertices.
    ///
    /// Edges are unordered and deduplicated: adding an edge that already
    /// exists returns the existing id.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        if a == b {
            return Err(MeshError::DegenerateEdge { vertex: a });
        }
        debug_assert!(a.index() < self.num_vertices() && b.index() < self.num_vertices());

        if let Some(existing) = self.edge_between(a, b) {
            return Ok(existing);
        }
        let id = EdgeId::new(self.edges.len());
        self.edges.push([a, b]);
        self.edge_lookup.insert(canonical(a, b), id);
        Ok(id)
    }

    /// Append a face from an ordered vertex loop, creating any missing edges
    /// along the loop.
    ///
    /// The loop must have at least three vertices, all in range, with no
    /// repeats.
    pub fn add_face(&mut self, loop_verts: &[VertexId]) -> Result<FaceId> {
        let fi = self.faces.len();
        if loop_verts.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for &v in loop_verts {
            if v.index() >= self.num_vertices() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: v.index() });
            }
        }
        for (i, &v) in loop_verts.iter().enumerate() {
            if loop_verts[i + 1..].contains(&v) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }

        for i in 0..loop_verts.len() {
            let a = loop_verts[i];
            let b = loop_verts[(i + 1) % loop_verts.len()];
            self.add_edge(a, b)?;
        }

        let id = FaceId::new(fi);
        self.faces.push(loop_verts.to_vec());
        Ok(id)
    }

    /// Edges of a face, in loop order.
    pub fn face_edges(&self, f: FaceId) -> Vec<EdgeId> {
        let face = self.face(f);
        (0..face.len())
            .map(|i| {
                let a = face[i];
                let b = face[(i + 1) % face.len()];
                // add_face created this edge
                self.edge_between(a, b).expect("face edge missing from edge table")
            })
            .collect()
    }
}

#[inline]
fn canonical(a: VertexId, b: VertexId) -> (usize, usize) {
    if a.index() < b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    }
}
