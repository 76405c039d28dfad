//! Rim ("hat") construction.
//!
//! The first geometric stage of a connector: a ring of new vertices around
//! the middle vertex, following the ordered pair sequence. For each pair an
//! "edge vertex" is placed along the pair's first edge and a "pair vertex"
//! along the bisector of the pair's two edge directions; open fans get one
//! trailing edge vertex for the last pair's second edge.
//!
//! The rim therefore holds `2 * pairs` vertices when closed and
//! `2 * pairs + 1` when open, ordered `[edge, pair, edge, pair, ..., edge]`.

use nalgebra::{Point3, Vector3};

use crate::adjacency::AdjacencyIndex;
use crate::error::{MeshError, Result};
use crate::geom::{self, EPSILON};
use crate::mesh::{PolyMesh, VertexId};

use super::pairs::SortedFan;

/// A connector fragment after rim construction.
///
/// Produced by [`build_rim`]; consumed by
/// [`extrude_thickness`](super::thickness::extrude_thickness).
#[derive(Debug, Clone)]
pub struct Rim {
    pub(crate) mesh: PolyMesh,
    pub(crate) middle: VertexId,
    pub(crate) middle_position: Point3<f64>,
    pub(crate) normal: Vector3<f64>,
    pub(crate) closed: bool,
    pub(crate) top_rim: Vec<VertexId>,
}

impl Rim {
    /// The fragment mesh built so far.
    pub fn mesh(&self) -> &PolyMesh {
        &self.mesh
    }

    /// The middle vertex (copy of the input vertex) in the fragment.
    pub fn middle(&self) -> VertexId {
        self.middle
    }

    /// Whether the fan closes into a cycle.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of pairs the rim was built from.
    pub fn num_pairs(&self) -> usize {
        // 2n vertices when closed, 2n + 1 when open
        self.top_rim.len() / 2
    }

    /// The rim vertices, ordered `[edge, pair, edge, pair, ..., edge]`.
    pub fn top_rim(&self) -> &[VertexId] {
        &self.top_rim
    }

    /// Per-pair rim triples `[edge, pair, edge]`.
    ///
    /// For pair `i` this is `rim[2i..2i+3]`; for the last pair of a closed
    /// rim the triple wraps around to include `rim[0]`.
    pub fn top_vert_triples(&self) -> Vec<[VertexId; 3]> {
        rim_triples(&self.top_rim, self.closed)
    }
}

/// Per-pair `[edge, pair, edge]` triples of a rim vertex sequence.
pub(crate) fn rim_triples(rim: &[VertexId], closed: bool) -> Vec<[VertexId; 3]> {
    let num_pairs = rim.len() / 2;
    (0..num_pairs)
        .map(|i| {
            let third = if closed && i + 1 == num_pairs {
                rim[0]
            } else {
                rim[2 * i + 2]
            };
            [rim[2 * i], rim[2 * i + 1], third]
        })
        .collect()
}

/// Build the rim of a connector from a sorted fan.
///
/// Creates a fresh fragment mesh containing the middle vertex (a copy of the
/// fan's vertex), the rim vertices at `rim_distance` from it, and a spoke
/// edge from the middle to each edge vertex.
///
/// Fails with [`MeshError::DegenerateGeometry`] for zero-length source edges
/// or a pair whose two edge directions cancel (no bisector).
pub fn build_rim(
    source: &PolyMesh,
    adj: &AdjacencyIndex,
    fan: &SortedFan,
    rim_distance: f64,
) -> Result<Rim> {
    let middle_position = *source.position(fan.vertex);
    let normal = adj.vertex_normal(fan.vertex);

    let mut mesh = PolyMesh::new();
    let middle = mesh.add_vertex(middle_position);
    let mut top_rim = Vec::with_capacity(2 * fan.pairs.len() + 1);

    for pair in &fan.pairs {
        let dir_first = geom::edge_direction(source, pair.first, fan.vertex)?;
        let dir_second = geom::edge_direction(source, pair.second, fan.vertex)?;

        let edge_vert = mesh.add_vertex(middle_position + rim_distance * dir_first);
        mesh.add_edge(middle, edge_vert)?;
        top_rim.push(edge_vert);

        let bisector = dir_first + dir_second;
        let norm = bisector.norm();
        if norm < EPSILON {
            return Err(MeshError::DegenerateGeometry {
                details: format!(
                    "pair ({:?}, {:?}) has opposite edge directions, bisector undefined",
                    pair.first, pair.second
                ),
            });
        }
        let pair_vert = mesh.add_vertex(middle_position + rim_distance * (bisector / norm));
        top_rim.push(pair_vert);
    }

    if !fan.closed {
        // Trailing edge vertex for the open end
        let last = fan.pairs.last().expect("sorted fan is never empty");
        let dir = geom::edge_direction(source, last.second, fan.vertex)?;
        let edge_vert = mesh.add_vertex(middle_position + rim_distance * dir);
        mesh.add_edge(middle, edge_vert)?;
        top_rim.push(edge_vert);
    }

    Ok(Rim {
        mesh,
        middle,
        middle_position,
        normal,
        closed: fan.closed,
        top_rim,
    })
}
