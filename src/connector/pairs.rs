//! Edge-pair extraction and fan ordering.
//!
//! Around a vertex, each incident face contributes the two of its edges that
//! meet at that vertex, an [`EdgePair`]. Reordering those pairs so that each
//! pair hands its second edge to the next pair's first edge reconstructs the
//! cyclic or chain-like arrangement of the faces: a constrained Eulerian
//! path/cycle over a small multigraph whose nodes are edges and whose links
//! are faces.

use std::collections::HashMap;

use crate::adjacency::AdjacencyIndex;
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, VertexId};

/// The two edges of one face that meet at a given vertex.
///
/// Unordered as extracted; [`sort_pairs`] orients each pair so that `first`
/// continues the previous pair's `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePair {
    /// The first edge of the pair.
    pub first: EdgeId,
    /// The second edge of the pair.
    pub second: EdgeId,
}

impl EdgePair {
    /// Create a pair from two edges.
    pub fn new(first: EdgeId, second: EdgeId) -> Self {
        Self { first, second }
    }

    /// Whether the pair contains the given edge.
    #[inline]
    pub fn contains(&self, edge: EdgeId) -> bool {
        self.first == edge || self.second == edge
    }

    /// The pair oriented so that `first == connect`.
    fn oriented_from(self, connect: EdgeId) -> Self {
        if self.first == connect {
            self
        } else {
            Self::new(self.second, self.first)
        }
    }
}

/// The ordered pair sequence around one vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedFan {
    /// The vertex the fan is centered on.
    pub vertex: VertexId,
    /// Pairs ordered so `pairs[i].second == pairs[i + 1].first`.
    pub pairs: Vec<EdgePair>,
    /// Whether the fan closes into a cycle (the last pair's second edge
    /// equals the first pair's first edge).
    pub closed: bool,
}

/// Extract the unordered edge pairs around a vertex.
///
/// For each face incident to `vertex`, the face's edges incident to `vertex`
/// must number exactly two (one pair per face); any other count means the
/// face loop visits the vertex more than once or the topology is otherwise
/// non-manifold, and the vertex fails with [`MeshError::NonManifoldVertex`].
pub fn extract_pairs(adj: &AdjacencyIndex, vertex: VertexId) -> Result<Vec<EdgePair>> {
    let edges = adj.edges_at(vertex);
    let faces = adj.faces_at(vertex);

    let mut pairs = Vec::with_capacity(faces.len());
    for &face in faces {
        let incident: Vec<EdgeId> = edges
            .iter()
            .copied()
            .filter(|&e| adj.faces_of_edge(e).contains(&face))
            .collect();
        if incident.len() != 2 {
            return Err(MeshError::NonManifoldVertex {
                vertex,
                details: format!(
                    "face {:?} contributes {} incident edges, expected 2",
                    face,
                    incident.len()
                ),
            });
        }
        pairs.push(EdgePair::new(incident[0], incident[1]));
    }
    Ok(pairs)
}

/// Reorder extracted pairs into a single chain or cycle.
///
/// An edge used by exactly one pair is a chain endpoint; an edge used by two
/// pairs is interior. If a degree-1 edge exists, the walk starts there and
/// the fan is open; otherwise it starts at the first pair's first edge (any
/// start of a cycle is equivalent under rotation). Each step consumes the
/// first remaining pair containing the connect edge, orients it, and hands
/// its other edge on.
///
/// Fails with [`MeshError::NonManifoldVertex`] when pairs remain but none
/// contains the connect edge: the fan has more than one connected component
/// and is rejected rather than silently truncated.
pub fn sort_pairs(vertex: VertexId, pairs: Vec<EdgePair>) -> Result<SortedFan> {
    if pairs.is_empty() {
        return Err(MeshError::NonManifoldVertex {
            vertex,
            details: "no edge pairs to sort".to_string(),
        });
    }

    let mut occurrences: HashMap<EdgeId, usize> = HashMap::new();
    for pair in &pairs {
        *occurrences.entry(pair.first).or_insert(0) += 1;
        *occurrences.entry(pair.second).or_insert(0) += 1;
    }

    // First boundary edge in pair order, if any; otherwise an arbitrary
    // cycle start.
    let start = pairs
        .iter()
        .flat_map(|p| [p.first, p.second])
        .find(|e| occurrences[e] == 1)
        .unwrap_or(pairs[0].first);

    let mut remaining = pairs;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut connect = start;

    while !remaining.is_empty() {
        let index = remaining
            .iter()
            .position(|p| p.contains(connect))
            .ok_or_else(|| MeshError::NonManifoldVertex {
                vertex,
                details: format!(
                    "disconnected fan: {} pair(s) unreachable from {:?}",
                    remaining.len(),
                    connect
                ),
            })?;
        let pair = remaining.remove(index).oriented_from(connect);
        connect = pair.second;
        ordered.push(pair);
    }

    let closed = ordered.last().unwrap().second == ordered.first().unwrap().first;
    Ok(SortedFan { vertex, pairs: ordered, closed })
}
