//! Per-vertex connector generation.
//!
//! The pipeline runs in four stages, each producing a type that only exposes
//! the fields valid at that stage:
//!
//! 1. [`pairs`]: extract and sort the edge pairs around a vertex into a
//!    [`SortedFan`]
//! 2. [`rim`]: place the ring of rim vertices ([`Rim`])
//! 3. [`thickness`]: extrude to the bottom plane ([`ExtrudedShell`])
//! 4. [`holes`]: drill the bolt/nut sockets and close the surface
//!    ([`Connector`])
//!
//! [`build_connector`] runs the stages for one vertex;
//! [`build_connectors`] runs every vertex of a mesh in parallel. Connectors
//! are independent of each other, sharing only the read-only
//! [`AdjacencyIndex`](crate::adjacency::AdjacencyIndex), so one vertex's
//! failure never affects the rest of the batch.

pub mod holes;
pub mod pairs;
pub mod progress;
pub mod rim;
pub mod thickness;

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::adjacency::{build_adjacency, AdjacencyIndex};
use crate::error::Result;
use crate::mesh::{PolyMesh, VertexId};

pub use holes::{drill_holes, Connector, HoleOptions, PairSockets};
pub use pairs::{extract_pairs, sort_pairs, EdgePair, SortedFan};
pub use progress::Progress;
pub use rim::{build_rim, Rim};
pub use thickness::{extrude_thickness, ExtrudedShell};

/// Parameters for connector generation.
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    /// Distance from the middle vertex to the rim vertices.
    pub rim_distance: f64,
    /// Extrusion thickness beyond the farthest rim vertex.
    pub thickness: f64,
    /// Socket drilling parameters.
    pub holes: HoleOptions,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            rim_distance: 0.5,
            thickness: 0.3,
            holes: HoleOptions::default(),
        }
    }
}

/// Run the full pipeline for a single vertex.
pub fn build_connector(
    mesh: &PolyMesh,
    adj: &AdjacencyIndex,
    vertex: VertexId,
    options: &ConnectorOptions,
) -> Result<Connector> {
    let extracted = extract_pairs(adj, vertex)?;
    let fan = sort_pairs(vertex, extracted)?;
    let rim = build_rim(mesh, adj, &fan, options.rim_distance)?;
    let shell = extrude_thickness(rim, options.thickness)?;
    drill_holes(shell, &options.holes)
}

/// Build a connector for every vertex of a mesh, in parallel.
///
/// The adjacency index is built once and shared read-only across the rayon
/// workers. The outer `Result` covers adjacency construction (which fails
/// for meshes with isolated vertices); each vertex then carries its own
/// `Result`, so structural faults at one vertex leave the rest of the batch
/// intact.
pub fn build_connectors(
    mesh: &PolyMesh,
    options: &ConnectorOptions,
) -> Result<Vec<(VertexId, Result<Connector>)>> {
    let adj = build_adjacency(mesh)?;
    Ok((0..mesh.num_vertices())
        .into_par_iter()
        .map(|i| {
            let vertex = VertexId::new(i);
            (vertex, build_connector(mesh, &adj, vertex, options))
        })
        .collect())
}

/// [`build_connectors`] with per-vertex progress reporting.
pub fn build_connectors_with_progress(
    mesh: &PolyMesh,
    options: &ConnectorOptions,
    progress: &Progress,
) -> Result<Vec<(VertexId, Result<Connector>)>> {
    let adj = build_adjacency(mesh)?;
    let total = mesh.num_vertices();
    let finished = AtomicUsize::new(0);

    Ok((0..total)
        .into_par_iter()
        .map(|i| {
            let vertex = VertexId::new(i);
            let result = build_connector(mesh, &adj, vertex, options);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            progress.report(done, total, "Building connectors");
            (vertex, result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn quad_cube() -> PolyMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // bottom
            vec![4, 5, 6, 7], // top
            vec![0, 1, 5, 4], // front
            vec![2, 3, 7, 6], // back
            vec![0, 4, 7, 3], // left
            vec![1, 2, 6, 5], // right
        ];
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    #[test]
    fn test_cube_batch_all_closed() {
        let mesh = quad_cube();
        let results = build_connectors(&mesh, &ConnectorOptions::default()).unwrap();

        assert_eq!(results.len(), 8);
        for (vertex, result) in results {
            let connector = result.unwrap_or_else(|e| panic!("{:?} failed: {}", vertex, e));
            // Each cube corner is a closed fan of 3 quads
            assert!(connector.is_closed());
            assert_eq!(connector.num_pairs(), 3);
            assert_eq!(connector.top_rim().len(), 6);
        }
    }

    #[test]
    fn test_fragments_are_disjoint_from_input() {
        let mesh = quad_cube();
        let input_vertices = mesh.num_vertices();
        let results = build_connectors(&mesh, &ConnectorOptions::default()).unwrap();

        // Building fragments never touches the input mesh
        assert_eq!(mesh.num_vertices(), input_vertices);
        for (_, result) in results {
            let fragment = result.unwrap().into_mesh();
            assert!(fragment.num_vertices() > 0);
            assert!(fragment.num_faces() > 0);
        }
    }

    #[test]
    fn test_failing_vertex_does_not_poison_batch() {
        // Two triangles touching only at vertex 0: its fan has two
        // components and is rejected, while every other vertex still
        // produces a fragment
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let faces = vec![vec![0, 1, 2], vec![0, 3, 4]];
        let mesh = PolyMesh::from_polygons(&positions, &faces).unwrap();
        let results = build_connectors(&mesh, &ConnectorOptions::default()).unwrap();

        assert_eq!(results.len(), 5);
        for (vertex, result) in &results {
            if vertex.index() == 0 {
                assert!(matches!(
                    result,
                    Err(crate::error::MeshError::NonManifoldVertex { .. })
                ));
            } else {
                assert!(result.is_ok(), "{:?} should have succeeded", vertex);
            }
        }
    }

    #[test]
    fn test_progress_reports_every_vertex() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mesh = quad_cube();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        build_connectors_with_progress(&mesh, &ConnectorOptions::default(), &progress).unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 8);
    }
}
