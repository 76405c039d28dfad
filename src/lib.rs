//! # Joinery
//!
//! Procedural generation of per-vertex connector meshes for polygon frames.
//!
//! For every vertex of an input mesh, joinery builds a standalone connector
//! fragment: a rim of new geometry following the cyclic or chain-like
//! arrangement of the faces around that vertex, extruded to a given
//! thickness, and perforated with paired bolt/nut sockets: the kind of
//! piece that joins the struts of a physical frame at a node.
//!
//! The input mesh is read-only: its topology is indexed once
//! ([`adjacency::build_adjacency`]) and every vertex then runs an
//! independent pipeline over that shared index, producing its own disjoint
//! output mesh. Faults at one vertex (non-manifold fans, degenerate
//! geometry) fail that vertex alone.
//!
//! ## Quick start
//!
//! ```
//! use joinery::prelude::*;
//! use nalgebra::Point3;
//!
//! // A tetrahedral frame
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![
//!     vec![0, 2, 1], // bottom
//!     vec![0, 1, 3], // front
//!     vec![1, 2, 3], // right
//!     vec![2, 0, 3], // left
//! ];
//! let mesh = PolyMesh::from_polygons(&positions, &faces).unwrap();
//!
//! // One connector per vertex, built in parallel
//! let connectors = build_connectors(&mesh, &ConnectorOptions::default()).unwrap();
//! assert_eq!(connectors.len(), 4);
//! for (vertex, result) in &connectors {
//!     let connector = result.as_ref().expect("tetrahedron fans are well-formed");
//!     println!("{:?}: {} faces", vertex, connector.mesh().num_faces());
//! }
//! ```
//!
//! ## Pipeline stages
//!
//! The per-vertex pipeline is a chain of staged types, each exposing only
//! the data valid at that stage:
//!
//! 1. [`connector::extract_pairs`] / [`connector::sort_pairs`]: reconstruct
//!    the ordered fan of faces around the vertex
//! 2. [`connector::build_rim`]: place the rim ("hat") vertices
//! 3. [`connector::extrude_thickness`]: offset the rim onto a parallel
//!    bottom plane and build the side walls
//! 4. [`connector::drill_holes`]: sink a bolt/nut socket at each pair and
//!    close the remaining surface

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod connector;
pub mod error;
pub mod geom;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use joinery::prelude::*;
/// ```
pub mod prelude {
    pub use crate::adjacency::{build_adjacency, AdjacencyIndex};
    pub use crate::connector::{
        build_connector, build_connectors, build_connectors_with_progress, Connector,
        ConnectorOptions, HoleOptions, Progress,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{EdgeId, FaceId, PolyMesh, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
