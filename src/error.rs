//! Error types for joinery.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

use crate::mesh::VertexId;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction and connector generation.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face loop is too short or repeats a vertex.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge's two endpoints coincide.
    #[error("edge endpoints coincide at vertex {vertex:?}")]
    DegenerateEdge {
        /// The repeated vertex.
        vertex: VertexId,
    },

    /// A vertex has no incident faces, so no averaged normal exists for it.
    ///
    /// This is an error rather than a zero normal because a zero normal would
    /// silently corrupt all downstream plane math.
    #[error("vertex {vertex:?} has no incident faces")]
    DegenerateTopology {
        /// The isolated vertex.
        vertex: VertexId,
    },

    /// The faces around a vertex do not form a single fan.
    #[error("non-manifold fan at vertex {vertex:?}: {details}")]
    NonManifoldVertex {
        /// The offending vertex.
        vertex: VertexId,
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A geometric quantity is too degenerate to use (zero-length edge,
    /// near-zero normal, or a direction parallel to a plane).
    #[error("degenerate geometry: {details}")]
    DegenerateGeometry {
        /// Description of the degenerate configuration.
        details: String,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh from a file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving a mesh to a file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The file extension does not correspond to a supported format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The unrecognized extension.
        extension: String,
    },
}
