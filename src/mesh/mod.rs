//! Mesh data structures.
//!
//! This module provides the polygon mesh container used both for connector
//! input and for the per-vertex output fragments, plus the type-safe id
//! types everything else is keyed by.

mod index;
mod poly;

pub use index::{EdgeId, FaceId, VertexId};
pub use poly::PolyMesh;
