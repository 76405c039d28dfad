//! Mesh file I/O.
//!
//! Connector fragments and input frames are exchanged as Wavefront OBJ
//! files, the one interchange format the CLI needs.
//!
//! ```no_run
//! use joinery::io;
//!
//! let mesh = io::load("frame.obj").unwrap();
//! io::save(&mesh, "output.obj").unwrap();
//! ```

pub mod obj;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::PolyMesh;

fn require_obj(path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("(none)");
    if extension.eq_ignore_ascii_case("obj") {
        Ok(())
    } else {
        Err(MeshError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }
}

/// Load a mesh from a file, checking the extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    require_obj(path)?;
    obj::load(path)
}

/// Save a mesh to a file, checking the extension.
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    require_obj(path)?;
    obj::save(mesh, path)
}
