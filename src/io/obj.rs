//! Wavefront OBJ format support.
//!
//! Minimal OBJ reading and writing for [`PolyMesh`]: `v` records for vertex
//! positions and `f` records for polygon faces. Face entries may carry
//! `/vt/vn` suffixes, which are ignored; texture coordinates and normals are
//! never written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::PolyMesh;

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use joinery::io::obj;
///
/// let mesh = obj::load("frame.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<PolyMesh> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    parse(&source).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use joinery::io::obj;
/// use joinery::mesh::PolyMesh;
///
/// let mesh = PolyMesh::new();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &PolyMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(format_obj(mesh).as_bytes())?;
    Ok(())
}

/// Parse OBJ source text into a mesh.
fn parse(source: &str) -> std::result::Result<PolyMesh, String> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();

    for (line_no, line) in source.lines().enumerate() {
        let line = line.trim();
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("v") => {
                let mut coord = |what: &str| -> std::result::Result<f64, String> {
                    fields
                        .next()
                        .ok_or_else(|| format!("line {}: missing {} coordinate", line_no + 1, what))?
                        .parse::<f64>()
                        .map_err(|e| format!("line {}: bad {} coordinate: {}", line_no + 1, what, e))
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                positions.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let mut face = Vec::new();
                for field in fields {
                    // "7", "7/1" and "7/1/3" all reference vertex 7
                    let index_text = field.split('/').next().unwrap_or(field);
                    let index: isize = index_text
                        .parse()
                        .map_err(|e| format!("line {}: bad face index: {}", line_no + 1, e))?;
                    if index < 1 {
                        return Err(format!(
                            "line {}: unsupported face index {}",
                            line_no + 1,
                            index
                        ));
                    }
                    face.push(index as usize - 1);
                }
                if face.len() < 3 {
                    return Err(format!("line {}: face with fewer than 3 vertices", line_no + 1));
                }
                faces.push(face);
            }
            // Comments, groups, materials, normals, and blank lines
            _ => {}
        }
    }

    PolyMesh::from_polygons(&positions, &faces).map_err(|e| e.to_string())
}

/// Format a mesh as OBJ source text.
fn format_obj(mesh: &PolyMesh) -> String {
    let mut out = String::new();
    for v in mesh.vertex_ids() {
        let p = mesh.position(v);
        out.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
    }
    for f in mesh.face_ids() {
        out.push('f');
        for &v in mesh.face(f) {
            out.push_str(&format!(" {}", v.index() + 1));
        }
        out.push('\n');
    }
    out
}
