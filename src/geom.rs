//! Geometry utilities.
//!
//! Edge direction vectors, face normals from point triples, and the plane
//! distance algebra used by the thickness extruder and the hole driller.
//!
//! Planes are stored in implicit form `n . x + d = 0`. The normal is not
//! assumed to be unit length; the distance helpers account for its magnitude.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, PolyMesh, VertexId};

/// Tolerance below which lengths and dot products are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// Unit direction from `from` to the other endpoint of `edge`.
///
/// Fails with [`MeshError::DegenerateGeometry`] when the edge's endpoints
/// coincide geometrically (zero-length edge).
pub fn edge_direction(mesh: &PolyMesh, edge: EdgeId, from: VertexId) -> Result<Vector3<f64>> {
    let [a, b] = mesh.edge(edge);
    debug_assert!(from == a || from == b, "{:?} is not an endpoint of {:?}", from, edge);
    let to = if from == a { b } else { a };

    let dir = mesh.position(to) - mesh.position(from);
    let norm = dir.norm();
    if norm < EPSILON {
        return Err(MeshError::DegenerateGeometry {
            details: format!("zero-length edge {:?}", edge),
        });
    }
    Ok(dir / norm)
}

/// Unit normal of the triangle `(p0, p1, p2)`.
///
/// Right-hand rule from `(p1 - p0) x (p2 - p0)`. Fails with
/// [`MeshError::DegenerateGeometry`] when the points are collinear.
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Result<Vector3<f64>> {
    let n = (p1 - p0).cross(&(p2 - p0));
    let norm = n.norm();
    if norm < EPSILON {
        return Err(MeshError::DegenerateGeometry {
            details: "collinear points, face normal undefined".to_string(),
        });
    }
    Ok(n / norm)
}

/// A plane in implicit form `normal . x + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// The plane normal (not necessarily unit length).
    pub normal: Vector3<f64>,
    /// The constant term of the implicit equation.
    pub offset: f64,
}

impl Plane {
    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: &Point3<f64>, normal: Vector3<f64>) -> Self {
        let offset = -normal.dot(&point.coords);
        Self { normal, offset }
    }

    /// Evaluate the implicit equation at a point.
    #[inline]
    pub fn eval(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    /// Signed distance from `point` to the plane measured along `direction`.
    ///
    /// This generalizes point-to-plane distance by parameterizing along an
    /// arbitrary direction: `point + t * direction` lies on the plane at
    /// `t = -(n . p + d) / (n . direction)`. Fails with
    /// [`MeshError::DegenerateGeometry`] when `direction` is (nearly)
    /// parallel to the plane.
    pub fn distance_along(&self, point: &Point3<f64>, direction: &Vector3<f64>) -> Result<f64> {
        let denom = self.normal.dot(direction);
        if denom.abs() < EPSILON {
            return Err(MeshError::DegenerateGeometry {
                details: "direction parallel to plane".to_string(),
            });
        }
        Ok(-self.eval(point) / denom)
    }

    /// Signed distance from `point` to the plane along the plane's own
    /// normal, scaled by the normal's magnitude (the normal is not assumed
    /// unit).
    ///
    /// Fails with [`MeshError::DegenerateGeometry`] for a near-zero normal.
    pub fn perpendicular_distance(&self, point: &Point3<f64>) -> Result<f64> {
        let norm = self.normal.norm();
        if norm < EPSILON {
            return Err(MeshError::DegenerateGeometry {
                details: "near-zero plane normal".to_string(),
            });
        }
        Ok(-self.eval(point) / norm)
    }
}
