//! Bolt/nut socket drilling.
//!
//! For each pair of the rim, a socket is sunk through the connector: a
//! circular "bolt" ring on the top surface, a tube down to a hexagonal "nut"
//! ring just above the bottom plane, a second tube from the nut ring to its
//! projection onto the bottom plane, and annulus patches seating the bolt
//! tube on the nut tube. `fill_hole_faces` then closes the remaining surface
//! between each pair's rim triple and its hole ring.
//!
//! All socket geometry is expressed in a per-pair orthonormal frame:
//! `x` along the chord between the pair's two edge vertices, `y` from the
//! pair vertex toward the middle, `z = x cross y` oriented toward the bottom
//! plane.

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geom::{Plane, EPSILON};
use crate::mesh::{PolyMesh, VertexId};

use super::thickness::ExtrudedShell;

/// Number of vertices in a nut ring (hexagon).
const NUT_RING_VERTICES: usize = 6;

/// Parameters for socket drilling.
#[derive(Debug, Clone)]
pub struct HoleOptions {
    /// Radius of the circular bolt ring.
    pub hole_radius: f64,
    /// Radius of the hexagonal nut ring.
    pub nut_radius: f64,
    /// Inset of the socket center from the pair vertex toward the middle.
    pub bolt_dist: f64,
    /// Lateral offset of the socket center along the rim chord.
    pub location: f64,
    /// Clearance left between the bolt tube's end and the bottom plane.
    pub bolt_thickness: f64,
    /// Number of vertices in the bolt ring. Must be even and at least 4 so
    /// the ring can be split into two halves at its midpoint.
    pub circle_vertices: usize,
}

impl Default for HoleOptions {
    fn default() -> Self {
        Self {
            hole_radius: 0.06,
            nut_radius: 0.1,
            bolt_dist: 0.25,
            location: 0.0,
            bolt_thickness: 0.08,
            circle_vertices: 12,
        }
    }
}

/// The vertex rings of one pair's socket.
#[derive(Debug, Clone)]
pub struct PairSockets {
    /// Bolt ring on the top surface.
    pub bolt_top: Vec<VertexId>,
    /// Bolt ring at the bottom of the bolt tube.
    pub bolt_bottom: Vec<VertexId>,
    /// Nut ring seated at the bolt tube's end.
    pub nut_top: Vec<VertexId>,
    /// Nut ring projected onto the bottom plane.
    pub nut_bottom: Vec<VertexId>,
}

/// A finished per-vertex connector.
///
/// The final stage of the pipeline; owns the private fragment mesh that is
/// the output for its vertex.
#[derive(Debug, Clone)]
pub struct Connector {
    mesh: PolyMesh,
    middle: VertexId,
    closed: bool,
    top_rim: Vec<VertexId>,
    bottom_rim: Vec<VertexId>,
    extended_middle: Option<VertexId>,
    sockets: Vec<PairSockets>,
}

impl Connector {
    /// The finished fragment mesh.
    pub fn mesh(&self) -> &PolyMesh {
        &self.mesh
    }

    /// Consume the connector, keeping only the fragment mesh.
    pub fn into_mesh(self) -> PolyMesh {
        self.mesh
    }

    /// The middle vertex of the fragment.
    pub fn middle(&self) -> VertexId {
        self.middle
    }

    /// Whether the fan closed into a cycle.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of pairs (and sockets).
    pub fn num_pairs(&self) -> usize {
        self.sockets.len()
    }

    /// The top rim vertices.
    pub fn top_rim(&self) -> &[VertexId] {
        &self.top_rim
    }

    /// The bottom rim vertices.
    pub fn bottom_rim(&self) -> &[VertexId] {
        &self.bottom_rim
    }

    /// The extended middle vertex (open fans only).
    pub fn extended_middle(&self) -> Option<VertexId> {
        self.extended_middle
    }

    /// Per-pair socket rings.
    pub fn sockets(&self) -> &[PairSockets] {
        &self.sockets
    }
}

/// Drill one bolt/nut socket per pair and close the remaining surface.
///
/// Fails with [`MeshError::DegenerateGeometry`] when a pair's local frame
/// cannot be built (coincident rim vertices, pair vertex on the middle) or
/// when the socket axis is parallel to the bottom plane.
pub fn drill_holes(shell: ExtrudedShell, options: &HoleOptions) -> Result<Connector> {
    if options.circle_vertices < 4 || options.circle_vertices % 2 != 0 {
        return Err(MeshError::DegenerateGeometry {
            details: format!(
                "circle_vertices must be even and >= 4, got {}",
                options.circle_vertices
            ),
        });
    }

    let top_triples = shell.top_vert_triples();
    let bottom_triples = shell.bottom_vert_triples();

    let ExtrudedShell {
        mut mesh,
        middle,
        middle_position,
        closed,
        top_rim,
        bottom_rim,
        extended_middle,
        bottom_plane,
    } = shell;

    let mut sockets = Vec::with_capacity(top_triples.len());
    for (top_triple, bottom_triple) in top_triples.iter().zip(&bottom_triples) {
        let rings = drill_pair(&mut mesh, middle_position, &bottom_plane, top_triple, options)?;
        fill_hole_faces(
            &mut mesh,
            &rings,
            top_triple,
            bottom_triple,
            middle,
            extended_middle,
        )?;
        sockets.push(rings);
    }

    Ok(Connector {
        mesh,
        middle,
        closed,
        top_rim,
        bottom_rim,
        extended_middle,
        sockets,
    })
}

/// Build the socket rings and tube walls for one pair.
fn drill_pair(
    mesh: &mut PolyMesh,
    middle_position: Point3<f64>,
    bottom_plane: &Plane,
    triple: &[VertexId; 3],
    options: &HoleOptions,
) -> Result<PairSockets> {
    let [edge_vert0, pair_vert, edge_vert2] = *triple;
    let p0 = *mesh.position(edge_vert0);
    let pp = *mesh.position(pair_vert);
    let p2 = *mesh.position(edge_vert2);

    // Local frame: x along the rim chord, y toward the middle, z downward
    let x = normalized(p2 - p0, "rim chord")?;
    let y = normalized(middle_position - pp, "pair vertex to middle")?;
    let mut z = normalized(x.cross(&y), "socket axis")?;

    let origin = pp + options.location * x + options.bolt_dist * y;

    let mut axis_reach = bottom_plane.distance_along(&origin, &z)?;
    if axis_reach < 0.0 {
        z = -z;
        axis_reach = -axis_reach;
    }
    let depth = axis_reach - options.bolt_thickness;

    // Bolt rings and tube
    let bolt_top = add_ring(mesh, &origin, &x, &y, options.hole_radius, options.circle_vertices);
    let bolt_bottom: Vec<VertexId> = bolt_top
        .iter()
        .map(|&v| {
            let p = *mesh.position(v) + depth * z;
            mesh.add_vertex(p)
        })
        .collect();
    add_tube(mesh, &bolt_top, &bolt_bottom)?;

    // Nut rings and tube
    let nut_center = origin + depth * z;
    let nut_top = add_ring(mesh, &nut_center, &x, &y, options.nut_radius, NUT_RING_VERTICES);
    let mut nut_bottom = Vec::with_capacity(NUT_RING_VERTICES);
    for &v in &nut_top {
        let p = *mesh.position(v);
        let drop = bottom_plane.distance_along(&p, &z)?;
        nut_bottom.push(mesh.add_vertex(p + drop * z));
    }
    add_tube(mesh, &nut_top, &nut_bottom)?;

    // Seat the bolt tube on the nut tube with two half-annulus patches
    let mid_bolt = bolt_bottom.len() / 2;
    let mid_nut = nut_top.len() / 2;

    let mut seat_a: Vec<VertexId> = bolt_bottom[..=mid_bolt].to_vec();
    seat_a.extend(nut_top[..=mid_nut].iter().rev());
    mesh.add_face(&seat_a)?;

    let mut seat_b: Vec<VertexId> = bolt_bottom[mid_bolt..].to_vec();
    seat_b.push(bolt_bottom[0]);
    seat_b.push(nut_top[0]);
    seat_b.extend(nut_top[mid_nut..].iter().rev());
    mesh.add_face(&seat_b)?;

    Ok(PairSockets {
        bolt_top,
        bolt_bottom,
        nut_top,
        nut_bottom,
    })
}

/// Close the remaining surface between a pair's rim triples and its hole
/// rings.
///
/// Each ring is split at its midpoint; one half is fanned against
/// `{pair_vert, edge_vert2, middle}` and the other against
/// `{middle, edge_vert0, pair_vert}`. The top (bolt) assembly is always
/// closed; the bottom (nut) assembly only for open fans, against the
/// extended middle (closed fans carry the single bottom cap instead).
fn fill_hole_faces(
    mesh: &mut PolyMesh,
    rings: &PairSockets,
    top_triple: &[VertexId; 3],
    bottom_triple: &[VertexId; 3],
    middle: VertexId,
    extended_middle: Option<VertexId>,
) -> Result<()> {
    fill_ring_patches(mesh, &rings.bolt_top, top_triple, middle)?;
    if let Some(extended) = extended_middle {
        fill_ring_patches(mesh, &rings.nut_bottom, bottom_triple, extended)?;
    }
    Ok(())
}

/// Two boundary patches between one ring and one rim triple.
fn fill_ring_patches(
    mesh: &mut PolyMesh,
    ring: &[VertexId],
    triple: &[VertexId; 3],
    middle: VertexId,
) -> Result<()> {
    let [edge_vert0, pair_vert, edge_vert2] = *triple;
    let mid = ring.len() / 2;

    let mut patch_a = vec![pair_vert, edge_vert2, middle];
    patch_a.extend(ring[..=mid].iter().rev());
    mesh.add_face(&patch_a)?;

    let mut patch_b = vec![middle, edge_vert0, pair_vert, ring[0]];
    patch_b.extend(ring[mid..].iter().rev());
    mesh.add_face(&patch_b)?;

    Ok(())
}

/// Regularly spaced ring of new vertices around `center` in the `x`/`y`
/// plane.
fn add_ring(
    mesh: &mut PolyMesh,
    center: &Point3<f64>,
    x: &Vector3<f64>,
    y: &Vector3<f64>,
    radius: f64,
    count: usize,
) -> Vec<VertexId> {
    (0..count)
        .map(|k| {
            let angle = TAU * k as f64 / count as f64;
            mesh.add_vertex(center + radius * (angle.cos() * x + angle.sin() * y))
        })
        .collect()
}

/// Quad strip connecting two rings of equal length.
fn add_tube(mesh: &mut PolyMesh, upper: &[VertexId], lower: &[VertexId]) -> Result<()> {
    debug_assert_eq!(upper.len(), lower.len());
    for i in 0..upper.len() {
        let j = (i + 1) % upper.len();
        mesh.add_face(&[upper[i], upper[j], lower[j], lower[i]])?;
    }
    Ok(())
}

fn normalized(v: Vector3<f64>, what: &str) -> Result<Vector3<f64>> {
    let norm = v.norm();
    if norm < EPSILON {
        return Err(MeshError::DegenerateGeometry {
            details: format!("degenerate {} direction", what),
        });
    }
    Ok(v / norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::build_adjacency;
    use crate::connector::pairs::{extract_pairs, sort_pairs};
    use crate::connector::rim::build_rim;
    use crate::connector::thickness::extrude_thickness;
    use std::f64::consts::PI;

    fn closed_quad_fan() -> PolyMesh {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..8 {
            let angle = 2.0 * PI * k as f64 / 8.0;
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let ring = |k: usize| 1 + (k % 8);
        let faces: Vec<Vec<usize>> = (0..4)
            .map(|i| vec![0, ring(2 * i), ring(2 * i + 1), ring(2 * i + 2)])
            .collect();
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    fn open_triangle_fan() -> PolyMesh {
        let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
        for k in 0..4 {
            let angle = PI * k as f64 / 3.0;
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]];
        PolyMesh::from_polygons(&positions, &faces).unwrap()
    }

    fn shell_for(mesh: &PolyMesh) -> ExtrudedShell {
        let adj = build_adjacency(mesh).unwrap();
        let center = VertexId::new(0);
        let fan = sort_pairs(center, extract_pairs(&adj, center).unwrap()).unwrap();
        let rim = build_rim(mesh, &adj, &fan, 0.5).unwrap();
        extrude_thickness(rim, 0.3).unwrap()
    }

    #[test]
    fn test_closed_fan_socket_counts() {
        let mesh = closed_quad_fan();
        let shell = shell_for(&mesh);
        let shell_vertices = shell.mesh().num_vertices();
        let shell_faces = shell.mesh().num_faces();

        let options = HoleOptions::default();
        let connector = drill_holes(shell, &options).unwrap();

        assert_eq!(connector.num_pairs(), 4);
        // Per pair: 12 + 12 bolt + 6 + 6 nut ring vertices
        assert_eq!(connector.mesh().num_vertices(), shell_vertices + 4 * 36);
        // Per pair: 12 bolt tube + 6 nut tube + 2 seat + 2 top fill faces
        assert_eq!(connector.mesh().num_faces(), shell_faces + 4 * 22);
    }

    #[test]
    fn test_open_fan_socket_counts() {
        let mesh = open_triangle_fan();
        let shell = shell_for(&mesh);
        let shell_faces = shell.mesh().num_faces();

        let options = HoleOptions::default();
        let connector = drill_holes(shell, &options).unwrap();

        assert_eq!(connector.num_pairs(), 3);
        assert!(connector.extended_middle().is_some());
        // Open fans additionally fill the bottom surface: 2 more faces per pair
        assert_eq!(connector.mesh().num_faces(), shell_faces + 3 * 24);
    }

    #[test]
    fn test_ring_sizes() {
        let mesh = closed_quad_fan();
        let connector = drill_holes(shell_for(&mesh), &HoleOptions::default()).unwrap();

        for sockets in connector.sockets() {
            assert_eq!(sockets.bolt_top.len(), 12);
            assert_eq!(sockets.bolt_bottom.len(), 12);
            assert_eq!(sockets.nut_top.len(), 6);
            assert_eq!(sockets.nut_bottom.len(), 6);
        }
    }

    #[test]
    fn test_bolt_ring_on_hole_radius() {
        let mesh = closed_quad_fan();
        let options = HoleOptions::default();
        let connector = drill_holes(shell_for(&mesh), &options).unwrap();

        let sockets = &connector.sockets()[0];
        // Ring vertices are all hole_radius from the ring's centroid
        let centroid: Vector3<f64> = sockets
            .bolt_top
            .iter()
            .map(|&v| connector.mesh().position(v).coords)
            .sum::<Vector3<f64>>()
            / sockets.bolt_top.len() as f64;
        for &v in &sockets.bolt_top {
            let r = (connector.mesh().position(v).coords - centroid).norm();
            assert!((r - options.hole_radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nut_bottom_ring_on_bottom_plane() {
        let mesh = closed_quad_fan();
        let shell = shell_for(&mesh);
        let plane = shell.bottom_plane();
        let connector = drill_holes(shell, &HoleOptions::default()).unwrap();

        for sockets in connector.sockets() {
            for &v in &sockets.nut_bottom {
                let d = plane.perpendicular_distance(connector.mesh().position(v)).unwrap();
                assert!(d.abs() < 1e-9, "nut vertex off bottom plane by {}", d);
            }
        }
    }

    #[test]
    fn test_odd_circle_vertices_rejected() {
        let mesh = closed_quad_fan();
        let options = HoleOptions {
            circle_vertices: 7,
            ..HoleOptions::default()
        };
        let result = drill_holes(shell_for(&mesh), &options);
        assert!(matches!(result, Err(MeshError::DegenerateGeometry { .. })));
    }
}
