//! Mesh construction from face-vertex lists.
//!
//! This is the narrow interface through which external importers hand polygon
//! soup to the topology store, plus the built-in primitives the editor starts
//! from.

use std::collections::HashMap;

use nalgebra::Point3;

use super::color::{Color, DEFAULT_FACE_COLOR};
use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertex positions and polygonal faces.
///
/// Faces are lists of vertex indices, consistently oriented. Each face gets
/// [`DEFAULT_FACE_COLOR`]. Edges used by only one face are paired with boundary
/// half-edges that are linked into boundary loops.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] when `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for out-of-range indices
/// - [`MeshError::DegenerateFace`] for faces with fewer than 3 corners or repeated corners
/// - [`MeshError::NonManifold`] when an edge is used twice in the same direction or a
///   vertex fan does not close into a single cycle
///
/// # Example
///
/// ```
/// use rigmesh::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_halfedges(), 8);
/// ```
pub fn build_from_polygons<F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh> {
    build_colored(vertices, faces, |_| DEFAULT_FACE_COLOR)
}

/// Like [`build_from_polygons`], with a per-face color chosen by `color_of(face_index)`.
pub fn build_colored<F, C>(vertices: &[Point3<f64>], faces: &[F], color_of: C) -> Result<HalfEdgeMesh>
where
    F: AsRef<[usize]>,
    C: Fn(usize) -> Color,
{
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (i, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[i + 1..].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
    }

    let total_corners: usize = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), total_corners * 2, faces.len());

    let vertex_ids: Vec<VertexId> = vertices.iter().map(|&p| mesh.new_vertex(p)).collect();

    // Directed edge (from, to) -> half-edge, plus creation order for determinism.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(total_corners);
    let mut directed: Vec<(usize, usize, HalfEdgeId)> = Vec::with_capacity(total_corners);

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        let n = face.len();
        let face_id = mesh.new_face(color_of(fi));
        let hes: Vec<HalfEdgeId> = (0..n).map(|_| mesh.new_halfedge()).collect();

        for i in 0..n {
            let from = face[i];
            let to = face[(i + 1) % n];
            {
                let he = mesh.halfedge_mut(hes[i]);
                he.vertex = vertex_ids[to];
                he.next = hes[(i + 1) % n];
                he.face = face_id;
            }
            mesh.vertex_mut(vertex_ids[from]).halfedge = hes[i];

            if edge_map.insert((from, to), hes[i]).is_some() {
                return Err(MeshError::NonManifold {
                    details: format!("edge ({}, {}) is used twice in the same direction", from, to),
                });
            }
            directed.push((from, to, hes[i]));
        }
        mesh.face_mut(face_id).halfedge = hes[0];
    }

    // Pair twins; unmatched edges get a boundary half-edge running the other way.
    let mut boundary_out: HashMap<usize, HalfEdgeId> = HashMap::new();
    for &(from, to, he) in &directed {
        if mesh.sym(he).is_valid() {
            continue;
        }
        if let Some(&twin) = edge_map.get(&(to, from)) {
            mesh.halfedge_mut(he).sym = twin;
            mesh.halfedge_mut(twin).sym = he;
        } else {
            let boundary = mesh.new_halfedge();
            {
                let bhe = mesh.halfedge_mut(boundary);
                bhe.vertex = vertex_ids[from];
                bhe.sym = he;
            }
            mesh.halfedge_mut(he).sym = boundary;
            if boundary_out.insert(to, boundary).is_some() {
                return Err(MeshError::NonManifold {
                    details: format!("vertex {} lies on more than one boundary loop", to),
                });
            }
        }
    }

    // A boundary half-edge ending at v continues with the one leaving v.
    let boundary: Vec<HalfEdgeId> = boundary_out.values().copied().collect();
    for he in boundary {
        let dest = mesh.dest(he).index();
        let next = boundary_out.get(&dest).copied().ok_or_else(|| MeshError::NonManifold {
            details: format!("boundary loop breaks at vertex {}", dest),
        })?;
        mesh.halfedge_mut(he).next = next;
    }

    check_vertex_fans(&mesh)?;

    Ok(mesh)
}

/// Every outgoing half-edge of a vertex must be reachable from its stored one.
fn check_vertex_fans(mesh: &HalfEdgeMesh) -> Result<()> {
    let mut outgoing = vec![0usize; mesh.num_vertices()];
    for he in mesh.halfedge_ids() {
        outgoing[mesh.origin(he).index()] += 1;
    }
    for v in mesh.vertex_ids() {
        if mesh.valence(v) != outgoing[v.index()] {
            return Err(MeshError::NonManifold {
                details: format!("edges around vertex {} do not form a single fan", v.index()),
            });
        }
    }
    Ok(())
}

/// Build the editor's default mesh: a unit cube centered at the origin.
///
/// Faces are quads wound counter-clockwise seen from outside, each with its own color.
pub fn build_cube() -> HalfEdgeMesh {
    let vertices = [
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(0.5, -0.5, -0.5),
        Point3::new(0.5, 0.5, -0.5),
        Point3::new(-0.5, 0.5, -0.5),
        Point3::new(-0.5, -0.5, 0.5),
        Point3::new(0.5, -0.5, 0.5),
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(-0.5, 0.5, 0.5),
    ];
    let faces = [
        [0, 3, 2, 1], // back
        [4, 5, 6, 7], // front
        [0, 1, 5, 4], // bottom
        [2, 3, 7, 6], // top
        [0, 4, 7, 3], // left
        [1, 2, 6, 5], // right
    ];
    let palette = [
        Color::new(1.0, 0.0, 0.0),
        Color::new(0.0, 1.0, 0.0),
        Color::new(0.0, 0.0, 1.0),
        Color::new(1.0, 1.0, 0.0),
        Color::new(1.0, 0.0, 1.0),
        Color::new(0.0, 1.0, 1.0),
    ];

    match build_colored(&vertices, &faces, |fi| palette[fi]) {
        Ok(mesh) => mesh,
        Err(e) => unreachable!("cube fixture is well-formed: {e}"),
    }
}

/// Build a single planar regular polygon with `sides` corners in the XY plane.
pub fn build_regular_polygon(sides: usize, radius: f64) -> Result<HalfEdgeMesh> {
    if sides < 3 {
        return Err(MeshError::invalid_param("sides", sides, "a polygon needs at least 3 sides"));
    }
    let vertices: Vec<Point3<f64>> = (0..sides)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / sides as f64;
            Point3::new(radius * a.cos(), radius * a.sin(), 0.0)
        })
        .collect();
    let face: Vec<usize> = (0..sides).collect();
    build_from_polygons(&vertices, &[face])
}

/// Convert a half-edge mesh back to positions and polygon index lists.
pub fn to_polygons(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<Vec<usize>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();

    (vertices, faces)
}
