//! Edge splitting.

use log::trace;

use crate::error::Result;
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, VertexId};

/// Insert a vertex at the midpoint of the edge containing `e`.
///
/// With `t = sym(e)` running from `b` back to `a`, the edge `a -> b` becomes
/// `a -> v -> b`:
///
/// ```text
///   before:   a ----e----> b        after:   a --e--> v --e'--> b
///             a <---t----- b                 a <--t'- v <--t--- b
/// ```
///
/// `e` and `t` keep their faces and now end at `v`; the new half-edges `e'` and
/// `t'` continue the same two cycles, so both faces (or boundary loops) gain
/// one side. Twins are re-paired as `e <-> t'` and `t <-> e'`.
///
/// The new vertex is unbound and its outgoing half-edge is `e'`. Callers may
/// move it afterwards.
///
/// # Errors
///
/// Fails without touching the mesh if `e` is not a valid handle, has a broken
/// twin, or either side's cycle does not close.
///
/// # Example
///
/// ```
/// use rigmesh::edit::split_edge;
/// use rigmesh::mesh::{build_from_polygons, FaceId, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2]]).unwrap();
/// let e = mesh.face(FaceId::new(0)).halfedge;
/// let v = split_edge(&mut mesh, e).unwrap();
/// assert_eq!(mesh.face_degree(FaceId::new(0)), 4);
/// assert!(!mesh.vertex(v).is_bound());
/// ```
pub fn split_edge(mesh: &mut HalfEdgeMesh, e: HalfEdgeId) -> Result<VertexId> {
    mesh.check_twin(e)?;
    let t = mesh.sym(e);
    mesh.check_cycle(e)?;
    mesh.check_cycle(t)?;

    let a = mesh.dest(t);
    let b = mesh.dest(e);
    let midpoint = nalgebra::center(mesh.position(a), mesh.position(b));

    let v = mesh.new_vertex(midpoint);
    let e2 = mesh.new_halfedge();
    let t2 = mesh.new_halfedge();

    let (e_next, e_face) = (mesh.next(e), mesh.face_of(e));
    let (t_next, t_face) = (mesh.next(t), mesh.face_of(t));

    {
        let he = mesh.halfedge_mut(e2);
        he.vertex = b;
        he.next = e_next;
        he.face = e_face;
        he.sym = t;
    }
    {
        let he = mesh.halfedge_mut(t2);
        he.vertex = a;
        he.next = t_next;
        he.face = t_face;
        he.sym = e;
    }
    {
        let he = mesh.halfedge_mut(e);
        he.vertex = v;
        he.next = e2;
        he.sym = t2;
    }
    {
        let he = mesh.halfedge_mut(t);
        he.vertex = v;
        he.next = t2;
        he.sym = e2;
    }
    mesh.vertex_mut(v).halfedge = e2;

    trace!("split {:?}/{:?} at {:?}", e, t, v);
    Ok(v)
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::error::MeshError;
    use crate::mesh::{build_cube, build_from_polygons, FaceId};

    fn single_quad() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_split_counts() {
        let mut mesh = build_cube();
        let e = mesh.face(FaceId::new(0)).halfedge;
        let (fe, ft) = (mesh.face_of(e), mesh.face_of(mesh.sym(e)));
        let (de, dt) = (mesh.face_degree(fe), mesh.face_degree(ft));
        let (nv, nh) = (mesh.num_vertices(), mesh.num_halfedges());

        split_edge(&mut mesh, e).unwrap();

        assert_eq!(mesh.face_degree(fe), de + 1);
        assert_eq!(mesh.face_degree(ft), dt + 1);
        assert_eq!(mesh.num_vertices(), nv + 1);
        assert_eq!(mesh.num_halfedges(), nh + 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_split_places_midpoint() {
        let mut mesh = single_quad();
        let e = mesh.face(FaceId::new(0)).halfedge;
        let expected = mesh.edge_midpoint(e);
        let (a, b) = (mesh.origin(e), mesh.dest(e));

        let v = split_edge(&mut mesh, e).unwrap();

        assert!((mesh.position(v) - expected).norm() < 1e-12);
        assert_eq!(mesh.origin(e), a);
        assert_eq!(mesh.dest(e), v);
        assert_eq!(mesh.dest(mesh.next(e)), b);
        assert_eq!(mesh.origin(mesh.vertex(v).halfedge), v);
        assert_eq!(mesh.valence(v), 2);
    }

    #[test]
    fn test_split_boundary_edge_extends_boundary_loop() {
        let mut mesh = single_quad();
        let e = mesh.face(FaceId::new(0)).halfedge;
        let boundary = mesh.sym(e);
        assert_eq!(mesh.check_cycle(boundary).unwrap(), 4);

        split_edge(&mut mesh, e).unwrap();

        assert_eq!(mesh.check_cycle(boundary).unwrap(), 5);
        assert!(mesh.is_boundary_halfedge(mesh.next(boundary)));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_split_twice_same_edge() {
        let mut mesh = single_quad();
        let e = mesh.face(FaceId::new(0)).halfedge;
        split_edge(&mut mesh, e).unwrap();
        split_edge(&mut mesh, e).unwrap();
        assert_eq!(mesh.face_degree(FaceId::new(0)), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_new_vertex_is_unbound() {
        let mut mesh = build_cube();
        let v = split_edge(&mut mesh, HalfEdgeId::new(3)).unwrap();
        assert!(mesh.vertex(v).skin.is_none());
    }

    #[test]
    fn test_invalid_handle_is_rejected() {
        let mut mesh = single_quad();
        let before = mesh.num_halfedges();
        assert!(matches!(
            split_edge(&mut mesh, HalfEdgeId::invalid()),
            Err(MeshError::InvalidHandle { .. })
        ));
        assert!(split_edge(&mut mesh, HalfEdgeId::new(before)).is_err());
        assert_eq!(mesh.num_halfedges(), before);
    }

    #[test]
    fn test_broken_twin_leaves_mesh_untouched() {
        let mut mesh = single_quad();
        let e = HalfEdgeId::new(0);
        mesh.halfedge_mut(e).sym = HalfEdgeId::invalid();
        let (nv, nh) = (mesh.num_vertices(), mesh.num_halfedges());

        assert_eq!(split_edge(&mut mesh, e), Err(MeshError::BrokenTwin { halfedge: e }));
        assert_eq!(mesh.num_vertices(), nv);
        assert_eq!(mesh.num_halfedges(), nh);
    }
}
