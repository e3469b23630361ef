//! Fan triangulation of a single face.

use log::debug;

use crate::error::Result;
use crate::mesh::{ColorJitter, FaceId, HalfEdgeMesh};

/// Fan-triangulate `f` around its boundary half-edge, tinting new faces with
/// [`ColorJitter::TRIANGULATE`].
///
/// See [`triangulate_face_with`].
pub fn triangulate_face(mesh: &mut HalfEdgeMesh, f: FaceId) -> Result<Vec<FaceId>> {
    triangulate_face_with(mesh, f, ColorJitter::TRIANGULATE)
}

/// Fan-triangulate `f`, returning the faces that were created.
///
/// The face's boundary half-edge `p` is the pivot. While the remaining polygon
/// has more than three sides, the ear formed by the two half-edges after `p` is
/// closed with a diagonal pair from the vertex two steps ahead back to
/// `dest(p)` and handed to a new face; the original face keeps the rest. An
/// n-gon ends up as `n - 2` triangles, the original face being one of them.
///
/// Triangles are left alone. New face colors derive from the original face's
/// color through `jitter`.
///
/// # Errors
///
/// Fails without touching the mesh if `f` is not a valid handle or its boundary
/// cycle does not close.
pub fn triangulate_face_with(
    mesh: &mut HalfEdgeMesh,
    f: FaceId,
    jitter: ColorJitter,
) -> Result<Vec<FaceId>> {
    let mut sides = mesh.check_face_cycle(f)?;
    if sides <= 3 {
        return Ok(Vec::new());
    }

    let pivot = mesh.face(f).halfedge;
    let parent_color = mesh.color(f);
    let mut created = Vec::with_capacity(sides - 3);

    while sides > 3 {
        let p1 = mesh.next(pivot);
        let p2 = mesh.next(p1);
        let p3 = mesh.next(p2);
        let apex = mesh.dest(pivot);
        let far = mesh.dest(p2);

        let ear = mesh.new_face(parent_color);
        let closing = mesh.new_halfedge();
        let diagonal = mesh.new_halfedge();

        {
            let he = mesh.halfedge_mut(closing);
            he.vertex = apex;
            he.next = p1;
            he.face = ear;
            he.sym = diagonal;
        }
        {
            let he = mesh.halfedge_mut(diagonal);
            he.vertex = far;
            he.next = p3;
            he.face = f;
            he.sym = closing;
        }
        mesh.halfedge_mut(p1).face = ear;
        mesh.halfedge_mut(p2).face = ear;
        mesh.halfedge_mut(p2).next = closing;
        mesh.halfedge_mut(pivot).next = diagonal;
        mesh.face_mut(ear).halfedge = closing;

        let color = jitter.derive(parent_color, ear, mesh.num_vertices(), mesh.num_halfedges());
        mesh.face_mut(ear).color = color;

        created.push(ear);
        sides -= 1;
    }

    debug!("triangulated {:?} into {} extra faces", f, created.len());
    Ok(created)
}
