//! # Rigmesh
//!
//! Core of a polygon-mesh editor with skeletal deformation.
//!
//! Rigmesh provides a half-edge topology store with incremental editing
//! (edge splits, fan triangulation), Catmull-Clark-style subdivision, a joint
//! hierarchy with bind poses, and two-joint linear-blend skin binding.
//!
//! ## Features
//!
//! - **Half-edge store**: append-only arenas addressed by type-safe handles
//! - **Editing**: edge splitting and fan triangulation that validate before mutating
//! - **Subdivision**: one or more Catmull-Clark-style passes over arbitrary polygons
//! - **Skeleton**: joint tree with local/world transforms and JSON descriptions
//! - **Skinning**: pluggable two-joint binding policies with complementary weights
//!
//! ## Quick Start
//!
//! ```
//! use rigmesh::prelude::*;
//! use nalgebra::Vector3;
//!
//! // The editor's default cube.
//! let mut mesh = build_cube();
//! assert_eq!(mesh.num_faces(), 6);
//!
//! // One subdivision pass: every quad becomes four.
//! catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(1)).unwrap();
//! assert_eq!(mesh.num_vertices(), 26);
//! assert_eq!(mesh.num_faces(), 24);
//!
//! // A two-joint skeleton, bound at rest.
//! let mut skeleton = Skeleton::new();
//! skeleton.add_child(skeleton.root(), Vector3::new(0.0, 1.0, 0.0)).unwrap();
//! skeleton.bind_all();
//! SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();
//! assert_eq!(mesh.num_bound_vertices(), 26);
//! ```
//!
//! ## Editing a Polygon
//!
//! ```
//! use rigmesh::prelude::*;
//!
//! let mut mesh = build_regular_polygon(5, 1.0).unwrap();
//! let f = FaceId::new(0);
//!
//! // Insert a vertex on the face's first edge, then triangulate the hexagon.
//! let e = mesh.face(f).halfedge;
//! split_edge(&mut mesh, e).unwrap();
//! assert_eq!(mesh.face_degree(f), 6);
//!
//! triangulate_face(&mut mesh, f).unwrap();
//! assert_eq!(mesh.num_faces(), 4);
//! assert!(mesh.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod edit;
pub mod editor;
pub mod error;
pub mod mesh;
pub mod skeleton;
pub mod skin;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use rigmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
    pub use crate::edit::{split_edge, triangulate_face};
    pub use crate::editor::{Editor, Selection};
    pub use crate::error::{Error, MeshError, Result, SkeletonError, SkinError};
    pub use crate::mesh::{
        build_cube, build_from_polygons, build_regular_polygon, to_polygons, Face, FaceId,
        HalfEdge, HalfEdgeId, HalfEdgeMesh, SkinBinding, Vertex, VertexId,
    };
    pub use crate::skeleton::{Joint, JointId, Skeleton, SkeletonDescription};
    pub use crate::skin::{set_influence, InfluenceStrategy, NearestJoints, SkinBinder};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Vector3;

    #[test]
    fn test_cube_subdivide_then_skin() {
        let mut mesh = build_cube();
        catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(2)).unwrap();
        assert!(mesh.is_valid());
        assert!(mesh.is_quad_mesh());

        let mut skeleton = Skeleton::new();
        let arm = skeleton.add_child(skeleton.root(), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        skeleton.add_child(arm, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        skeleton.bind_all();

        let count = SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();
        assert_eq!(count, mesh.num_vertices());
        for (_, vertex) in mesh.vertices() {
            let binding = vertex.skin.unwrap();
            assert_eq!(binding.weights[0] + binding.weights[1], 1.0);
        }
    }

    #[test]
    fn test_closed_cube_has_no_boundary() {
        let mesh = build_cube();
        assert_eq!(mesh.num_halfedges(), 24);
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }
    }
}
