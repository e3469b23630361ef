//! Topology store.
//!
//! The primary type is [`HalfEdgeMesh`], a polygon mesh kept as half-edges in
//! append-only arenas. Elements are addressed by type-safe handles:
//! - [`VertexId`] - identifies a vertex
//! - [`HalfEdgeId`] - identifies a half-edge
//! - [`FaceId`] - identifies a face
//!
//! Handles are never recycled, so ids increase monotonically over an editing
//! session and stay valid across insertions.
//!
//! # Construction
//!
//! ```
//! use rigmesh::mesh::{build_from_polygons, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2]]).unwrap();
//! assert!(mesh.is_valid());
//! ```

mod builder;
mod color;
mod halfedge;
mod index;
mod validate;

pub use builder::{build_colored, build_cube, build_from_polygons, build_regular_polygon, to_polygons};
pub use color::{Color, ColorJitter, DEFAULT_FACE_COLOR};
pub use halfedge::{CycleIter, Face, HalfEdge, HalfEdgeMesh, SkinBinding, Vertex, VertexHalfEdgeIter};
pub(crate) use index::define_handle;
pub use index::{FaceId, HalfEdgeId, VertexId};
