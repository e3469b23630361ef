//! Mesh editing primitives.
//!
//! Both operations only append elements to the store; nothing is ever removed,
//! so handles held by callers survive an edit. Each operation validates the
//! part of the mesh it touches before the first write.
//!
//! - [`split_edge`]: insert a vertex in the middle of an edge
//! - [`triangulate_face`]: fan-triangulate a polygon

mod split;
mod triangulate;

pub use split::split_edge;
pub use triangulate::{triangulate_face, triangulate_face_with};
