//! Catmull-Clark-style subdivision.
//!
//! One pass refines the mesh in place, reusing the editing primitives:
//!
//! 1. Record every face centroid and the number of original vertices
//! 2. Split every edge; the new vertex moves to the mean of the edge's two
//!    endpoints and its two adjacent face centroids
//! 3. Smooth each original vertex from positions frozen before the step
//! 4. Insert a vertex at each face centroid and cut the face into one quad per
//!    original side
//!
//! Every n-gon becomes n quads, and a mesh with `V` vertices, `E` edges and `F`
//! faces ends up with `V + E + F` vertices. New vertices are left unbound.
//!
//! # Example
//!
//! ```
//! use rigmesh::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
//! use rigmesh::mesh::build_cube;
//!
//! let mut mesh = build_cube();
//! catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(1)).unwrap();
//! assert_eq!(mesh.num_vertices(), 8 + 12 + 6);
//! assert_eq!(mesh.num_faces(), 24);
//! ```
//!
//! # References
//!
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.

mod catmull_clark;

pub use catmull_clark::{
    catmull_clark_pass, catmull_clark_subdivide, catmull_clark_subdivide_with_progress,
};

/// Options for subdivision.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision passes.
    pub iterations: usize,

    /// Keep open borders on a cubic B-spline curve instead of applying the
    /// interior vertex rule to border vertices.
    pub preserve_boundary: bool,

    /// Compute centroids and smoothed positions on the rayon pool.
    ///
    /// Only the read-only position math runs in parallel; topology edits stay
    /// sequential. Off by default.
    pub parallel: bool,
}

impl SubdivideOptions {
    /// Create options with the specified number of passes.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            preserve_boundary: true,
            parallel: false,
        }
    }

    /// Set whether to preserve boundary curves.
    pub fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Set whether to use parallel position computation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
