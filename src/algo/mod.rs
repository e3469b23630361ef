//! Whole-mesh algorithms.
//!
//! - **Subdivision**: Catmull-Clark-style refinement built on the editing
//!   primitives in [`crate::edit`]
//! - **Progress**: callback plumbing for long-running passes

pub mod progress;
pub mod subdivide;

pub use progress::Progress;
