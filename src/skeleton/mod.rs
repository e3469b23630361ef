//! Joint hierarchy.
//!
//! A [`Skeleton`] is a tree of [`Joint`]s kept in an arena and addressed by
//! [`JointId`]. Each joint stores its offset and orientation relative to its
//! parent; world transforms are composed root to leaf on demand.
//!
//! ```
//! use rigmesh::skeleton::Skeleton;
//! use nalgebra::Vector3;
//!
//! let mut skeleton = Skeleton::new();
//! let root = skeleton.root();
//! let elbow = skeleton.add_child(root, Vector3::new(0.0, 1.0, 0.0)).unwrap();
//! skeleton.rotate(root, std::f64::consts::FRAC_PI_2, Vector3::z()).unwrap();
//!
//! let p = skeleton.world_position(elbow).unwrap();
//! assert!((p.x + 1.0).abs() < 1e-12);
//! ```

mod description;
mod joint;

pub use description::{JointDescription, SkeletonDescription};
pub use joint::{Joint, JointId, Skeleton};
