//! Error types for rigmesh.
//!
//! Mesh, skeleton and skinning failures each have their own enum. Editor-level
//! operations that touch several of them return [`Error`].

use thiserror::Error;

use crate::mesh::{FaceId, HalfEdgeId, VertexId};
use crate::skeleton::JointId;

/// Result type alias defaulting to [`MeshError`].
pub type Result<T, E = MeshError> = std::result::Result<T, E>;

/// Errors raised by the topology store, the mesh editor and subdivision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The input cannot be represented as a manifold half-edge mesh.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A handle is null or does not name an element of the store.
    #[error("invalid {kind} handle {index}")]
    InvalidHandle {
        /// Element kind ("vertex", "half-edge", "face", ...).
        kind: &'static str,
        /// The raw index, or `usize::MAX` for a null handle.
        index: usize,
    },

    /// Walking `next` from a face's boundary half-edge never returns to it.
    #[error("boundary cycle of {face:?} does not close")]
    BrokenCycle {
        /// The offending face.
        face: FaceId,
    },

    /// A half-edge has no twin, is its own twin, or `sym` is not an involution.
    #[error("half-edge {halfedge:?} has a broken twin")]
    BrokenTwin {
        /// The offending half-edge.
        halfedge: HalfEdgeId,
    },

    /// A vertex has no outgoing half-edge or it does not start at the vertex.
    #[error("vertex {vertex:?} has a broken outgoing half-edge")]
    BrokenVertex {
        /// The offending vertex.
        vertex: VertexId,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Errors raised by the joint hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkeletonError {
    /// The joint id does not name a live joint.
    #[error("unknown joint {0:?}")]
    UnknownJoint(JointId),

    /// A rotation was requested around a zero-length axis.
    #[error("rotation axis has zero length")]
    ZeroAxis,

    /// The root joint cannot be removed.
    #[error("the root joint cannot be removed")]
    RootRemoval,

    /// A skeleton description could not be parsed.
    #[error("invalid skeleton description: {0}")]
    Description(String),
}

impl From<serde_json::Error> for SkeletonError {
    fn from(err: serde_json::Error) -> Self {
        SkeletonError::Description(err.to_string())
    }
}

/// Errors raised while binding or deforming skinned vertices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkinError {
    /// Two distinct joints are needed to bind a vertex.
    #[error("skeleton has {available} joint(s), binding needs at least 2")]
    NotEnoughJoints {
        /// Number of live joints in the skeleton.
        available: usize,
    },

    /// The vertex carries no skin binding.
    #[error("vertex {0:?} is not bound")]
    NotBound(VertexId),

    /// A binding references a joint that no longer exists.
    #[error("vertex {vertex:?} references removed joint {joint:?}")]
    DanglingJoint {
        /// The bound vertex.
        vertex: VertexId,
        /// The missing joint.
        joint: JointId,
    },

    /// Both influences name the same joint.
    #[error("binding uses joint {0:?} twice")]
    DuplicateJoint(JointId),

    /// Influence weight outside `[0, 1]`.
    #[error("influence weight {0} is outside [0, 1]")]
    InvalidWeight(f64),

    /// Influence slot other than 0 or 1.
    #[error("influence index {0} is out of range (expected 0 or 1)")]
    InvalidInfluenceIndex(usize),

    /// The vertex handle is invalid.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Top-level error for editor operations spanning mesh, skeleton and skin.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Mesh failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Skeleton failure.
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    /// Skinning failure.
    #[error(transparent)]
    Skin(#[from] SkinError),

    /// The operation needs a selection of a different kind.
    #[error("operation requires a selected {expected}")]
    NoSelection {
        /// What the operation expected to find selected.
        expected: &'static str,
    },
}
