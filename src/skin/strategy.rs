//! Joint selection policies for automatic binding.

use nalgebra::Point3;

use crate::error::SkinError;
use crate::mesh::{SkinBinding, VertexId};
use crate::skeleton::JointId;

/// Picks the two joints influencing a vertex and their blend weights.
///
/// `joints` holds every live joint with its rest-pose world position, in
/// handle order. Implementations must return two distinct joints whose
/// weights lie in `[0, 1]` and sum to 1.
pub trait InfluenceStrategy {
    /// Choose the binding for vertex `vertex` at `position`.
    fn select(
        &self,
        vertex: VertexId,
        position: &Point3<f64>,
        joints: &[(JointId, Point3<f64>)],
    ) -> Result<SkinBinding, SkinError>;
}

/// Bind each vertex to its two closest joints.
///
/// Weights are inversely proportional to distance: the closer joint gets
/// `d1 / (d0 + d1)`. Ties on distance go to the lower joint handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestJoints {
    /// Combined distances below this split the weight evenly.
    pub min_distance: f64,
}

impl NearestJoints {
    /// Create the strategy with the given evenly-split threshold.
    pub fn new(min_distance: f64) -> Self {
        Self { min_distance }
    }
}

impl Default for NearestJoints {
    fn default() -> Self {
        Self::new(1e-12)
    }
}

impl InfluenceStrategy for NearestJoints {
    fn select(
        &self,
        _vertex: VertexId,
        position: &Point3<f64>,
        joints: &[(JointId, Point3<f64>)],
    ) -> Result<SkinBinding, SkinError> {
        // Ordered by distance, then by handle.
        let beats = |d: f64, id: JointId, other: Option<(JointId, f64)>| {
            other.map_or(true, |(oid, od)| d < od || (d == od && id < oid))
        };

        let mut best: Option<(JointId, f64)> = None;
        let mut second: Option<(JointId, f64)> = None;

        for &(id, joint_pos) in joints {
            let d = (joint_pos - position).norm();
            if beats(d, id, best) {
                second = best;
                best = Some((id, d));
            } else if beats(d, id, second) {
                second = Some((id, d));
            }
        }

        let (Some((j0, d0)), Some((j1, d1))) = (best, second) else {
            return Err(SkinError::NotEnoughJoints {
                available: joints.len(),
            });
        };

        let total = d0 + d1;
        let weights = if total < self.min_distance {
            [0.5, 0.5]
        } else {
            let w0 = d1 / total;
            [w0, 1.0 - w0]
        };

        Ok(SkinBinding {
            joints: [j0, j1],
            weights,
        })
    }
}

/// Bind every vertex to the same pair of joints with fixed weights.
///
/// This is the explicit choice an editor makes when the user picks the
/// influences by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedInfluence {
    binding: SkinBinding,
}

impl FixedInfluence {
    /// Influence `first` with `weight` and `second` with `1 - weight`.
    pub fn new(first: JointId, second: JointId, weight: f64) -> Result<Self, SkinError> {
        if first == second {
            return Err(SkinError::DuplicateJoint(first));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(SkinError::InvalidWeight(weight));
        }
        Ok(Self {
            binding: SkinBinding {
                joints: [first, second],
                weights: [weight, 1.0 - weight],
            },
        })
    }
}

impl InfluenceStrategy for FixedInfluence {
    fn select(
        &self,
        vertex: VertexId,
        _position: &Point3<f64>,
        joints: &[(JointId, Point3<f64>)],
    ) -> Result<SkinBinding, SkinError> {
        for joint in self.binding.joints {
            if !joints.iter().any(|&(id, _)| id == joint) {
                return Err(SkinError::DanglingJoint { vertex, joint });
            }
        }
        Ok(self.binding)
    }
}
