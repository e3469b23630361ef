//! Joint arena and transform composition.

use log::{debug, trace};
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, Unit, UnitQuaternion, Vector3};

use crate::error::SkeletonError;
use crate::mesh::define_handle;

define_handle!(
    /// Handle to a joint in a [`Skeleton`].
    JointId,
    "J"
);

/// One node of the joint tree.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Display name.
    pub name: String,

    /// The owning joint, `None` for the root.
    pub parent: Option<JointId>,

    /// Children in insertion order.
    pub children: Vec<JointId>,

    /// Offset from the parent joint, in the parent's frame.
    pub position: Vector3<f64>,

    /// Orientation relative to the parent joint.
    pub rotation: UnitQuaternion<f64>,

    /// Inverse of the world transform captured by the last bind.
    pub bind: Isometry3<f64>,
}

impl Joint {
    fn new(id: JointId, parent: Option<JointId>, position: Vector3<f64>) -> Self {
        Self {
            name: default_name(id),
            parent,
            children: Vec::new(),
            position,
            rotation: UnitQuaternion::identity(),
            bind: Isometry3::identity(),
        }
    }

    /// Translation by the local offset followed by the local rotation.
    #[inline]
    pub fn local_transform(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    /// Check if this joint is the root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

pub(crate) fn default_name(id: JointId) -> String {
    format!("Joint #{}", id.index())
}

/// A tree of joints rooted at [`Skeleton::root`].
///
/// Joints are stored in a slot arena. The tree is the only ownership path:
/// a parent lists its children and a child only keeps a lookup handle back to
/// its parent. Removing a joint frees its whole subtree; freed slots are never
/// reused, so stale handles keep failing with [`SkeletonError::UnknownJoint`].
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Option<Joint>>,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

impl Skeleton {
    /// Create a skeleton holding a single root joint at the origin.
    pub fn new() -> Self {
        let root = JointId::new(0);
        Self {
            joints: vec![Some(Joint::new(root, None, Vector3::zeros()))],
        }
    }

    /// Handle of the root joint, always id 0.
    #[inline]
    pub fn root(&self) -> JointId {
        JointId::new(0)
    }

    /// Number of live joints.
    pub fn num_joints(&self) -> usize {
        self.joints.iter().filter(|j| j.is_some()).count()
    }

    /// Check if `id` names a live joint.
    #[inline]
    pub fn contains(&self, id: JointId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a joint.
    #[inline]
    pub fn get(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a joint, failing on stale or null handles.
    pub fn joint(&self, id: JointId) -> Result<&Joint, SkeletonError> {
        self.get(id).ok_or(SkeletonError::UnknownJoint(id))
    }

    /// Mutable access to a joint.
    pub fn joint_mut(&mut self, id: JointId) -> Result<&mut Joint, SkeletonError> {
        self.joints
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(SkeletonError::UnknownJoint(id))
    }

    /// Iterate over live joints in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.as_ref().map(|j| (JointId::new(i), j)))
    }

    /// Attach a new child with identity rotation at `local_position`.
    ///
    /// The child is named `"Joint #<id>"`.
    pub fn add_child(
        &mut self,
        parent: JointId,
        local_position: Vector3<f64>,
    ) -> Result<JointId, SkeletonError> {
        self.joint(parent)?;
        let id = JointId::new(self.joints.len());
        self.joints.push(Some(Joint::new(id, Some(parent), local_position)));
        self.joint_mut(parent)?.children.push(id);
        trace!("added {:?} under {:?}", id, parent);
        Ok(id)
    }

    /// Attach a new named child; see [`Skeleton::add_child`].
    pub fn add_named_child(
        &mut self,
        parent: JointId,
        name: impl Into<String>,
        local_position: Vector3<f64>,
    ) -> Result<JointId, SkeletonError> {
        let id = self.add_child(parent, local_position)?;
        self.joint_mut(id)?.name = name.into();
        Ok(id)
    }

    /// Move a joint relative to its parent.
    pub fn set_position(&mut self, id: JointId, position: Vector3<f64>) -> Result<(), SkeletonError> {
        self.joint_mut(id)?.position = position;
        Ok(())
    }

    /// First joint with the given name, in depth-first order.
    pub fn find_by_name(&self, name: &str) -> Option<JointId> {
        self.joints_depth_first()
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|j| j.name == name))
    }

    /// Transform of a joint relative to its parent.
    pub fn local_transform(&self, id: JointId) -> Result<Isometry3<f64>, SkeletonError> {
        Ok(self.joint(id)?.local_transform())
    }

    /// Transform from joint space to model space.
    ///
    /// The parent's world transform composed with the joint's local one,
    /// recursively up to the root.
    pub fn world_transform(&self, id: JointId) -> Result<Isometry3<f64>, SkeletonError> {
        let mut joint = self.joint(id)?;
        let mut world = joint.local_transform();
        while let Some(parent) = joint.parent {
            joint = self.joint(parent)?;
            world = joint.local_transform() * world;
        }
        Ok(world)
    }

    /// Model-space position of a joint.
    pub fn world_position(&self, id: JointId) -> Result<Point3<f64>, SkeletonError> {
        Ok(self.world_transform(id)? * Point3::origin())
    }

    /// Model-space position of a joint in its bind pose.
    ///
    /// Equals [`Skeleton::world_position`] right after binding and stays put
    /// while the skeleton is posed.
    pub fn rest_position(&self, id: JointId) -> Result<Point3<f64>, SkeletonError> {
        Ok(self.joint(id)?.bind.inverse_transform_point(&Point3::origin()))
    }

    /// Capture the current pose of `id` as its bind pose.
    pub fn bind_pose(&mut self, id: JointId) -> Result<(), SkeletonError> {
        let bind = self.world_transform(id)?.inverse();
        self.joint_mut(id)?.bind = bind;
        Ok(())
    }

    /// Capture the bind pose of every live joint.
    pub fn bind_all(&mut self) {
        let binds: Vec<(usize, Isometry3<f64>)> = self
            .iter()
            .filter_map(|(id, _)| self.world_transform(id).ok().map(|w| (id.index(), w.inverse())))
            .collect();
        for (i, bind) in binds {
            if let Some(joint) = self.joints[i].as_mut() {
                joint.bind = bind;
            }
        }
        debug!("captured bind pose for {} joints", self.num_joints());
    }

    /// Bind transform of a joint as a homogeneous matrix.
    pub fn bind_matrix(&self, id: JointId) -> Result<Matrix4<f64>, SkeletonError> {
        Ok(self.joint(id)?.bind.to_homogeneous())
    }

    /// Compose the joint's rotation on the right with `angle` radians about `axis`.
    ///
    /// The axis is normalized; a zero-length axis is rejected before anything
    /// changes.
    pub fn rotate(&mut self, id: JointId, angle: f64, axis: Vector3<f64>) -> Result<(), SkeletonError> {
        let delta = axis_angle(angle, axis)?;
        let joint = self.joint_mut(id)?;
        joint.rotation *= delta;
        Ok(())
    }

    /// Live joints in depth-first pre-order starting at the root.
    pub fn joints_depth_first(&self) -> Vec<JointId> {
        let mut order = Vec::with_capacity(self.joints.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Some(joint) = self.get(id) else { continue };
            order.push(id);
            stack.extend(joint.children.iter().rev().copied());
        }
        order
    }

    /// Remove a joint and its whole subtree, returning the removed handles.
    ///
    /// Vertices still bound to a removed joint keep the stale handle; the skin
    /// layer reports them as dangling.
    pub fn remove_joint(&mut self, id: JointId) -> Result<Vec<JointId>, SkeletonError> {
        let parent = self.joint(id)?.parent.ok_or(SkeletonError::RootRemoval)?;
        self.joint_mut(parent)?.children.retain(|&c| c != id);

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(joint) = self.joints.get_mut(current.index()).and_then(Option::take) {
                stack.extend(joint.children);
                removed.push(current);
            }
        }
        debug!("removed {} joint(s) rooted at {:?}", removed.len(), id);
        Ok(removed)
    }
}

/// Quaternion for `angle` radians about `axis`, or `ZeroAxis` if the axis is degenerate.
pub(crate) fn axis_angle(angle: f64, axis: Vector3<f64>) -> Result<UnitQuaternion<f64>, SkeletonError> {
    let axis = Unit::try_new(axis, f64::EPSILON).ok_or(SkeletonError::ZeroAxis)?;
    Ok(UnitQuaternion::from_axis_angle(&axis, angle))
}
