//! Declarative skeleton descriptions.
//!
//! A description is a JSON tree wrapped in a `root` object:
//!
//! ```json
//! {
//!   "root": {
//!     "name": "hip",
//!     "pos": [0.0, 0.0, 0.0],
//!     "rot": [0.0, 0.0, 1.0, 0.0],
//!     "children": [
//!       { "name": "knee", "pos": [0.0, -1.0, 0.0], "rot": [0.5, 1.0, 0.0, 0.0], "children": [] }
//!     ]
//!   }
//! }
//! ```
//!
//! `rot` is `[angle, axis_x, axis_y, axis_z]` with the angle in radians. Every
//! field except `root` may be omitted.

use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::joint::{axis_angle, default_name, JointId, Skeleton};
use crate::error::SkeletonError;

/// Top-level description document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDescription {
    /// The root joint.
    pub root: JointDescription,
}

/// One joint of a description tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointDescription {
    /// Joint name; defaults to `"Joint #<id>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Offset from the parent joint.
    #[serde(default)]
    pub pos: [f64; 3],

    /// Initial rotation as `[angle, x, y, z]`.
    #[serde(default)]
    pub rot: [f64; 4],

    /// Children in attachment order.
    #[serde(default)]
    pub children: Vec<JointDescription>,
}

impl SkeletonDescription {
    /// Parse a description from JSON text.
    pub fn from_json(text: &str) -> Result<Self, SkeletonError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the description as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SkeletonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Skeleton {
    /// Build a skeleton from a description.
    ///
    /// Joints get fresh ids in depth-first pre-order, the root being 0. Each
    /// joint's `rot` is applied as a single [`Skeleton::rotate`]; a zero angle
    /// leaves the joint unrotated whatever the axis.
    pub fn from_description(description: &SkeletonDescription) -> Result<Self, SkeletonError> {
        let mut skeleton = Skeleton::new();
        let root = skeleton.root();
        skeleton.apply_description(root, &description.root)?;
        debug!("loaded skeleton with {} joints", skeleton.num_joints());
        Ok(skeleton)
    }

    /// Replace this skeleton with one built from `description`.
    ///
    /// On error the current hierarchy is left untouched.
    pub fn load_from_description(
        &mut self,
        description: &SkeletonDescription,
    ) -> Result<(), SkeletonError> {
        *self = Self::from_description(description)?;
        Ok(())
    }

    /// Describe the current hierarchy, rotations included.
    pub fn to_description(&self) -> Result<SkeletonDescription, SkeletonError> {
        Ok(SkeletonDescription {
            root: self.describe(self.root())?,
        })
    }

    fn apply_description(&mut self, id: JointId, node: &JointDescription) -> Result<(), SkeletonError> {
        let [angle, x, y, z] = node.rot;
        let rotation = if angle == 0.0 {
            None
        } else {
            Some(axis_angle(angle, Vector3::new(x, y, z))?)
        };

        let joint = self.joint_mut(id)?;
        joint.name = node.name.clone().unwrap_or_else(|| default_name(id));
        joint.position = Vector3::from(node.pos);
        if let Some(rotation) = rotation {
            joint.rotation *= rotation;
        }

        for child in &node.children {
            let child_id = self.add_child(id, Vector3::zeros())?;
            self.apply_description(child_id, child)?;
        }
        Ok(())
    }

    fn describe(&self, id: JointId) -> Result<JointDescription, SkeletonError> {
        let joint = self.joint(id)?;
        let rot = match joint.rotation.axis_angle() {
            Some((axis, angle)) => [angle, axis.x, axis.y, axis.z],
            None => [0.0; 4],
        };
        let children = joint
            .children
            .iter()
            .map(|&c| self.describe(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JointDescription {
            name: Some(joint.name.clone()),
            pos: joint.position.into(),
            rot,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, UnitQuaternion};

    use super::*;

    const LEG: &str = r#"{
        "root": {
            "name": "hip",
            "pos": [0, 1, 0],
            "rot": [0, 0, 0, 0],
            "children": [
                {
                    "name": "knee",
                    "pos": [0, -1, 0],
                    "rot": [1.5707963267948966, 0, 0, 1],
                    "children": [
                        { "name": "ankle", "pos": [0, -1, 0], "rot": [0, 1, 0, 0], "children": [] }
                    ]
                },
                { "name": "tail", "pos": [0, 0, -1], "rot": [0, 0, 0, 0], "children": [] }
            ]
        }
    }"#;

    #[test]
    fn test_parse_and_build() {
        let description = SkeletonDescription::from_json(LEG).unwrap();
        let skeleton = Skeleton::from_description(&description).unwrap();

        assert_eq!(skeleton.num_joints(), 4);
        let names: Vec<&str> = skeleton
            .joints_depth_first()
            .into_iter()
            .map(|id| skeleton.joint(id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["hip", "knee", "ankle", "tail"]);

        // Ids follow pre-order from the root.
        assert_eq!(skeleton.find_by_name("hip"), Some(JointId::new(0)));
        assert_eq!(skeleton.find_by_name("ankle"), Some(JointId::new(2)));
        assert_eq!(skeleton.find_by_name("tail"), Some(JointId::new(3)));
    }

    #[test]
    fn test_initial_rotation_is_applied() {
        let skeleton = Skeleton::from_description(&SkeletonDescription::from_json(LEG).unwrap()).unwrap();
        let ankle = skeleton.find_by_name("ankle").unwrap();

        // Knee at (0, 0, 0) turned a quarter about Z sends (0, -1, 0) to (1, 0, 0).
        let p = skeleton.world_position(ankle).unwrap();
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(skeleton.joint(JointId::new(0)).unwrap().rotation, UnitQuaternion::identity());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let description = SkeletonDescription::from_json(r#"{ "root": { "children": [ {} ] } }"#).unwrap();
        let skeleton = Skeleton::from_description(&description).unwrap();
        assert_eq!(skeleton.joint(JointId::new(0)).unwrap().name, "Joint #0");
        assert_eq!(skeleton.joint(JointId::new(1)).unwrap().name, "Joint #1");
        assert_eq!(skeleton.joint(JointId::new(1)).unwrap().position, Vector3::zeros());
    }

    #[test]
    fn test_zero_axis_with_angle_is_rejected() {
        let description =
            SkeletonDescription::from_json(r#"{ "root": { "rot": [1.0, 0, 0, 0] } }"#).unwrap();
        assert_eq!(Skeleton::from_description(&description).unwrap_err(), SkeletonError::ZeroAxis);
    }

    #[test]
    fn test_failed_load_keeps_current_skeleton() {
        let mut skeleton = Skeleton::new();
        skeleton.add_child(skeleton.root(), Vector3::x()).unwrap();
        let bad = SkeletonDescription::from_json(r#"{ "root": { "children": [ { "rot": [2, 0, 0, 0] } ] } }"#)
            .unwrap();

        assert!(skeleton.load_from_description(&bad).is_err());
        assert_eq!(skeleton.num_joints(), 2);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SkeletonDescription::from_json("{ \"root\": 3 }"),
            Err(SkeletonError::Description(_))
        ));
    }

    #[test]
    fn test_description_survives_json() {
        let original = Skeleton::from_description(&SkeletonDescription::from_json(LEG).unwrap()).unwrap();
        let text = original.to_description().unwrap().to_json().unwrap();
        let reloaded = Skeleton::from_description(&SkeletonDescription::from_json(&text).unwrap()).unwrap();

        for id in original.joints_depth_first() {
            let a = original.world_position(id).unwrap();
            let b = reloaded.world_position(id).unwrap();
            assert!((a - b).norm() < 1e-12);
        }
    }
}
