//! CPU linear-blend skinning, for inspection and tests.

use nalgebra::{Point3, Vector3};

use crate::error::SkinError;
use crate::mesh::{HalfEdgeMesh, VertexId};
use crate::skeleton::Skeleton;

/// Deformed position of `v` under the skeleton's current pose.
///
/// Each influence carries the rest position through its joint's bind
/// transform and current world transform; the results are blended by weight.
/// Immediately after binding this returns the rest position. Unbound vertices
/// are returned as they are.
pub fn skinned_position(mesh: &HalfEdgeMesh, skeleton: &Skeleton, v: VertexId) -> Result<Point3<f64>, SkinError> {
    let vertex = mesh.try_vertex(v)?;
    let Some(binding) = vertex.skin else {
        return Ok(vertex.position);
    };

    let mut blended = Vector3::zeros();
    for (joint, weight) in binding.joints.into_iter().zip(binding.weights) {
        let current = skeleton
            .world_transform(joint)
            .map_err(|_| SkinError::DanglingJoint { vertex: v, joint })?;
        let bind = skeleton
            .joint(joint)
            .map_err(|_| SkinError::DanglingJoint { vertex: v, joint })?
            .bind;
        blended += (current * (bind * vertex.position)).coords * weight;
    }
    Ok(Point3::from(blended))
}

/// Deformed positions of every vertex, in handle order.
pub fn skinned_positions(mesh: &HalfEdgeMesh, skeleton: &Skeleton) -> Result<Vec<Point3<f64>>, SkinError> {
    mesh.vertex_ids()
        .map(|v| skinned_position(mesh, skeleton, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::mesh::build_cube;
    use crate::skeleton::JointId;
    use crate::skin::{set_influence, SkinBinder};

    fn bound_cube() -> (HalfEdgeMesh, Skeleton, JointId) {
        let mut mesh = build_cube();
        let mut skeleton = Skeleton::new();
        let tip = skeleton.add_child(skeleton.root(), Vector3::new(0.0, 2.0, 0.0)).unwrap();
        skeleton.bind_all();
        SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();
        (mesh, skeleton, tip)
    }

    #[test]
    fn test_rest_pose_is_identity() {
        let (mesh, skeleton, _) = bound_cube();
        let deformed = skinned_positions(&mesh, &skeleton).unwrap();
        for (v, p) in mesh.vertex_ids().zip(deformed) {
            assert!((mesh.position(v) - p).norm() < 1e-12);
        }
    }

    #[test]
    fn test_full_weight_follows_joint() {
        let (mut mesh, mut skeleton, tip) = bound_cube();
        let v = VertexId::new(0);
        let slot = mesh.vertex(v).skin.unwrap().joints.iter().position(|&j| j == tip).unwrap();
        set_influence(&mut mesh, v, 1.0, slot).unwrap();

        skeleton.rotate(skeleton.root(), FRAC_PI_2, Vector3::z()).unwrap();

        // The whole hierarchy turned a quarter about Z around the origin.
        let rest = mesh.position(v);
        let expected = Point3::new(-rest.y, rest.x, rest.z);
        assert!((skinned_position(&mesh, &skeleton, v).unwrap() - expected).norm() < 1e-12);
    }

    #[test]
    fn test_blend_between_joints() {
        let (mut mesh, mut skeleton, tip) = bound_cube();
        let v = VertexId::new(0);
        let slot = mesh.vertex(v).skin.unwrap().joints.iter().position(|&j| j == tip).unwrap();
        set_influence(&mut mesh, v, 0.5, slot).unwrap();

        skeleton.set_position(tip, Vector3::new(0.0, 3.0, 0.0)).unwrap();

        // Half the weight follows a one-unit lift of the tip.
        let rest = mesh.position(v);
        let p = skinned_position(&mesh, &skeleton, v).unwrap();
        assert!((p - (rest + Vector3::new(0.0, 0.5, 0.0))).norm() < 1e-12);
    }

    #[test]
    fn test_unbound_vertex_is_unchanged() {
        let mesh = build_cube();
        let skeleton = Skeleton::new();
        let v = VertexId::new(5);
        assert_eq!(skinned_position(&mesh, &skeleton, v).unwrap(), *mesh.position(v));
    }

    #[test]
    fn test_dangling_binding() {
        let (mesh, mut skeleton, tip) = bound_cube();
        skeleton.remove_joint(tip).unwrap();
        assert!(matches!(
            skinned_positions(&mesh, &skeleton),
            Err(SkinError::DanglingJoint { joint, .. }) if joint == tip
        ));
    }
}
