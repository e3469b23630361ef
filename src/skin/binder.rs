//! Assigning skin influences to mesh vertices.

use log::{debug, warn};
use nalgebra::Point3;

use super::strategy::{InfluenceStrategy, NearestJoints};
use crate::error::SkinError;
use crate::mesh::{HalfEdgeMesh, SkinBinding, VertexId};
use crate::skeleton::{JointId, Skeleton};

/// Binds mesh vertices to skeleton joints through an [`InfluenceStrategy`].
///
/// # Example
///
/// ```
/// use rigmesh::mesh::build_cube;
/// use rigmesh::skeleton::Skeleton;
/// use rigmesh::skin::SkinBinder;
/// use nalgebra::Vector3;
///
/// let mut mesh = build_cube();
/// let mut skeleton = Skeleton::new();
/// skeleton.add_child(skeleton.root(), Vector3::new(0.0, 1.0, 0.0)).unwrap();
/// skeleton.bind_all();
///
/// let bound = SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();
/// assert_eq!(bound, 8);
/// ```
#[derive(Debug, Clone)]
pub struct SkinBinder<S = NearestJoints> {
    strategy: S,
}

impl SkinBinder {
    /// Create a binder using [`NearestJoints`] with default settings.
    pub fn nearest() -> Self {
        Self::new(NearestJoints::default())
    }
}

impl Default for SkinBinder {
    fn default() -> Self {
        Self::nearest()
    }
}

impl<S: InfluenceStrategy> SkinBinder<S> {
    /// Create a binder using `strategy`.
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Bind every vertex of `mesh`, returning how many were bound.
    ///
    /// Joint positions are read from the bind pose (see
    /// [`Skeleton::rest_position`]), so posing the skeleton after
    /// [`Skeleton::bind_all`] does not change the result. All bindings are
    /// computed before any vertex is written, so a failure leaves the previous
    /// bindings in place.
    pub fn bind_all(&self, mesh: &mut HalfEdgeMesh, skeleton: &Skeleton) -> Result<usize, SkinError> {
        let joints = joint_positions(skeleton);
        let bindings = mesh
            .vertex_ids()
            .map(|v| self.select_checked(v, mesh.position(v), &joints))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, binding) in bindings.into_iter().enumerate() {
            mesh.vertex_mut(VertexId::new(i)).skin = Some(binding);
        }
        debug!(
            "bound {} vertices to {} joints",
            mesh.num_vertices(),
            joints.len()
        );
        Ok(mesh.num_vertices())
    }

    /// Bind a single vertex against the bind pose and return its new binding.
    pub fn bind_vertex(
        &self,
        mesh: &mut HalfEdgeMesh,
        skeleton: &Skeleton,
        v: VertexId,
    ) -> Result<SkinBinding, SkinError> {
        let position = mesh.try_vertex(v)?.position;
        let binding = self.select_checked(v, &position, &joint_positions(skeleton))?;
        mesh.vertex_mut(v).skin = Some(binding);
        Ok(binding)
    }

    fn select_checked(
        &self,
        v: VertexId,
        position: &Point3<f64>,
        joints: &[(JointId, Point3<f64>)],
    ) -> Result<SkinBinding, SkinError> {
        let binding = self.strategy.select(v, position, joints)?;
        validate(v, &binding, |j| joints.iter().any(|&(id, _)| id == j))?;
        Ok(binding)
    }
}

/// Set influence slot `idx` of `v` to `val`; the other slot becomes `1 - val`.
///
/// # Errors
///
/// Rejects an invalid vertex, an unbound vertex, an index other than 0 or 1,
/// or a value outside `[0, 1]`. Nothing changes on error.
pub fn set_influence(mesh: &mut HalfEdgeMesh, v: VertexId, val: f64, idx: usize) -> Result<(), SkinError> {
    if idx > 1 {
        return Err(SkinError::InvalidInfluenceIndex(idx));
    }
    if !(0.0..=1.0).contains(&val) {
        return Err(SkinError::InvalidWeight(val));
    }
    mesh.try_vertex(v)?;
    let Some(binding) = mesh.vertex_mut(v).skin.as_mut() else {
        warn!("set_influence on unbound {:?}", v);
        return Err(SkinError::NotBound(v));
    };
    binding.weights[idx] = val;
    binding.weights[1 - idx] = 1.0 - val;
    Ok(())
}

/// Clear the binding of `v`.
pub fn unbind(mesh: &mut HalfEdgeMesh, v: VertexId) -> Result<(), SkinError> {
    mesh.try_vertex(v)?;
    mesh.vertex_mut(v).skin = None;
    Ok(())
}

/// Clear every binding in the mesh.
pub fn unbind_all(mesh: &mut HalfEdgeMesh) {
    for v in mesh.vertex_ids().collect::<Vec<_>>() {
        mesh.vertex_mut(v).skin = None;
    }
}

/// Verify that every binding references live, distinct joints with weights
/// in `[0, 1]` summing to 1.
pub fn check_bindings(mesh: &HalfEdgeMesh, skeleton: &Skeleton) -> Result<(), SkinError> {
    for (v, vertex) in mesh.vertices() {
        if let Some(binding) = &vertex.skin {
            validate(v, binding, |j| skeleton.contains(j))?;
        }
    }
    Ok(())
}

fn validate(v: VertexId, binding: &SkinBinding, is_live: impl Fn(JointId) -> bool) -> Result<(), SkinError> {
    let [j0, j1] = binding.joints;
    if j0 == j1 {
        return Err(SkinError::DuplicateJoint(j0));
    }
    if let Some(joint) = binding.joints.into_iter().find(|&j| !is_live(j)) {
        return Err(SkinError::DanglingJoint { vertex: v, joint });
    }
    if let Some(&w) = binding.weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
        return Err(SkinError::InvalidWeight(w));
    }
    let sum = binding.weights[0] + binding.weights[1];
    if (sum - 1.0).abs() > 1e-9 {
        return Err(SkinError::InvalidWeight(sum));
    }
    Ok(())
}

fn joint_positions(skeleton: &Skeleton) -> Vec<(JointId, Point3<f64>)> {
    skeleton
        .iter()
        .filter_map(|(id, _)| skeleton.rest_position(id).ok().map(|p| (id, p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::*;
    use crate::error::MeshError;
    use crate::mesh::build_cube;
    use crate::skin::FixedInfluence;

    fn two_joint_skeleton() -> (Skeleton, JointId) {
        let mut skeleton = Skeleton::new();
        let top = skeleton.add_child(skeleton.root(), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        skeleton.bind_all();
        (skeleton, top)
    }

    #[test]
    fn test_bind_all_postcondition() {
        let mut mesh = build_cube();
        let (skeleton, _) = two_joint_skeleton();

        SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();

        assert_eq!(mesh.num_bound_vertices(), mesh.num_vertices());
        for (_, vertex) in mesh.vertices() {
            let b = vertex.skin.unwrap();
            assert_ne!(b.joints[0], b.joints[1]);
            assert_eq!(b.weights[0] + b.weights[1], 1.0);
        }
        assert!(check_bindings(&mesh, &skeleton).is_ok());
    }

    #[test]
    fn test_bind_all_single_joint_fails_untouched() {
        let mut mesh = build_cube();
        let skeleton = Skeleton::new();
        assert_eq!(
            SkinBinder::nearest().bind_all(&mut mesh, &skeleton),
            Err(SkinError::NotEnoughJoints { available: 1 })
        );
        assert_eq!(mesh.num_bound_vertices(), 0);
    }

    #[test]
    fn test_bind_vertex() {
        let mut mesh = build_cube();
        let (skeleton, top) = two_joint_skeleton();
        let binder = SkinBinder::new(FixedInfluence::new(top, skeleton.root(), 0.25).unwrap());

        let b = binder.bind_vertex(&mut mesh, &skeleton, VertexId::new(3)).unwrap();

        assert_eq!(b.joints, [top, skeleton.root()]);
        assert_eq!(mesh.vertex(VertexId::new(3)).skin, Some(b));
        assert_eq!(mesh.num_bound_vertices(), 1);
        assert!(matches!(
            binder.bind_vertex(&mut mesh, &skeleton, VertexId::new(99)),
            Err(SkinError::Mesh(MeshError::InvalidHandle { .. }))
        ));
    }

    #[test]
    fn test_posing_does_not_change_selection() {
        let (mut skeleton, top) = two_joint_skeleton();
        let mut rest = build_cube();
        SkinBinder::nearest().bind_all(&mut rest, &skeleton).unwrap();

        skeleton.rotate(skeleton.root(), std::f64::consts::PI, Vector3::x()).unwrap();
        skeleton.set_position(top, Vector3::new(0.0, 3.0, 0.0)).unwrap();
        let mut posed = build_cube();
        SkinBinder::nearest().bind_all(&mut posed, &skeleton).unwrap();

        for v in rest.vertex_ids() {
            assert_eq!(rest.vertex(v).skin, posed.vertex(v).skin);
        }
    }

    #[test]
    fn test_set_influence_keeps_weights_complementary() {
        let mut mesh = build_cube();
        let (skeleton, _) = two_joint_skeleton();
        SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();
        let v = VertexId::new(0);

        for step in 0..=20 {
            let val = step as f64 / 20.0;
            for idx in 0..2 {
                set_influence(&mut mesh, v, val, idx).unwrap();
                let w = mesh.vertex(v).skin.unwrap().weights;
                assert_eq!(w[idx], val);
                assert_eq!(w[0] + w[1], 1.0);
            }
        }
    }

    #[test]
    fn test_set_influence_rejections() {
        let mut mesh = build_cube();
        let v = VertexId::new(0);
        assert_eq!(set_influence(&mut mesh, v, 0.5, 0), Err(SkinError::NotBound(v)));
        assert_eq!(set_influence(&mut mesh, v, 0.5, 2), Err(SkinError::InvalidInfluenceIndex(2)));
        assert_eq!(set_influence(&mut mesh, v, -0.1, 0), Err(SkinError::InvalidWeight(-0.1)));
        assert!(set_influence(&mut mesh, v, f64::NAN, 0).is_err());
    }

    #[test]
    fn test_unbind() {
        let mut mesh = build_cube();
        let (skeleton, _) = two_joint_skeleton();
        SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();

        unbind(&mut mesh, VertexId::new(2)).unwrap();
        assert!(!mesh.vertex(VertexId::new(2)).is_bound());
        assert_eq!(mesh.num_bound_vertices(), 7);

        unbind_all(&mut mesh);
        assert_eq!(mesh.num_bound_vertices(), 0);
    }

    #[test]
    fn test_removed_joint_is_dangling() {
        let mut mesh = build_cube();
        let (mut skeleton, top) = two_joint_skeleton();
        SkinBinder::nearest().bind_all(&mut mesh, &skeleton).unwrap();

        skeleton.remove_joint(top).unwrap();

        assert!(matches!(
            check_bindings(&mesh, &skeleton),
            Err(SkinError::DanglingJoint { joint, .. }) if joint == top
        ));
    }
}
