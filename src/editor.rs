//! Editing session over one mesh and one skeleton.
//!
//! [`Editor`] owns the document state a front end works on: the mesh, the
//! skeleton, the current [`Selection`] and whether the mesh is bound. All
//! operations act on the selection and report failure instead of panicking
//! when nothing suitable is selected.
//!
//! ```
//! use rigmesh::editor::{Editor, Selection};
//! use rigmesh::mesh::FaceId;
//!
//! let mut editor = Editor::new();
//! editor.select(Selection::Face(FaceId::new(0))).unwrap();
//! editor.select_halfedge_of_face().unwrap();
//! let v = editor.split_selected_edge().unwrap();
//! assert_eq!(editor.mesh().valence(v), 2);
//! ```

use log::{debug, warn};
use nalgebra::{Point3, Vector3};

use crate::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
use crate::edit::{split_edge, triangulate_face};
use crate::error::{Error, MeshError};
use crate::mesh::{build_cube, Color, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};
use crate::skeleton::{JointId, Skeleton, SkeletonDescription};
use crate::skin::{self, SkinBinder};

/// The element currently highlighted in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// A mesh vertex.
    Vertex(VertexId),
    /// A mesh half-edge.
    HalfEdge(HalfEdgeId),
    /// A mesh face.
    Face(FaceId),
    /// A skeleton joint.
    Joint(JointId),
}

/// Mesh, skeleton and selection for one document.
#[derive(Debug, Clone)]
pub struct Editor {
    mesh: HalfEdgeMesh,
    skeleton: Skeleton,
    binder: SkinBinder,
    selection: Option<Selection>,
    bound: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Start a session on the default cube with a single-joint skeleton.
    pub fn new() -> Self {
        Self::with_mesh(build_cube())
    }

    /// Start a session on `mesh` with a single-joint skeleton.
    pub fn with_mesh(mesh: HalfEdgeMesh) -> Self {
        Self {
            mesh,
            skeleton: Skeleton::new(),
            binder: SkinBinder::nearest(),
            selection: None,
            bound: false,
        }
    }

    /// The mesh being edited.
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// The skeleton being edited.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The current selection, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Whether the mesh is currently bound to the skeleton.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    // ==================== Selection ====================

    /// Select an element after checking that it exists.
    pub fn select(&mut self, selection: Selection) -> Result<(), Error> {
        match selection {
            Selection::Vertex(v) => {
                self.mesh.try_vertex(v)?;
            }
            Selection::HalfEdge(he) => {
                self.mesh.try_halfedge(he)?;
            }
            Selection::Face(f) => {
                self.mesh.try_face(f)?;
            }
            Selection::Joint(j) => {
                self.skeleton.joint(j)?;
            }
        }
        self.selection = Some(selection);
        Ok(())
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn selected_vertex(&self) -> Result<VertexId, Error> {
        match self.selection {
            Some(Selection::Vertex(v)) => Ok(v),
            _ => Err(no_selection("vertex")),
        }
    }

    fn selected_halfedge(&self) -> Result<HalfEdgeId, Error> {
        match self.selection {
            Some(Selection::HalfEdge(he)) => Ok(he),
            _ => Err(no_selection("half-edge")),
        }
    }

    fn selected_face(&self) -> Result<FaceId, Error> {
        match self.selection {
            Some(Selection::Face(f)) => Ok(f),
            _ => Err(no_selection("face")),
        }
    }

    fn selected_joint(&self) -> Result<JointId, Error> {
        match self.selection {
            Some(Selection::Joint(j)) => Ok(j),
            _ => Err(no_selection("joint")),
        }
    }

    /// Select the half-edge after the selected one in its cycle.
    pub fn select_next(&mut self) -> Result<Selection, Error> {
        let he = self.selected_halfedge()?;
        let next = self.mesh.try_halfedge(he)?.next;
        self.select(Selection::HalfEdge(next))?;
        Ok(Selection::HalfEdge(next))
    }

    /// Select the twin of the selected half-edge.
    pub fn select_sym(&mut self) -> Result<Selection, Error> {
        let he = self.selected_halfedge()?;
        let sym = self.mesh.try_halfedge(he)?.sym;
        self.select(Selection::HalfEdge(sym))?;
        Ok(Selection::HalfEdge(sym))
    }

    /// Select the vertex the selected half-edge points to.
    pub fn select_vertex_of_halfedge(&mut self) -> Result<Selection, Error> {
        let he = self.selected_halfedge()?;
        let v = self.mesh.try_halfedge(he)?.vertex;
        self.select(Selection::Vertex(v))?;
        Ok(Selection::Vertex(v))
    }

    /// Select the face of the selected half-edge.
    ///
    /// Fails on a boundary half-edge, which has no face.
    pub fn select_face_of_halfedge(&mut self) -> Result<Selection, Error> {
        let he = self.selected_halfedge()?;
        let f = self.mesh.try_halfedge(he)?.face;
        self.select(Selection::Face(f))?;
        Ok(Selection::Face(f))
    }

    /// Select the outgoing half-edge stored on the selected vertex.
    pub fn select_halfedge_of_vertex(&mut self) -> Result<Selection, Error> {
        let v = self.selected_vertex()?;
        let he = self.mesh.try_vertex(v)?.halfedge;
        self.select(Selection::HalfEdge(he))?;
        Ok(Selection::HalfEdge(he))
    }

    /// Select the boundary half-edge stored on the selected face.
    pub fn select_halfedge_of_face(&mut self) -> Result<Selection, Error> {
        let f = self.selected_face()?;
        let he = self.mesh.try_face(f)?.halfedge;
        self.select(Selection::HalfEdge(he))?;
        Ok(Selection::HalfEdge(he))
    }

    // ==================== Mesh edits ====================

    /// Split the selected edge at its midpoint and return the new vertex.
    ///
    /// If the mesh is bound, the new vertex is bound as well.
    pub fn split_selected_edge(&mut self) -> Result<VertexId, Error> {
        let he = self.selected_halfedge()?;
        let v = split_edge(&mut self.mesh, he).inspect_err(|e| warn!("split rejected: {}", e))?;
        if self.bound {
            self.binder.bind_vertex(&mut self.mesh, &self.skeleton, v)?;
        }
        Ok(v)
    }

    /// Fan-triangulate the selected face, returning the faces created.
    pub fn triangulate_selected_face(&mut self) -> Result<Vec<FaceId>, Error> {
        let f = self.selected_face()?;
        let created = triangulate_face(&mut self.mesh, f).inspect_err(|e| warn!("triangulation rejected: {}", e))?;
        Ok(created)
    }

    /// Subdivide the whole mesh; a bound mesh is rebound afterwards.
    ///
    /// Rebinding recomputes every vertex from the bind pose, so weights set
    /// by hand with [`Editor::set_influence`] are replaced.
    pub fn subdivide(&mut self, options: &SubdivideOptions) -> Result<(), Error> {
        catmull_clark_subdivide(&mut self.mesh, options).inspect_err(|e| warn!("subdivision rejected: {}", e))?;
        if self.bound {
            self.binder.bind_all(&mut self.mesh, &self.skeleton)?;
        }
        Ok(())
    }

    /// Set one coordinate of the selected vertex or joint.
    ///
    /// A joint's coordinate is its offset from its parent.
    pub fn set_selected_position(&mut self, axis: usize, value: f64) -> Result<(), Error> {
        if axis > 2 {
            return Err(MeshError::invalid_param("axis", axis, "must be 0, 1 or 2").into());
        }
        match self.selection {
            Some(Selection::Vertex(v)) => {
                let mut p = self.mesh.try_vertex(v)?.position;
                p[axis] = value;
                self.mesh.set_position(v, p);
            }
            Some(Selection::Joint(j)) => {
                self.skeleton.joint_mut(j)?.position[axis] = value;
            }
            _ => return Err(no_selection("vertex or joint")),
        }
        Ok(())
    }

    /// Recolor the selected face.
    pub fn set_face_color(&mut self, color: Color) -> Result<(), Error> {
        let f = self.selected_face()?;
        self.mesh.try_face(f)?;
        self.mesh.face_mut(f).color = color;
        Ok(())
    }

    // ==================== Skeleton and skin ====================

    /// Rotate the selected joint by `angle` radians about `axis`.
    pub fn rotate_selected_joint(&mut self, angle: f64, axis: Vector3<f64>) -> Result<(), Error> {
        let j = self.selected_joint()?;
        self.skeleton.rotate(j, angle, axis)?;
        Ok(())
    }

    /// Set influence slot `idx` of the selected vertex; see [`skin::set_influence`].
    pub fn set_influence(&mut self, val: f64, idx: usize) -> Result<(), Error> {
        let v = self.selected_vertex()?;
        skin::set_influence(&mut self.mesh, v, val, idx)?;
        Ok(())
    }

    /// Capture the skeleton's bind pose and bind every vertex.
    pub fn bind_mesh(&mut self) -> Result<(), Error> {
        self.skeleton.bind_all();
        let count = self.binder.bind_all(&mut self.mesh, &self.skeleton)?;
        self.bound = true;
        debug!("mesh bound: {} vertices", count);
        Ok(())
    }

    /// Clear every vertex binding.
    pub fn unbind_mesh(&mut self) {
        skin::unbind_all(&mut self.mesh);
        self.bound = false;
    }

    /// Replace the skeleton; a bound mesh is rebound to the new one.
    ///
    /// The new skeleton's current pose becomes its bind pose. If the skeleton
    /// cannot be built or the mesh cannot be rebound to it, the session is
    /// left as it was.
    pub fn load_skeleton(&mut self, description: &SkeletonDescription) -> Result<(), Error> {
        let mut skeleton = Skeleton::from_description(description)
            .inspect_err(|e| warn!("skeleton load rejected: {}", e))?;
        if self.bound {
            skeleton.bind_all();
            self.binder
                .bind_all(&mut self.mesh, &skeleton)
                .inspect_err(|e| warn!("rebind to loaded skeleton rejected: {}", e))?;
        }
        self.skeleton = skeleton;
        if matches!(self.selection, Some(Selection::Joint(_))) {
            self.selection = None;
        }
        Ok(())
    }

    /// Replace the mesh; the selection is cleared and a bound session rebinds
    /// it against the current bind pose. Nothing changes on error.
    pub fn set_mesh(&mut self, mut mesh: HalfEdgeMesh) -> Result<(), Error> {
        if self.bound {
            self.binder.bind_all(&mut mesh, &self.skeleton)?;
        }
        self.mesh = mesh;
        self.selection = None;
        Ok(())
    }

    /// Add a joint under the selected joint, or under the root when no joint
    /// is selected.
    pub fn add_joint(&mut self, local_position: Vector3<f64>) -> Result<JointId, Error> {
        let parent = match self.selection {
            Some(Selection::Joint(j)) => j,
            _ => self.skeleton.root(),
        };
        Ok(self.skeleton.add_child(parent, local_position)?)
    }

    /// Deformed vertex positions under the current pose.
    pub fn skinned_positions(&self) -> Result<Vec<Point3<f64>>, Error> {
        Ok(skin::skinned_positions(&self.mesh, &self.skeleton)?)
    }
}

fn no_selection(expected: &'static str) -> Error {
    warn!("operation needs a selected {}", expected);
    Error::NoSelection { expected }
}
