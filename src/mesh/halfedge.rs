//! Half-edge topology store.
//!
//! Vertices, half-edges and faces are kept in three append-only arenas and refer to
//! each other through handles, never through references, so the cyclic
//! `next`/`sym`/`face` graph needs no shared ownership.
//!
//! # Conventions
//!
//! - A half-edge stores its **destination** vertex; its origin is the destination
//!   of its twin (`sym`).
//! - Every half-edge has a twin. Edges on an open border pair an interior half-edge
//!   with a **boundary** half-edge whose face is null; boundary half-edges are linked
//!   into closed loops through `next` just like face cycles.
//! - A vertex stores one **outgoing** half-edge. Repeatedly applying `next(sym(h))`
//!   walks every outgoing half-edge of that vertex once per turn.

use nalgebra::{Point3, Vector3};

use super::color::Color;
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};
use crate::skeleton::JointId;

/// Two-joint skin influence carried by a bound vertex.
///
/// `weights[0] + weights[1]` is always 1.0; the skin binder is the only writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinBinding {
    /// The two distinct influencing joints.
    pub joints: [JointId; 2],
    /// Blend weight of each joint.
    pub weights: [f64; 2],
}

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One half-edge leaving this vertex.
    pub halfedge: HalfEdgeId,

    /// Skin influence, `None` while the vertex is unbound.
    pub skin: Option<SkinBinding>,
}

impl Vertex {
    /// Create a new unbound vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            skin: None,
        }
    }

    /// Whether the vertex carries a skin binding.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.skin.is_some()
    }
}

/// A directed side of an edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub vertex: VertexId,

    /// The opposite half-edge of the same edge.
    pub sym: HalfEdgeId,

    /// The next half-edge around the face (or boundary loop).
    pub next: HalfEdgeId,

    /// The face this half-edge bounds. Null for boundary half-edges.
    pub face: FaceId,
}

impl HalfEdge {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            vertex: VertexId::invalid(),
            sym: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A polygonal face.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// Display color of the face.
    pub color: Color,

    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

impl Face {
    /// Create a new face with the given color and no boundary yet.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A polygon mesh stored as half-edges.
///
/// Handles are slot indices into append-only vectors: growing a vector never
/// invalidates a handle even though the elements may move in memory.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Allocation ====================

    /// Append an unbound vertex and return its handle.
    pub fn new_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Append an unlinked half-edge and return its handle.
    pub fn new_halfedge(&mut self) -> HalfEdgeId {
        let id = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge::new());
        id
    }

    /// Append a face with no boundary and return its handle.
    pub fn new_face(&mut self, color: Color) -> FaceId {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(color));
        id
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Get a vertex by handle.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by handle.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by handle.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by handle.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by handle.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get a mutable face by handle.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id.index()]
    }

    /// Look up a vertex, failing on null or out-of-range handles.
    pub fn try_vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices.get(id.index()).ok_or(MeshError::InvalidHandle {
            kind: "vertex",
            index: id.index(),
        })
    }

    /// Look up a half-edge, failing on null or out-of-range handles.
    pub fn try_halfedge(&self, id: HalfEdgeId) -> Result<&HalfEdge> {
        self.halfedges.get(id.index()).ok_or(MeshError::InvalidHandle {
            kind: "half-edge",
            index: id.index(),
        })
    }

    /// Look up a face, failing on null or out-of-range handles.
    pub fn try_face(&self, id: FaceId) -> Result<&Face> {
        self.faces.get(id.index()).ok_or(MeshError::InvalidHandle {
            kind: "face",
            index: id.index(),
        })
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    /// Get the color of a face.
    #[inline]
    pub fn color(&self, f: FaceId) -> Color {
        self.face(f).color
    }

    // ==================== Topology Queries ====================

    /// Get the twin half-edge.
    #[inline]
    pub fn sym(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).sym
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).vertex
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.dest(self.sym(he))
    }

    /// Get the face of a half-edge (null on the boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Get the half-edge whose `next` is `he`, by walking the cycle.
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        let mut current = he;
        for _ in 0..self.halfedges.len() {
            let n = self.next(current);
            if n == he {
                return current;
            }
            current = n;
        }
        HalfEdgeId::invalid()
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.sym(he))
    }

    /// Check if a vertex touches the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_edge(he))
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex handles.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their handles.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge handles.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face handles.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their handles.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the outgoing half-edges of a vertex.
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over faces incident to a vertex, skipping boundary gaps.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v)
            .map(|he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    /// Iterate over the half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> CycleIter<'_> {
        CycleIter::new(self, self.face(f).halfedge)
    }

    /// Iterate over the corners of a face, in cycle order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.dest(he))
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Undirected edges, one half-edge per edge, in face order.
    ///
    /// The representative is the first half-edge met while walking faces in
    /// handle order, so it always borders a face.
    pub fn edges(&self) -> Vec<HalfEdgeId> {
        let mut seen = vec![false; self.halfedges.len()];
        let mut edges = Vec::with_capacity(self.halfedges.len() / 2);
        for f in self.face_ids() {
            for he in self.face_halfedges(f) {
                if seen[he.index()] {
                    continue;
                }
                seen[he.index()] = true;
                seen[self.sym(he).index()] = true;
                edges.push(he);
            }
        }
        edges
    }

    // ==================== Geometry ====================

    /// Mean of a face's corner positions.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut n = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            n += 1;
        }
        if n == 0 {
            return Point3::origin();
        }
        Point3::from(sum / n as f64)
    }

    /// Midpoint of the edge containing `he`.
    pub fn edge_midpoint(&self, he: HalfEdgeId) -> Point3<f64> {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Check if every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 4)
    }

    /// Check if every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    /// Number of vertices carrying a skin binding.
    pub fn num_bound_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_bound()).count()
    }
}

/// Iterator over the outgoing half-edges of a vertex.
///
/// Stops after one full turn, or after visiting as many half-edges as the
/// mesh holds if the fan never closes.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    remaining: usize,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;

        // sym(h) arrives back at the vertex; the half-edge after it leaves again.
        self.current = self.mesh.next(self.mesh.sym(self.current));
        if self.current == self.start {
            self.remaining = 0;
        }

        Some(result)
    }
}

/// Iterator over a `next` cycle (face boundary or boundary loop).
pub struct CycleIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    remaining: usize,
}

impl<'a> CycleIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, start: HalfEdgeId) -> Self {
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a> Iterator for CycleIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        self.current = self.mesh.next(self.current);
        if self.current == self.start {
            self.remaining = 0;
        }

        Some(result)
    }
}
