//! Topology invariant checks.
//!
//! Editing operations call the local checks before touching the store so a
//! malformed input is rejected without partial mutation.

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId};
use crate::error::{MeshError, Result};

impl HalfEdgeMesh {
    /// Verify that `he` exists and has a proper twin.
    pub fn check_twin(&self, he: HalfEdgeId) -> Result<()> {
        let sym = self.try_halfedge(he)?.sym;
        let broken = || MeshError::BrokenTwin { halfedge: he };
        let twin = self.halfedges.get(sym.index()).ok_or_else(broken)?;
        if sym == he || twin.sym != he {
            return Err(broken());
        }
        Ok(())
    }

    /// Verify that walking `next` from `he` returns to it; returns the cycle length.
    pub fn check_cycle(&self, he: HalfEdgeId) -> Result<usize> {
        let face = self.try_halfedge(he)?.face;
        let mut current = he;
        for len in 1..=self.halfedges.len() {
            current = match self.halfedges.get(current.index()) {
                Some(record) => record.next,
                None => break,
            };
            if current == he {
                return Ok(len);
            }
        }
        Err(MeshError::BrokenCycle { face })
    }

    /// Verify that the boundary cycle of `f` closes; returns its side count.
    pub fn check_face_cycle(&self, f: FaceId) -> Result<usize> {
        let start = self.try_face(f)?.halfedge;
        let broken = MeshError::BrokenCycle { face: f };
        if start.index() >= self.halfedges.len() {
            return Err(broken);
        }

        let mut current = start;
        for sides in 1..=self.halfedges.len() {
            let he = &self.halfedges[current.index()];
            if he.face != f {
                return Err(broken);
            }
            current = he.next;
            if current == start {
                return Ok(sides);
            }
            if current.index() >= self.halfedges.len() {
                return Err(broken);
            }
        }
        Err(broken)
    }

    /// Check every invariant of the store.
    ///
    /// - every half-edge has a twin with `sym(sym(e)) == e` and `sym(e) != e`
    /// - `next` is a permutation and consecutive half-edges meet at a vertex
    /// - every face cycle closes and only contains half-edges of that face
    /// - every vertex's stored half-edge leaves that vertex
    pub fn check_topology(&self) -> Result<()> {
        let n = self.halfedges.len();
        let mut incoming_next = vec![0u32; n];

        for he in self.halfedge_ids() {
            self.check_twin(he)?;
            let record = self.halfedge(he);
            if record.vertex.index() >= self.vertices.len() {
                return Err(MeshError::InvalidHandle {
                    kind: "vertex",
                    index: record.vertex.index(),
                });
            }
            if record.face.is_valid() && record.face.index() >= self.faces.len() {
                return Err(MeshError::InvalidHandle {
                    kind: "face",
                    index: record.face.index(),
                });
            }
            if record.next.index() >= n {
                return Err(MeshError::InvalidHandle {
                    kind: "half-edge",
                    index: record.next.index(),
                });
            }
            incoming_next[record.next.index()] += 1;
        }

        for he in self.halfedge_ids() {
            if incoming_next[he.index()] != 1 || self.dest(he) != self.origin(self.next(he)) {
                let face = self.face_of(he);
                return Err(if face.is_valid() {
                    MeshError::BrokenCycle { face }
                } else {
                    MeshError::NonManifold {
                        details: format!("boundary loop through {:?} is broken", he),
                    }
                });
            }
        }

        for f in self.face_ids() {
            self.check_face_cycle(f)?;
        }

        for (v, vertex) in self.vertices() {
            if vertex.halfedge.is_valid()
                && (vertex.halfedge.index() >= n || self.origin(vertex.halfedge) != v)
            {
                return Err(MeshError::BrokenVertex { vertex: v });
            }
        }

        Ok(())
    }

    /// Check if the mesh satisfies every topology invariant.
    pub fn is_valid(&self) -> bool {
        self.check_topology().is_ok()
    }
}
