//! Catmull-Clark pass built from edge splits and a quadrangulation step.

use log::{debug, trace};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::algo::Progress;
use crate::edit::split_edge;
use crate::error::{MeshError, Result};
use crate::mesh::{Color, ColorJitter, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

use super::SubdivideOptions;

const PHASES: usize = 4;

/// Run `options.iterations` subdivision passes on `mesh`.
///
/// # Errors
///
/// Each pass validates the whole store before touching it; a malformed mesh
/// is rejected with the first broken invariant and left as it was. Passes
/// already completed are kept.
pub fn catmull_clark_subdivide(mesh: &mut HalfEdgeMesh, options: &SubdivideOptions) -> Result<()> {
    catmull_clark_subdivide_with_progress(mesh, options, &Progress::none())
}

/// Catmull-Clark subdivision with progress reporting.
///
/// Each pass reports four phases: face centroids, edge points, vertex
/// smoothing and quadrangulation.
pub fn catmull_clark_subdivide_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    let iterations = options.iterations;
    for iteration in 0..iterations {
        subdivide_once(mesh, options, progress, iteration, iterations)?;
    }
    progress.report_phase(iterations, iterations, 0, PHASES, "Catmull-Clark subdivision");
    Ok(())
}

/// Run a single subdivision pass, ignoring `options.iterations`.
pub fn catmull_clark_pass(mesh: &mut HalfEdgeMesh, options: &SubdivideOptions) -> Result<()> {
    subdivide_once(mesh, options, &Progress::none(), 0, 1)
}

fn subdivide_once(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
    iteration: usize,
    iterations: usize,
) -> Result<()> {
    mesh.check_topology()?;

    if mesh.num_faces() == 0 {
        debug!("nothing to subdivide");
        return Ok(());
    }

    // Face pass
    progress.report_phase(iteration, iterations, 0, PHASES, "computing face centroids");
    let vert_cutoff = mesh.num_vertices();
    let face_cutoff = mesh.num_faces();
    let centroids: Vec<Point3<f64>> = if options.parallel {
        (0..face_cutoff)
            .into_par_iter()
            .map(|i| mesh.face_centroid(FaceId::new(i)))
            .collect()
    } else {
        (0..face_cutoff)
            .map(|i| mesh.face_centroid(FaceId::new(i)))
            .collect()
    };

    // Edge pass
    progress.report_phase(iteration, iterations, 1, PHASES, "splitting edges");
    let edges = mesh.edges();
    let edge_points: Vec<Point3<f64>> = if options.parallel {
        edges
            .par_iter()
            .map(|&e| edge_point(mesh, e, &centroids))
            .collect()
    } else {
        edges.iter().map(|&e| edge_point(mesh, e, &centroids)).collect()
    };
    for (&e, &point) in edges.iter().zip(&edge_points) {
        let v = split_edge(mesh, e)?;
        mesh.set_position(v, point);
    }

    // Vertex smoothing pass, reading only positions frozen above
    progress.report_phase(iteration, iterations, 2, PHASES, "smoothing original vertices");
    let preserve = options.preserve_boundary;
    let smoothed: Vec<Point3<f64>> = if options.parallel {
        (0..vert_cutoff)
            .into_par_iter()
            .map(|i| smoothed_position(mesh, VertexId::new(i), &centroids, preserve))
            .collect()
    } else {
        (0..vert_cutoff)
            .map(|i| smoothed_position(mesh, VertexId::new(i), &centroids, preserve))
            .collect()
    };
    for (i, pos) in smoothed.into_iter().enumerate() {
        mesh.set_position(VertexId::new(i), pos);
    }

    // Quadrangulation pass
    progress.report_phase(iteration, iterations, 3, PHASES, "quadrangulating faces");
    for (i, &centroid) in centroids.iter().enumerate() {
        quadrangulate(mesh, FaceId::new(i), centroid, vert_cutoff)?;
    }

    debug!(
        "subdivision pass {}/{}: {} edges split, {} faces -> {} quads, {} vertices",
        iteration + 1,
        iterations,
        edges.len(),
        face_cutoff,
        mesh.num_faces(),
        mesh.num_vertices()
    );
    Ok(())
}

/// Mean of the edge's endpoints and both adjacent centroids; the plain
/// midpoint when the edge borders a hole.
fn edge_point(mesh: &HalfEdgeMesh, e: HalfEdgeId, centroids: &[Point3<f64>]) -> Point3<f64> {
    let f1 = mesh.face_of(e);
    let f2 = mesh.face_of(mesh.sym(e));
    if !f1.is_valid() || !f2.is_valid() {
        return mesh.edge_midpoint(e);
    }
    let sum = mesh.position(mesh.origin(e)).coords
        + mesh.position(mesh.dest(e)).coords
        + centroids[f1.index()].coords
        + centroids[f2.index()].coords;
    Point3::from(sum * 0.25)
}

/// New position of an original vertex once every edge has been split.
///
/// Each outgoing half-edge now ends at the edge point of one incident edge.
/// Interior vertices use `((n-2)/n) v + sum_mid/n^2 + sum_centroid/n^2`.
fn smoothed_position(
    mesh: &HalfEdgeMesh,
    v: VertexId,
    centroids: &[Point3<f64>],
    preserve_boundary: bool,
) -> Point3<f64> {
    let pos = *mesh.position(v);
    let mut n = 0usize;
    let mut sum_mid = Vector3::zeros();
    let mut sum_centroid = Vector3::zeros();
    let mut border_mids = Vec::new();

    for he in mesh.vertex_halfedges(v) {
        n += 1;
        let mid = mesh.position(mesh.dest(he)).coords;
        sum_mid += mid;
        let f = mesh.face_of(he);
        if f.is_valid() {
            sum_centroid += centroids[f.index()].coords;
        }
        if mesh.is_boundary_edge(he) {
            border_mids.push(mid);
        }
    }

    if n == 0 {
        return pos;
    }

    if preserve_boundary && !border_mids.is_empty() {
        // Cubic B-spline rule along the border curve.
        if let [m1, m2] = border_mids[..] {
            return Point3::from(pos.coords * 0.5 + (m1 + m2) * 0.25);
        }
        return pos;
    }

    let nf = n as f64;
    Point3::from(pos.coords * ((nf - 2.0) / nf) + sum_mid / (nf * nf) + sum_centroid / (nf * nf))
}

/// Cut an already edge-split face into one quad per original side around a
/// new vertex at `centroid`.
///
/// The face cycle alternates between original corners (handles below
/// `vert_cutoff`) and edge points. Quad `k` is bounded by the half-edge
/// arriving at corner `k`, the one leaving it, a spoke into the centroid and a
/// spoke back out to the edge point the first half-edge started from.
/// Adjacent quads share their spokes as twins.
fn quadrangulate(
    mesh: &mut HalfEdgeMesh,
    f: FaceId,
    centroid: Point3<f64>,
    vert_cutoff: usize,
) -> Result<usize> {
    let cycle: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
    let len = cycle.len();
    let is_corner = |v: VertexId| v.index() < vert_cutoff;

    let start = cycle
        .iter()
        .position(|&he| is_corner(mesh.dest(he)))
        .ok_or(MeshError::BrokenCycle { face: f })?;
    let ring: Vec<HalfEdgeId> = (0..len).map(|i| cycle[(start + i) % len]).collect();
    let alternates = ring
        .iter()
        .enumerate()
        .all(|(i, &he)| is_corner(mesh.dest(he)) == (i % 2 == 0));
    if len < 6 || len % 2 != 0 || !alternates {
        return Err(MeshError::BrokenCycle { face: f });
    }

    let sides = len / 2;
    let rims: Vec<VertexId> = (0..sides)
        .map(|k| mesh.dest(ring[(2 * k + len - 1) % len]))
        .collect();
    let parent_color: Color = mesh.color(f);
    let jitter = ColorJitter::QUADRANGULATE;

    let hub = mesh.new_vertex(centroid);
    let mut inward = Vec::with_capacity(sides);
    let mut outward = Vec::with_capacity(sides);

    for k in 0..sides {
        let a = ring[2 * k];
        let b = ring[2 * k + 1];
        let quad = if k == 0 { f } else { mesh.new_face(parent_color) };
        let spoke_in = mesh.new_halfedge();
        let spoke_out = mesh.new_halfedge();

        {
            let he = mesh.halfedge_mut(spoke_in);
            he.vertex = hub;
            he.next = spoke_out;
            he.face = quad;
        }
        {
            let he = mesh.halfedge_mut(spoke_out);
            he.vertex = rims[k];
            he.next = a;
            he.face = quad;
        }
        mesh.halfedge_mut(a).face = quad;
        mesh.halfedge_mut(b).face = quad;
        mesh.halfedge_mut(b).next = spoke_in;
        mesh.face_mut(quad).halfedge = a;

        let color = jitter.derive(parent_color, quad, mesh.num_vertices(), mesh.num_halfedges());
        mesh.face_mut(quad).color = color;

        inward.push(spoke_in);
        outward.push(spoke_out);
    }

    for k in 0..sides {
        let prev_in = inward[(k + sides - 1) % sides];
        mesh.halfedge_mut(outward[k]).sym = prev_in;
        mesh.halfedge_mut(prev_in).sym = outward[k];
    }
    mesh.vertex_mut(hub).halfedge = outward[0];

    trace!("quadrangulated {:?} into {} quads around {:?}", f, sides, hub);
    Ok(sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_cube, build_from_polygons, build_regular_polygon};

    const EPS: f64 = 1e-12;

    fn single_quad() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    fn euler_characteristic(mesh: &HalfEdgeMesh) -> i64 {
        mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64
    }

    #[test]
    fn test_single_quad_counts() {
        let mut mesh = single_quad();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();

        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_quad_mesh());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_single_quad_positions() {
        let mut mesh = single_quad();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();

        // Border edges get plain midpoints, the centroid lands last.
        assert!((mesh.position(VertexId::new(8)) - Point3::new(0.5, 0.5, 0.0)).norm() < EPS);
        for i in 4..8 {
            let p = mesh.position(VertexId::new(i));
            let on_border = (p.x - 0.5).abs() < EPS || (p.y - 0.5).abs() < EPS;
            assert!(on_border, "edge point {:?} is not a border midpoint", p);
        }
        // Corner follows v/2 + (m1 + m2)/4.
        assert!((mesh.position(VertexId::new(0)) - Point3::new(0.125, 0.125, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_single_quad_without_boundary_rule() {
        let mut mesh = single_quad();
        let options = SubdivideOptions::new(1).with_preserve_boundary(false);
        catmull_clark_pass(&mut mesh, &options).unwrap();

        // n = 2: nothing of v survives, (m1 + m2)/4 + c/4.
        assert!((mesh.position(VertexId::new(0)) - Point3::new(0.25, 0.25, 0.0)).norm() < EPS);
    }

    #[test]
    fn test_cube_counts() {
        let mut mesh = build_cube();
        let (v, e, f) = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());

        catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(1)).unwrap();

        assert_eq!(mesh.num_vertices(), v + e + f);
        assert_eq!(mesh.num_faces(), 24);
        assert_eq!(mesh.num_edges(), 48);
        assert!(mesh.is_quad_mesh());
        assert!(mesh.is_valid());
        assert_eq!(euler_characteristic(&mesh), 2);
    }

    #[test]
    fn test_cube_edge_point_uses_four_terms() {
        let mut mesh = build_cube();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();

        // Edge 0-1 borders the back and bottom faces.
        let expected = Point3::new(0.0, -0.375, -0.375);
        let found = (8..20)
            .map(VertexId::new)
            .any(|v| (mesh.position(v) - expected).norm() < EPS);
        assert!(found);
    }

    #[test]
    fn test_cube_corner_smoothing() {
        let mut mesh = build_cube();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();

        // (1/3) v + sum_mid/9 + sum_centroid/9 with frozen edge points.
        let c = -11.0 / 36.0;
        assert!((mesh.position(VertexId::new(0)) - Point3::new(c, c, c)).norm() < 1e-9);
    }

    #[test]
    fn test_ngon_becomes_n_quads() {
        for n in 3..9 {
            let mut mesh = build_regular_polygon(n, 1.0).unwrap();
            catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();
            assert_eq!(mesh.num_faces(), n);
            assert_eq!(mesh.num_vertices(), n + n + 1);
            assert!(mesh.is_quad_mesh());
            assert!(mesh.is_valid());
        }
    }

    #[test]
    fn test_multiple_iterations() {
        let mut mesh = build_cube();
        catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(2)).unwrap();

        assert_eq!(mesh.num_faces(), 96);
        assert_eq!(mesh.num_vertices(), 98);
        assert!(mesh.is_valid());
        assert_eq!(euler_characteristic(&mesh), 2);
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        let mut mesh = build_cube();
        catmull_clark_subdivide(&mut mesh, &SubdivideOptions::new(0)).unwrap();
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_vertices(), 8);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut seq = build_cube();
        let mut par = build_cube();
        let parallel = SubdivideOptions::new(2).with_parallel(true);
        catmull_clark_subdivide(&mut seq, &parallel.clone().sequential()).unwrap();
        catmull_clark_subdivide(&mut par, &parallel).unwrap();

        for v in seq.vertex_ids() {
            assert!((seq.position(v) - par.position(v)).norm() < EPS);
        }
        for f in seq.face_ids() {
            assert_eq!(seq.color(f), par.color(f));
        }
    }

    #[test]
    fn test_new_vertices_are_unbound() {
        let mut mesh = build_cube();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();
        assert_eq!(mesh.num_bound_vertices(), 0);
    }

    #[test]
    fn test_spokes_are_twinned() {
        let mut mesh = single_quad();
        catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).unwrap();

        let hub = VertexId::new(8);
        assert_eq!(mesh.valence(hub), 4);
        assert!(!mesh.is_boundary_vertex(hub));
        for he in mesh.vertex_halfedges(hub) {
            assert_eq!(mesh.sym(mesh.sym(he)), he);
            assert_eq!(mesh.dest(mesh.sym(he)), hub);
        }
    }

    #[test]
    fn test_progress_reports_every_phase() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut mesh = build_cube();
        catmull_clark_subdivide_with_progress(&mut mesh, &SubdivideOptions::new(2), &progress)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2 * PHASES + 1);
    }

    #[test]
    fn test_broken_twin_is_rejected_untouched() {
        let mut mesh = build_cube();
        let e = HalfEdgeId::new(5);
        mesh.halfedge_mut(e).sym = HalfEdgeId::invalid();

        let result = catmull_clark_pass(&mut mesh, &SubdivideOptions::default());

        assert_eq!(result, Err(MeshError::BrokenTwin { halfedge: e }));
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 6);
    }

    #[test]
    fn test_broken_cycle_is_rejected() {
        let mut mesh = single_quad();
        let start = mesh.face(FaceId::new(0)).halfedge;
        let a = mesh.next(start);
        mesh.halfedge_mut(a).next = a;

        assert!(catmull_clark_pass(&mut mesh, &SubdivideOptions::default()).is_err());
        assert_eq!(mesh.num_vertices(), 4);
    }
}
