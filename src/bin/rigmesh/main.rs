//! Rigmesh CLI - inspect, refine and bind built-in meshes.
//!
//! Usage: rigmesh <COMMAND> [OPTIONS]
//!
//! Run `rigmesh --help` for available commands. Set `RUST_LOG=debug` for
//! per-pass details.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use rigmesh::algo::subdivide::{catmull_clark_subdivide_with_progress, SubdivideOptions};
use rigmesh::algo::Progress;
use rigmesh::edit::triangulate_face;
use rigmesh::mesh::{build_cube, build_from_polygons, build_regular_polygon, HalfEdgeMesh};
use rigmesh::skeleton::{Skeleton, SkeletonDescription};
use rigmesh::skin::{check_bindings, SkinBinder};

#[derive(Parser)]
#[command(name = "rigmesh")]
#[command(author, version, about = "Half-edge mesh and skinning CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh and skeleton information
    Info {
        /// Built-in mesh to inspect
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Skeleton description (JSON)
        #[arg(long)]
        skeleton: Option<PathBuf>,
    },

    /// Subdivide a mesh
    Subdivide {
        /// Built-in mesh to subdivide
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Apply the interior rule to border vertices too
        #[arg(long)]
        move_boundary: bool,

        /// Compute positions on the thread pool
        #[arg(long)]
        parallel: bool,
    },

    /// Fan-triangulate every face of a mesh
    Triangulate {
        /// Built-in mesh to triangulate
        #[arg(short, long, value_enum, default_value = "pentagon")]
        shape: Shape,
    },

    /// Bind a mesh to a skeleton and report the weights
    Bind {
        /// Built-in mesh to bind
        #[arg(short, long, value_enum, default_value = "cube")]
        shape: Shape,

        /// Skeleton description (JSON)
        skeleton: PathBuf,

        /// Subdivision passes to run before binding
        #[arg(short, long, default_value = "0")]
        iterations: usize,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Unit cube of six quads
    Cube,
    /// Single unit quad
    Quad,
    /// Single regular pentagon
    Pentagon,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape, skeleton } => {
            cmd_info(shape, skeleton.as_deref())?;
        }

        Commands::Subdivide {
            shape,
            iterations,
            move_boundary,
            parallel,
        } => {
            cmd_subdivide(shape, iterations, move_boundary, parallel)?;
        }

        Commands::Triangulate { shape } => {
            cmd_triangulate(shape)?;
        }

        Commands::Bind {
            shape,
            skeleton,
            iterations,
        } => {
            cmd_bind(shape, &skeleton, iterations)?;
        }
    }

    Ok(())
}

fn build_shape(shape: Shape) -> Result<HalfEdgeMesh, Box<dyn std::error::Error>> {
    let mesh = match shape {
        Shape::Cube => build_cube(),
        Shape::Quad => {
            let vertices = [
                nalgebra::Point3::new(0.0, 0.0, 0.0),
                nalgebra::Point3::new(1.0, 0.0, 0.0),
                nalgebra::Point3::new(1.0, 1.0, 0.0),
                nalgebra::Point3::new(0.0, 1.0, 0.0),
            ];
            build_from_polygons(&vertices, &[[0, 1, 2, 3]])?
        }
        Shape::Pentagon => build_regular_polygon(5, 1.0)?,
    };
    Ok(mesh)
}

fn load_skeleton(path: &Path) -> Result<Skeleton, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let description = SkeletonDescription::from_json(&text)?;
    let skeleton = Skeleton::from_description(&description)?;
    info!("loaded {} joints from {}", skeleton.num_joints(), path.display());
    Ok(skeleton)
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only redraw when the bar moves forward
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<32}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn print_mesh_summary(mesh: &HalfEdgeMesh) {
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
}

fn cmd_info(shape: Shape, skeleton: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = build_shape(shape)?;
    mesh.check_topology()?;

    print_mesh_summary(&mesh);

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else if mesh.is_quad_mesh() {
        println!("Mesh type: Quad mesh");
    } else {
        println!("Mesh type: Mixed polygon mesh");
    }

    let boundary = mesh.vertex_ids().filter(|&v| mesh.is_boundary_vertex(v)).count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary);
    }

    if let Some(path) = skeleton {
        let skeleton = load_skeleton(path)?;
        println!("\nSkeleton: {} joints", skeleton.num_joints());
        for id in skeleton.joints_depth_first() {
            let joint = skeleton.joint(id)?;
            let depth = std::iter::successors(joint.parent, |&p| {
                skeleton.get(p).and_then(|j| j.parent)
            })
            .count();
            let p = skeleton.world_position(id)?;
            println!(
                "{}{} at ({:.3}, {:.3}, {:.3})",
                "  ".repeat(depth + 1),
                joint.name,
                p.x,
                p.y,
                p.z
            );
        }
    }

    Ok(())
}

fn cmd_subdivide(
    shape: Shape,
    iterations: usize,
    move_boundary: bool,
    parallel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_shape(shape)?;

    println!("Input: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let options = SubdivideOptions::new(iterations)
        .with_preserve_boundary(!move_boundary)
        .with_parallel(parallel);
    let mode = if parallel { "parallel" } else { "sequential" };
    let progress = create_progress();

    println!("Applying Catmull-Clark subdivision ({} iterations, {})...", iterations, mode);
    let start = Instant::now();
    catmull_clark_subdivide_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} faces ({:.2?})",
        mesh.num_vertices(),
        mesh.num_faces(),
        elapsed
    );
    Ok(())
}

fn cmd_triangulate(shape: Shape) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_shape(shape)?;

    println!("Input: {} vertices, {} faces", mesh.num_vertices(), mesh.num_faces());

    let faces: Vec<_> = mesh.face_ids().collect();
    let mut created = 0;
    for f in faces {
        created += triangulate_face(&mut mesh, f)?.len();
    }

    println!(
        "Result: {} faces ({} new), triangle mesh: {}",
        mesh.num_faces(),
        created,
        mesh.is_triangle_mesh()
    );
    Ok(())
}

fn cmd_bind(
    shape: Shape,
    skeleton: &Path,
    iterations: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = build_shape(shape)?;
    let mut skeleton = load_skeleton(skeleton)?;

    if iterations > 0 {
        let options = SubdivideOptions::new(iterations);
        catmull_clark_subdivide_with_progress(&mut mesh, &options, &create_progress())?;
    }

    skeleton.bind_all();
    let bound = SkinBinder::nearest().bind_all(&mut mesh, &skeleton)?;
    check_bindings(&mesh, &skeleton)?;

    println!("Bound {} vertices to {} joints", bound, skeleton.num_joints());
    let slots = skeleton.iter().map(|(id, _)| id.index() + 1).max().unwrap_or(0);
    let mut per_joint = vec![0usize; slots];
    for (_, vertex) in mesh.vertices() {
        if let Some(binding) = vertex.skin {
            per_joint[binding.joints[0].index()] += 1;
        }
    }
    for (id, joint) in skeleton.iter() {
        println!("  {}: primary for {} vertices", joint.name, per_joint[id.index()]);
    }
    Ok(())
}
