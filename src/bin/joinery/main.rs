//! Joinery CLI - connector generation command-line tool.
//!
//! Usage: joinery <COMMAND> [OPTIONS] <INPUT> [OUTPUT_DIR]
//!
//! Run `joinery --help` for available commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use joinery::adjacency::build_adjacency;
use joinery::connector::{
    build_connectors_with_progress, extract_pairs, sort_pairs, ConnectorOptions, HoleOptions,
    Progress,
};
use joinery::io;
use joinery::mesh::PolyMesh;

#[derive(Parser)]
#[command(name = "joinery")]
#[command(author, version, about = "Per-vertex connector generation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Show the per-vertex fan summary
        #[arg(long)]
        fans: bool,
    },

    /// Generate a connector fragment for every vertex
    Generate {
        /// Input mesh file
        input: PathBuf,

        /// Directory for the hat_<index>.obj output files
        output_dir: PathBuf,

        /// Distance from the middle vertex to the rim vertices
        #[arg(short, long, default_value = "0.5")]
        rim_distance: f64,

        /// Extrusion thickness beyond the farthest rim vertex
        #[arg(short, long, default_value = "0.3")]
        thickness: f64,

        /// Bolt hole radius
        #[arg(long, default_value = "0.06")]
        hole_radius: f64,

        /// Nut recess radius
        #[arg(long, default_value = "0.1")]
        nut_radius: f64,

        /// Socket inset distance from the rim edge toward the middle
        #[arg(long, default_value = "0.25")]
        bolt_dist: f64,

        /// Socket offset along the rim edge
        #[arg(long, default_value = "0.0")]
        location: f64,

        /// Depth of the nut recess
        #[arg(long, default_value = "0.08")]
        bolt_thickness: f64,

        /// Number of vertices in the bolt hole ring (even, at least 4)
        #[arg(long, default_value = "12")]
        circle_vertices: usize,

        /// Abort on the first vertex that fails instead of skipping it
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, fans } => {
            cmd_info(&input, fans)?;
        }

        Commands::Generate {
            input,
            output_dir,
            rim_distance,
            thickness,
            hole_radius,
            nut_radius,
            bolt_dist,
            location,
            bolt_thickness,
            circle_vertices,
            strict,
        } => {
            let options = ConnectorOptions {
                rim_distance,
                thickness,
                holes: HoleOptions {
                    hole_radius,
                    nut_radius,
                    bolt_dist,
                    location,
                    bolt_thickness,
                    circle_vertices,
                },
            };
            cmd_generate(&input, &output_dir, &options, strict)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        // Use rounding instead of truncation for smoother progress
        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Ensure monotonic progress: only increase, never decrease
        let (percent, increased) = loop {
            let old_max = max_percent.load(Ordering::Relaxed);
            let new_max = old_max.max(raw_percent);
            if new_max == old_max {
                break (old_max, false);
            }
            match max_percent.compare_exchange_weak(
                old_max,
                new_max,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break (new_max, true),
                Err(_) => continue,
            }
        };

        // Only update display if percent increased (reduce flickering)
        if !increased && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let empty = bar_width - filled;

        let bar: String = std::iter::repeat('=').take(filled).collect();
        let space: String = std::iter::repeat(' ').take(empty).collect();

        // Use carriage return to overwrite the line
        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &PathBuf, show_fans: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: PolyMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());

    // Bounding box
    let mut vertices = mesh.vertex_ids();
    if let Some(first) = vertices.next() {
        let mut min = *mesh.position(first);
        let mut max = min;
        for v in vertices {
            let p = mesh.position(v);
            min = min.inf(p);
            max = max.sup(p);
        }
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    if show_fans {
        println!("\nFans:");
        let adj = build_adjacency(&mesh)?;
        let mut closed = 0usize;
        let mut open = 0usize;
        let mut failed = 0usize;

        for vertex in mesh.vertex_ids() {
            let fan = extract_pairs(&adj, vertex).and_then(|pairs| sort_pairs(vertex, pairs));
            match fan {
                Ok(fan) => {
                    if fan.closed {
                        closed += 1;
                    } else {
                        open += 1;
                    }
                    println!(
                        "  {:?}: {} pairs, {}",
                        vertex,
                        fan.pairs.len(),
                        if fan.closed { "closed" } else { "open" }
                    );
                }
                Err(e) => {
                    failed += 1;
                    println!("  {:?}: {}", vertex, e);
                }
            }
        }

        println!("Summary: {} closed, {} open, {} failed", closed, open, failed);
    }

    Ok(())
}

fn cmd_generate(
    input: &PathBuf,
    output_dir: &PathBuf,
    options: &ConnectorOptions,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: PolyMesh = io::load(input)?;

    println!(
        "Loaded: {} vertices, {} edges, {} faces",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces()
    );

    std::fs::create_dir_all(output_dir)?;

    let progress = create_progress();

    let start = Instant::now();
    let results = build_connectors_with_progress(&mesh, options, &progress)?;
    let elapsed = start.elapsed();

    let mut written = 0usize;
    let mut skipped = 0usize;
    for (vertex, result) in results {
        match result {
            Ok(connector) => {
                let path = output_dir.join(format!("hat_{}.obj", vertex.index()));
                io::save(connector.mesh(), &path)?;
                written += 1;
            }
            Err(e) => {
                if strict {
                    return Err(format!("{:?}: {}", vertex, e).into());
                }
                eprintln!("Skipping {:?}: {}", vertex, e);
                skipped += 1;
            }
        }
    }

    println!(
        "Saved: {} connector(s) to {} ({:.2?}, {} skipped)",
        written,
        output_dir.display(),
        elapsed,
        skipped
    );

    Ok(())
}
