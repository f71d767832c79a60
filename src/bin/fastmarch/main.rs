//! fastmarch CLI - geodesic distances on triangle meshes.
//!
//! Usage: fastmarch <COMMAND> [OPTIONS] <INPUT>
//!
//! Run `fastmarch --help` for available commands. Set `RUST_LOG=debug` for
//! engine diagnostics.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::Point3;

use fastmarch::algo::geodesic::{
    geodesic_path, FastMarching, FastMarchingOptions, GeodesicMethod, MarchOutcome,
};
use fastmarch::algo::select::{select_by_points, SelectOptions, SelectionMethod};
use fastmarch::algo::Progress;
use fastmarch::io;
use fastmarch::mesh::{TriangleConnectivity, VertexId};

#[derive(Parser)]
#[command(name = "fastmarch")]
#[command(author, version, about = "Geodesic distance CLI", long_about = None)]
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
    },

    /// Compute a geodesic distance field from seed vertices
    Distance {
        /// Input mesh file
        input: PathBuf,

        /// Seed vertex ids
        #[arg(short, long = "seed", required = true, num_args = 1..)]
        seeds: Vec<usize>,

        /// Stop once the front reaches this distance
        #[arg(short = 'd', long)]
        max_distance: Option<f64>,

        /// Stop once one of these vertices is reached
        #[arg(long = "destination", num_args = 1..)]
        destinations: Vec<usize>,

        /// Vertices the front may not enter
        #[arg(long = "exclude", num_args = 1..)]
        exclude: Vec<usize>,

        /// Per-vertex propagation weights (one value per line, or vertex,value rows)
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Value written for vertices that were not reached
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        not_visited: f64,

        /// Finalized vertices between progress updates
        #[arg(long, default_value = "100")]
        resolution: usize,

        /// Name of the distance field
        #[arg(long, default_value = "GeodesicDistance")]
        field_name: String,

        /// Output file (.ply or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Select vertices near a set of points
    Select {
        /// Input mesh file
        input: PathBuf,

        /// Query points as X,Y,Z
        #[arg(short, long = "point", required = true, num_args = 1.., value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<Point3<f64>>,

        /// Selection radius
        #[arg(short, long, default_value = "5.0")]
        radius: f64,

        /// Distance measure
        #[arg(short, long, value_enum, default_value = "sphere")]
        method: SelectMethod,

        /// Output file for the selected faces (.ply or .stl)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find a surface path between two vertices
    Path {
        /// Input mesh file
        input: PathBuf,

        /// Start vertex
        begin: usize,

        /// End vertex
        end: usize,

        /// Path method
        #[arg(short, long, value_enum, default_value = "fast-marching")]
        method: PathMethod,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SelectMethod {
    /// Straight-line distance
    Sphere,
    /// Distance over the surface
    Geodesic,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PathMethod {
    /// Shortest path along edges
    Dijkstra,
    /// Descent over a fast-marching distance field
    FastMarching,
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
        Commands::Info { input } => {
            cmd_info(&input)?;
        }
        Commands::Distance {
            input,
            seeds,
            max_distance,
            destinations,
            exclude,
            weights,
            not_visited,
            resolution,
            field_name,
            output,
        } => {
            let mut options = FastMarchingOptions::default()
                .with_not_visited_value(not_visited)
                .with_field_name(field_name);
            if let Some(d) = max_distance {
                options = options.with_distance_stop(d);
            }
            if !destinations.is_empty() {
                options = options.with_destinations(destinations);
            }
            if !exclude.is_empty() {
                options = options.with_exclusion(exclude);
            }
            if let Some(path) = weights {
                options = options.with_weights(io::csv::load_values(path)?);
            }
            cmd_distance(&input, &seeds, options, resolution, output.as_deref())?;
        }
        Commands::Select {
            input,
            points,
            radius,
            method,
            output,
        } => {
            let method = match method {
                SelectMethod::Sphere => SelectionMethod::SphereRadius,
                SelectMethod::Geodesic => SelectionMethod::GeodesicDistance,
            };
            let options = SelectOptions::default().with_radius(radius).with_method(method);
            cmd_select(&input, &points, &options, output.as_deref())?;
        }
        Commands::Path {
            input,
            begin,
            end,
            method,
        } => {
            let method = match method {
                PathMethod::Dijkstra => GeodesicMethod::Dijkstra,
                PathMethod::FastMarching => GeodesicMethod::FastMarching,
            };
            cmd_path(&input, begin, end, method)?;
        }
    }

    Ok(())
}

fn parse_point(s: &str) -> Result<Point3<f64>, String> {
    let coords: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("'{}': {}", c, e)))
        .collect::<Result<_, _>>()?;

    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected X,Y,Z but got '{}'", s)),
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever increase, so the bar never bounces back
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

        if !increased && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let empty = bar_width - filled;
        let bar: String = std::iter::repeat('=').take(filled).collect();
        let space: String = std::iter::repeat(' ').take(empty).collect();

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Points: {}", mesh.num_points());
    println!("Polygons: {}", mesh.num_polys());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    let conn: TriangleConnectivity = match TriangleConnectivity::build(&mesh) {
        Ok(conn) => conn,
        Err(e) => {
            println!("Mesh type: not usable for fast marching ({})", e);
            return Ok(());
        }
    };

    println!("Mesh type: Triangle mesh");

    let total_area: f64 = conn.face_ids().map(|f| conn.face_area(f)).sum();
    println!("Surface area: {:.6}", total_area);
    println!("Average edge length: {:.6}", conn.average_edge_length());

    let boundary = conn
        .vertex_ids()
        .filter(|&v| conn.is_boundary_vertex(v))
        .count();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary vertices)", boundary);
    }

    Ok(())
}

fn cmd_distance(
    input: &Path,
    seeds: &[usize],
    options: FastMarchingOptions,
    resolution: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!("Loaded: {} points, {} polygons", mesh.num_points(), mesh.num_polys());

    let seeds: Vec<VertexId> = seeds.iter().map(|&s| VertexId::new(s)).collect();

    let mut engine: FastMarching = FastMarching::new();
    engine.set_iteration_event_resolution(resolution);
    engine.set_progress(create_progress());

    let warnings = engine.configure(&mesh, &seeds, options)?;
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }

    let start = Instant::now();
    let outcome = engine.compute()?;
    let elapsed = start.elapsed();
    eprintln!();

    match outcome {
        MarchOutcome::Completed => println!("Completed ({:.2?})", elapsed),
        MarchOutcome::Stopped(reason) => println!("Stopped: {:?} ({:.2?})", reason, elapsed),
        MarchOutcome::Cancelled => println!("Cancelled ({:.2?})", elapsed),
    }

    let field = engine.distance_field();
    let stats = field.statistics();
    println!("Visited: {} of {}", stats.visited, field.len());
    println!("Max distance: {:.6}", stats.max_distance);

    if let Some(output) = output {
        io::save_distance_field(&mesh, &field, output)?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}

fn cmd_select(
    input: &Path,
    points: &[Point3<f64>],
    options: &SelectOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!("Loaded: {} points, {} polygons", mesh.num_points(), mesh.num_polys());

    let selection = select_by_points(&mesh, points, options)?;
    println!("Selected vertices: {}", selection.num_selected());
    println!("Selected faces: {}", selection.faces().len());

    if let Some(output) = output {
        let part = selection.extract(&mesh);
        io::save(&part, output)?;
        println!("Saved: {}", output.display());
    }

    Ok(())
}

fn cmd_path(
    input: &Path,
    begin: usize,
    end: usize,
    method: GeodesicMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    let path = geodesic_path::<u32>(&mesh, VertexId::new(begin), VertexId::new(end), method)?;

    let ids: Vec<String> = path.vertices().iter().map(|v| v.index().to_string()).collect();
    println!("Vertices ({}): {}", path.len(), ids.join(" "));
    println!("Length: {:.6}", path.length());

    Ok(())
}
