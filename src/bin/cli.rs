// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! geokernel CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use geokernel::cli::Reporter;
use geokernel::{io, BooleanOp, GeometryKernel, KernelConfig, NativeKernel, Orientation};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "geokernel")]
#[command(about = "Surface mesh booleans and optimal convex partitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kernel configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print counts, closedness, volume and bounds of a mesh
    Info {
        /// Input mesh (.off or .stl)
        input: PathBuf,
    },

    /// Combine two meshes
    Boolean {
        #[arg(value_enum)]
        op: OpArg,

        /// First operand (.off or .stl)
        a: PathBuf,

        /// Second operand (.off or .stl)
        b: PathBuf,

        /// Output mesh (.off or .stl)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Split a polygon into the fewest convex pieces
    Partition {
        /// Polygon JSON: an array of [x, y] pairs
        input: PathBuf,

        /// Write the pieces as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum OpArg {
    Union,
    Intersect,
    Subtract,
}

impl From<OpArg> for BooleanOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Union => BooleanOp::Union,
            OpArg::Intersect => BooleanOp::Intersection,
            OpArg::Subtract => BooleanOp::Difference,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => KernelConfig::from_file(path)?,
        None => KernelConfig::load()?,
    };
    let kernel = NativeKernel::new(config);

    match &cli.command {
        Commands::Info { input } => info_command(input, cli.verbose)?,
        Commands::Boolean { op, a, b, output } => {
            boolean_command(&kernel, (*op).into(), a, b, output, cli.verbose)?
        }
        Commands::Partition { input, output } => {
            partition_command(&kernel, input, output.as_deref(), cli.verbose)?
        }
        Commands::Version => {
            println!("geokernel v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn require_file(path: &Path) {
    if !path.exists() {
        Reporter::report_error(&format!("Input file not found: {}", path.display()));
        std::process::exit(1);
    }
}

fn info_command(input: &Path, verbose: bool) -> Result<()> {
    require_file(input);
    if verbose {
        Reporter::report_info(&format!("Loading {}", input.display()));
    }

    let mesh = io::import_mesh(input)
        .with_context(|| format!("Failed to load mesh: {}", input.display()))?;
    Reporter::report_mesh_info(&input.display().to_string(), &mesh);
    Ok(())
}

fn boolean_command(
    kernel: &NativeKernel,
    op: BooleanOp,
    a: &Path,
    b: &Path,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    require_file(a);
    require_file(b);

    let mesh_a = io::import_mesh(a).with_context(|| format!("Failed to load mesh: {}", a.display()))?;
    let mesh_b = io::import_mesh(b).with_context(|| format!("Failed to load mesh: {}", b.display()))?;
    if verbose {
        Reporter::report_info(&format!(
            "{} ({} faces) {} {} ({} faces) using {}",
            a.display(),
            mesh_a.number_of_faces(),
            op,
            b.display(),
            mesh_b.number_of_faces(),
            kernel.name()
        ));
    }

    let start = std::time::Instant::now();
    let result = kernel.boolean(&mesh_a, &mesh_b, op)?;
    let duration = start.elapsed();

    io::export_mesh(&result, output)
        .with_context(|| format!("Failed to write mesh: {}", output.display()))?;
    Reporter::report_boolean(op, &result, &output.display().to_string(), duration);
    Ok(())
}

fn partition_command(
    kernel: &NativeKernel,
    input: &Path,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    require_file(input);

    let mut polygon = io::read_polygon_json(input)
        .with_context(|| format!("Failed to read polygon: {}", input.display()))?;
    if verbose {
        Reporter::report_info(&format!(
            "{} vertices, simple: {}, convex: {}",
            polygon.size(),
            polygon.is_simple_with(kernel),
            polygon.is_convex_with(kernel)
        ));
    }

    let reversed = polygon.orientation_with(kernel) == Orientation::Clockwise;
    let pieces = polygon.optimal_convex_partition_with(kernel)?;
    Reporter::report_partition(&pieces, reversed, verbose);

    match output {
        Some(path) => {
            io::write_polygons_json(&pieces, path)
                .with_context(|| format!("Failed to write pieces: {}", path.display()))?;
            if verbose {
                println!("  {} {}", "Output:".bright_black(), path.display().to_string().cyan());
            }
        }
        None => println!("{}", io::polygons_to_json(&pieces)?),
    }
    Ok(())
}
