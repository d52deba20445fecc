// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::{Polygon2, SurfaceMesh};
use crate::kernel::BooleanOp;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    fn rule() {
        println!("{}", "━".repeat(60).bright_black());
    }

    fn field(name: &str, value: ColoredString) {
        println!("  {} {}", format!("{}:", name).bright_black(), value);
    }

    /// Counts, closedness, volume and bounds of a mesh
    pub fn report_mesh_info(file: &str, mesh: &SurfaceMesh) {
        println!("\n{}", "━".repeat(60).bright_black());
        println!("{} {}", "Mesh:".bold(), file.cyan());
        Self::rule();

        Self::field("Vertices", mesh.number_of_vertices().to_string().cyan());
        Self::field("Faces", mesh.number_of_faces().to_string().cyan());
        Self::field("Half-edges", mesh.number_of_halfedges().to_string().cyan());

        let border = mesh.border_edge_count();
        let closed = if mesh.is_closed() {
            "yes".green()
        } else {
            format!("no ({} border edges)", border).yellow()
        };
        Self::field("Closed", closed);
        Self::field("Volume", format!("{:.6}", mesh.volume()).cyan());

        let bbox = mesh.bounding_box();
        if !bbox.is_empty() {
            Self::field(
                "Bounds",
                format!(
                    "[{:.4}, {:.4}, {:.4}] .. [{:.4}, {:.4}, {:.4}]",
                    bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
                )
                .normal(),
            );
        }
        Self::rule();
    }

    /// Result summary of a boolean operation
    pub fn report_boolean(op: BooleanOp, result: &SurfaceMesh, output: &str, duration: Duration) {
        println!(
            "{} {} {} {} faces in {}",
            "✅".green(),
            op.to_string().bold(),
            "->".bright_black(),
            result.number_of_faces().to_string().cyan(),
            Self::format_duration(duration).yellow()
        );
        Self::field("Output", output.cyan());
    }

    /// Piece list of a convex partition
    pub fn report_partition(pieces: &[Polygon2], reversed: bool, verbose: bool) {
        if reversed {
            Self::report_warning("input was clockwise and has been reversed");
        }
        println!(
            "{} {} convex pieces",
            "✅".green(),
            pieces.len().to_string().cyan().bold()
        );
        if verbose {
            for (i, piece) in pieces.iter().enumerate() {
                println!(
                    "  {} {} vertices, area {:.4}",
                    format!("#{}", i).bright_black(),
                    piece.size(),
                    piece.area()
                );
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
