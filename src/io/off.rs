// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OFF (Object File Format) reader and writer

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::SurfaceMesh;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Non-empty lines with comments stripped, tagged with 1-based line numbers
fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = GeometryResult<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Ok(line) => {
                let content = line.split('#').next().unwrap_or("").trim().to_string();
                (!content.is_empty()).then_some(Ok((i + 1, content)))
            }
            Err(err) => Some(Err(err.into())),
        })
}

fn parse_error(line: usize, message: impl Into<String>) -> GeometryError {
    GeometryError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_numbers<T: std::str::FromStr>(line: usize, text: &str) -> GeometryResult<Vec<T>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| parse_error(line, format!("invalid number '{}'", token)))
        })
        .collect()
}

/// Read an OFF stream into a mesh.
///
/// Triangles and quads map onto [`SurfaceMesh::add_face`] and
/// [`SurfaceMesh::add_quad`]; larger polygons are fan-triangulated.
pub fn read_off<R: BufRead>(reader: R) -> GeometryResult<SurfaceMesh> {
    let mut lines = content_lines(reader);

    let (line, header) = lines
        .next()
        .ok_or_else(|| parse_error(1, "empty input"))??;
    let counts_inline = header
        .strip_prefix("OFF")
        .ok_or_else(|| parse_error(line, format!("expected OFF header, found '{}'", header)))?
        .trim()
        .to_string();

    let (line, counts) = if counts_inline.is_empty() {
        lines
            .next()
            .ok_or_else(|| parse_error(line, "missing element counts"))??
    } else {
        (line, counts_inline)
    };
    let counts: Vec<usize> = parse_numbers(line, &counts)?;
    let (vertex_count, face_count) = match counts[..] {
        [v, f] | [v, f, _] => (v, f),
        _ => return Err(parse_error(line, "expected 'vertices faces [edges]'")),
    };

    let mut mesh = SurfaceMesh::new();
    for _ in 0..vertex_count {
        let (line, text) = lines
            .next()
            .ok_or_else(|| parse_error(line, "unexpected end of vertex list"))??;
        let coords: Vec<f64> = parse_numbers(line, &text)?;
        if coords.len() < 3 {
            return Err(parse_error(line, "vertex needs 3 coordinates"));
        }
        mesh.add_vertex(coords[0], coords[1], coords[2]);
    }

    for _ in 0..face_count {
        let (line, text) = lines
            .next()
            .ok_or_else(|| parse_error(line, "unexpected end of face list"))??;
        let values: Vec<usize> = parse_numbers(line, &text)?;
        let Some((&k, rest)) = values.split_first() else {
            return Err(parse_error(line, "empty face"));
        };
        if rest.len() < k {
            return Err(parse_error(line, format!("face declares {} indices, found {}", k, rest.len())));
        }
        let indices = &rest[..k];
        let inserted = match *indices {
            [i, j, kk] => mesh.add_face(i, j, kk).map(drop),
            [i, j, kk, l] => mesh.add_quad(i, j, kk, l).map(drop),
            _ if k > 4 => indices[1..]
                .windows(2)
                .try_for_each(|w| mesh.add_face(indices[0], w[0], w[1]).map(drop)),
            _ => Err(GeometryError::DegenerateFace {
                vertices: indices.to_vec(),
            }),
        };
        inserted.map_err(|err| parse_error(line, err.to_string()))?;
    }

    debug!(
        vertices = mesh.number_of_vertices(),
        faces = mesh.number_of_faces(),
        "read OFF mesh"
    );
    Ok(mesh)
}

/// Write `mesh` as OFF
pub fn write_off<W: Write>(mesh: &SurfaceMesh, mut writer: W) -> GeometryResult<()> {
    write!(writer, "{}", mesh)?;
    writer.flush()?;
    Ok(())
}

pub fn import_off(path: impl AsRef<Path>) -> GeometryResult<SurfaceMesh> {
    let file = File::open(path.as_ref())?;
    read_off(BufReader::new(file))
}

pub fn export_off(mesh: &SurfaceMesh, path: impl AsRef<Path>) -> GeometryResult<()> {
    let file = File::create(path.as_ref())?;
    write_off(mesh, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRA: &str = "OFF
# tetrahedron
4 4 6
0 0 0
1 0 0
0 1 0
0 0 1
3 0 2 1
3 0 1 3
3 1 2 3
3 0 3 2
";

    #[test]
    fn test_read_tetrahedron() {
        let mesh = read_off(TETRA.as_bytes()).unwrap();
        assert_eq!(mesh.number_of_vertices(), 4);
        assert_eq!(mesh.number_of_faces(), 4);
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_inline_counts_and_polygons() {
        let input = "OFF 5 1 0\n0 0 0\n1 0 0\n2 1 0\n1 2 0\n0 1 0\n5 0 1 2 3 4\n";
        let mesh = read_off(input.as_bytes()).unwrap();
        assert_eq!(mesh.number_of_faces(), 3);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = read_off("PLY\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GeometryError::Parse { line: 1, .. }));

        let err = read_off("OFF\n1 0 0\n0 zero 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GeometryError::Parse { line: 3, .. }));

        let err = read_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GeometryError::Parse { line: 6, .. }));
    }

    #[test]
    fn test_write_matches_display() {
        let mesh = read_off(TETRA.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write_off(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("OFF\n4 4 0\n"));
        assert_eq!(text, mesh.to_string());
    }
}
