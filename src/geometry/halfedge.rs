// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Incremental half-edge connectivity
//! Each face is a closed loop of half-edges; opposite half-edges are linked
//! as soon as both directions exist.

use crate::error::{GeometryError, GeometryResult};
use ahash::AHashMap;

/// Half-edge in a face loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Next half-edge in the same face
    pub next: usize,
    /// Previous half-edge in the same face
    pub prev: usize,
    /// Opposite half-edge (reverse direction, adjacent face)
    pub twin: Option<usize>,
    /// Vertex this half-edge points to
    pub vertex: usize,
    /// Face this half-edge belongs to
    pub face: usize,
}

/// Face loops over an externally owned vertex list
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeConnectivity {
    half_edges: Vec<HalfEdge>,
    /// First half-edge of each face, leaving the face's first vertex
    face_start: Vec<usize>,
    /// Directed edge (from, to) -> half-edge index
    directed: AHashMap<(usize, usize), usize>,
}

impl HalfEdgeConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `loop_vertices` could be inserted as a face over
    /// `vertex_count` vertices without touching the structure.
    pub fn validate_face(&self, loop_vertices: &[usize], vertex_count: usize) -> GeometryResult<()> {
        if let Some(&index) = loop_vertices.iter().find(|&&v| v >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange {
                index,
                len: vertex_count,
            });
        }

        let n = loop_vertices.len();
        let repeated = (0..n).any(|i| loop_vertices[i + 1..].contains(&loop_vertices[i]));
        if n < 3 || repeated {
            return Err(GeometryError::DegenerateFace {
                vertices: loop_vertices.to_vec(),
            });
        }

        for (from, to) in loop_edges(loop_vertices) {
            if self.directed.contains_key(&(from, to)) {
                return Err(GeometryError::NonManifoldFace {
                    vertices: loop_vertices.to_vec(),
                    from,
                    to,
                });
            }
        }
        Ok(())
    }

    /// Append a face loop. Returns the new face index.
    pub fn add_face(&mut self, loop_vertices: &[usize], vertex_count: usize) -> GeometryResult<usize> {
        self.validate_face(loop_vertices, vertex_count)?;
        Ok(self.insert_unchecked(loop_vertices))
    }

    /// Insert a loop already accepted by [`Self::validate_face`]
    pub(crate) fn insert_unchecked(&mut self, loop_vertices: &[usize]) -> usize {
        let face = self.face_start.len();
        let first = self.half_edges.len();
        let n = loop_vertices.len();

        for (k, (from, to)) in loop_edges(loop_vertices).enumerate() {
            let he = first + k;
            let twin = self.directed.get(&(to, from)).copied();
            self.half_edges.push(HalfEdge {
                next: first + (k + 1) % n,
                prev: first + (k + n - 1) % n,
                twin,
                vertex: to,
                face,
            });
            if let Some(t) = twin {
                self.half_edges[t].twin = Some(he);
            }
            self.directed.insert((from, to), he);
        }

        self.face_start.push(first);
        face
    }

    pub fn face_count(&self) -> usize {
        self.face_start.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    /// First half-edge of `face`
    pub fn face_half_edge(&self, face: usize) -> Option<usize> {
        self.face_start.get(face).copied()
    }

    /// Half-edges of `face` in loop order
    pub fn face_loop(&self, face: usize) -> FaceLoop<'_> {
        let start = self.face_half_edge(face);
        FaceLoop {
            half_edges: &self.half_edges,
            start,
            current: start,
        }
    }

    /// Vertex a half-edge leaves from
    pub fn source(&self, h: usize) -> Option<usize> {
        let he = self.half_edges.get(h)?;
        Some(self.half_edges[he.prev].vertex)
    }

    pub fn target(&self, h: usize) -> Option<usize> {
        self.half_edges.get(h).map(|he| he.vertex)
    }

    pub fn opposite(&self, h: usize) -> Option<usize> {
        self.half_edges.get(h).and_then(|he| he.twin)
    }

    /// Half-edges without an opposite
    pub fn border_count(&self) -> usize {
        self.half_edges.iter().filter(|he| he.twin.is_none()).count()
    }

    pub fn clear(&mut self) {
        self.half_edges.clear();
        self.face_start.clear();
        self.directed.clear();
    }
}

/// Iterator over the half-edges of one face
pub struct FaceLoop<'a> {
    half_edges: &'a [HalfEdge],
    start: Option<usize>,
    current: Option<usize>,
}

impl Iterator for FaceLoop<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let h = self.current?;
        let next = self.half_edges[h].next;
        self.current = if Some(next) == self.start { None } else { Some(next) };
        Some(h)
    }
}

fn loop_edges(vertices: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let n = vertices.len();
    (0..n).map(move |k| (vertices[k], vertices[(k + 1) % n]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twins_linked_across_faces() {
        let mut conn = HalfEdgeConnectivity::new();
        conn.add_face(&[0, 1, 2], 4).unwrap();
        assert_eq!(conn.border_count(), 3);

        conn.add_face(&[0, 2, 3], 4).unwrap();
        assert_eq!(conn.half_edge_count(), 6);
        assert_eq!(conn.border_count(), 4);

        // 1 -> 2 -> 0: edge (2, 0) is the third half-edge of face 0
        let shared = 2;
        assert_eq!(conn.source(shared), Some(2));
        assert_eq!(conn.target(shared), Some(0));
        let twin = conn.opposite(shared).unwrap();
        assert_eq!(conn.source(twin), Some(0));
        assert_eq!(conn.target(twin), Some(2));
        assert_eq!(conn.opposite(twin), Some(shared));
    }

    #[test]
    fn test_face_loop_starts_at_first_vertex() {
        let mut conn = HalfEdgeConnectivity::new();
        conn.add_face(&[3, 1, 2], 4).unwrap();
        let sources: Vec<_> = conn
            .face_loop(0)
            .map(|h| conn.source(h).unwrap())
            .collect();
        assert_eq!(sources, vec![3, 1, 2]);
    }

    #[test]
    fn test_rejections_leave_structure_untouched() {
        let mut conn = HalfEdgeConnectivity::new();
        conn.add_face(&[0, 1, 2], 3).unwrap();

        assert!(matches!(
            conn.add_face(&[0, 1, 5], 3),
            Err(GeometryError::IndexOutOfRange { index: 5, len: 3 })
        ));
        assert!(matches!(
            conn.add_face(&[0, 0, 1], 3),
            Err(GeometryError::DegenerateFace { .. })
        ));
        assert!(matches!(
            conn.add_face(&[1, 2, 0], 3),
            Err(GeometryError::NonManifoldFace { from: 1, to: 2, .. })
        ));
        assert_eq!(conn.face_count(), 1);
        assert_eq!(conn.half_edge_count(), 3);
    }

    #[test]
    fn test_empty_face_loop() {
        let conn = HalfEdgeConnectivity::new();
        assert_eq!(conn.face_loop(0).count(), 0);
    }
}
