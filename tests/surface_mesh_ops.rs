// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surface mesh construction, transforms and booleans

use approx::assert_relative_eq;
use geokernel::{
    BooleanOp, GeometryError, GeometryKernel, KernelConfig, NativeKernel, NumericArray, SurfaceMesh,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use rand::{Rng, SeedableRng};

/// Axis-aligned box built with the quad convenience
fn cuboid(min: [f64; 3], max: [f64; 3]) -> SurfaceMesh {
    let mut mesh = SurfaceMesh::new();
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..2 {
                mesh.add_vertex(
                    if i == 0 { min[0] } else { max[0] },
                    if j == 0 { min[1] } else { max[1] },
                    if k == 0 { min[2] } else { max[2] },
                );
            }
        }
    }
    for [a, b, c, d] in [
        [0, 2, 3, 1],
        [4, 5, 7, 6],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 4, 6, 2],
        [1, 3, 7, 5],
    ] {
        mesh.add_quad(a, b, c, d).unwrap();
    }
    mesh
}

fn unit_cube() -> SurfaceMesh {
    cuboid([0.0; 3], [1.0; 3])
}

#[test]
fn test_vertices_roundtrip_through_export() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut mesh = SurfaceMesh::new();
    let mut expected = Vec::new();
    for _ in 0..100 {
        let p = [
            rng.gen_range(-1e3..1e3),
            rng.gen_range(-1e3..1e3),
            rng.gen_range(-1e3..1e3),
        ];
        mesh.add_vertex(p[0], p[1], p[2]);
        expected.push(p);
    }

    let exported = mesh.to_vertices_and_polygons();
    assert_eq!(exported.vertices, expected);
    assert!(exported.polygons.is_empty());
    assert_eq!(exported.face_count, 0);
}

#[test]
fn test_face_counts_grow_by_one_or_two() {
    let mut mesh = SurfaceMesh::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (2.0, 0.5)] {
        mesh.add_vertex(x, y, 0.0);
    }

    mesh.add_face(1, 4, 2).unwrap();
    assert_eq!(mesh.number_of_faces(), 1);

    mesh.add_quad(0, 1, 2, 3).unwrap();
    assert_eq!(mesh.number_of_faces(), 3);

    let exported = mesh.to_vertices_and_polygons();
    assert_eq!(exported.polygons, vec![vec![1, 4, 2], vec![0, 1, 2], vec![0, 2, 3]]);
}

#[test]
fn test_rejected_faces() {
    let mut mesh = unit_cube();
    let faces = mesh.number_of_faces();

    assert!(matches!(
        mesh.add_face(0, 1, 8),
        Err(GeometryError::IndexOutOfRange { index: 8, len: 8 })
    ));
    assert!(matches!(
        mesh.add_face(0, 1, 1),
        Err(GeometryError::DegenerateFace { .. })
    ));
    assert!(matches!(
        mesh.add_face(0, 2, 3),
        Err(GeometryError::NonManifoldFace { .. })
    ));
    assert_eq!(mesh.number_of_faces(), faces);
}

#[test]
fn test_translate_roundtrip() {
    let original = unit_cube();
    let mut mesh = original.clone();

    mesh.translate(0.0, 0.0, 0.0);
    assert_eq!(mesh.points(), original.points());

    mesh.translate(1.25, -3.5, 1e4);
    mesh.translate(-1.25, 3.5, -1e4);
    for (p, q) in mesh.points().iter().zip(original.points()) {
        assert_relative_eq!(*p, *q, epsilon = 1e-9);
    }
}

#[test]
fn test_linear_transform_scales_volume() {
    let mut mesh = unit_cube();
    let m = Matrix3::new(2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.5);
    mesh.transform(&m);
    assert_relative_eq!(mesh.volume(), 3.0, epsilon = 1e-12);

    let kernel = NativeKernel::default();
    kernel.transform_mesh(&mut mesh, &Matrix4::new_translation(&Vector3::new(1.0, 1.0, 1.0)));
    assert_relative_eq!(mesh.bounding_box().min.x, 1.0);
}

#[test]
fn test_rotation_about_z() {
    let mut mesh = unit_cube();
    let quarter_turn = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    mesh.transform(&quarter_turn);

    // (1, 0, 0) -> (0, 1, 0) and (0, 1, 0) -> (-1, 0, 0)
    assert_eq!(mesh.point(1), Some(Point3::new(0.0, 1.0, 0.0)));
    assert_eq!(mesh.point(2), Some(Point3::new(-1.0, 0.0, 0.0)));
    assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-12);
    assert!(mesh.is_closed());
}

#[test]
fn test_halfedge_traversal() {
    let mesh = unit_cube();
    assert_eq!(mesh.number_of_halfedges(), 36);
    assert!(mesh.is_closed());

    for face in mesh.faces() {
        let loop_edges: Vec<usize> = mesh.halfedges_around_face(face).collect();
        assert_eq!(loop_edges.len(), 3);
        for &h in &loop_edges {
            let twin = mesh.opposite(h).unwrap();
            assert_eq!(mesh.source(twin), mesh.target(h));
            assert_eq!(mesh.target(twin), mesh.source(h));
        }
    }
    assert_eq!(mesh.vertices().len(), 8);
}

#[test]
fn test_self_booleans_on_cube() {
    let cube = unit_cube();

    let union = cube.union(&cube).unwrap();
    assert_eq!(union.number_of_faces(), 12);

    let difference = cube.subtract(&cube).unwrap();
    assert_eq!(difference.number_of_faces(), 0);

    let intersection = cube.intersect(&cube).unwrap();
    assert_eq!(intersection.number_of_faces(), 12);
    assert_relative_eq!(intersection.volume(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_disjoint_union_keeps_both() {
    let a = unit_cube();
    let b = cuboid([2.0, 2.0, 2.0], [3.0, 3.0, 3.0]);

    let union = a.union(&b).unwrap();
    assert_eq!(union.number_of_faces(), 24);
    assert_relative_eq!(union.volume(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_overlapping_cubes_volumes() {
    let a = unit_cube();
    let b = cuboid([0.5; 3], [1.5; 3]);

    let intersection = a.intersect(&b).unwrap();
    assert_relative_eq!(intersection.volume(), 0.125, epsilon = 1e-9);

    let difference = a.subtract(&b).unwrap();
    assert_relative_eq!(difference.volume(), 0.875, epsilon = 1e-9);
}

/// Unit cube turned 0.5 rad about z and lifted so it overlaps a corner region
fn rotated_cube() -> SurfaceMesh {
    let mut cube = unit_cube();
    let (sin, cos) = 0.5_f64.sin_cos();
    cube.transform(&Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0));
    cube.translate(0.5, 0.5, 0.7);
    cube
}

#[test]
fn test_booleans_with_rotated_cube_are_closed() {
    let a = unit_cube();
    let r = rotated_cube();

    let union = a.union(&r).unwrap();
    let intersection = a.intersect(&r).unwrap();
    let difference = a.subtract(&r).unwrap();
    for (name, result) in [
        ("union", &union),
        ("intersection", &intersection),
        ("difference", &difference),
    ] {
        assert!(
            result.is_closed(),
            "{} has {} border edges",
            name,
            result.border_edge_count()
        );
    }

    assert!(intersection.volume() > 0.0);
    assert_relative_eq!(union.volume(), 2.0 - intersection.volume(), epsilon = 1e-6);
    assert_relative_eq!(difference.volume(), 1.0 - intersection.volume(), epsilon = 1e-6);
}

#[test]
fn test_boolean_result_feeds_next_boolean() {
    let union = unit_cube().union(&rotated_cube()).unwrap();

    let far = cuboid([5.0; 3], [6.0; 3]);
    let chained = union.union(&far).unwrap();
    assert!(chained.is_closed());
    assert_relative_eq!(chained.volume(), union.volume() + 1.0, epsilon = 1e-9);

    // Corner cube overlaps only the axis-aligned part, in [0, 0.5]^3
    let corner = cuboid([-0.5; 3], [0.5; 3]);
    let carved = union.subtract(&corner).unwrap();
    assert!(carved.is_closed());
    assert_relative_eq!(carved.volume(), union.volume() - 0.125, epsilon = 1e-6);
}

#[test]
fn test_open_mesh_boolean_fails() {
    let mut open = unit_cube();
    open.clear();
    open.add_vertex(0.0, 0.0, 0.0);
    open.add_vertex(1.0, 0.0, 0.0);
    open.add_vertex(0.0, 1.0, 0.0);
    open.add_face(0, 1, 2).unwrap();

    let err = unit_cube().union(&open).unwrap_err();
    assert!(matches!(
        err,
        GeometryError::BooleanFailed {
            op: BooleanOp::Union,
            ..
        }
    ));
    assert!(err.to_string().contains("input B is not closed"));
}

#[test]
fn test_open_inputs_allowed_when_configured() {
    let mut open = SurfaceMesh::new();
    open.add_vertex(5.0, 5.0, 5.0);
    open.add_vertex(6.0, 5.0, 5.0);
    open.add_vertex(5.0, 6.0, 5.0);
    open.add_face(0, 1, 2).unwrap();

    let kernel = NativeKernel::new(KernelConfig {
        require_closed_inputs: false,
        ..KernelConfig::default()
    });
    let union = unit_cube().union_with(&open, &kernel).unwrap();
    assert_eq!(union.number_of_faces(), 13);
}

#[test]
fn test_from_arrays_matches_from_lists() {
    let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let faces = [[0usize, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];

    let from_lists = SurfaceMesh::from_lists(&vertices, &faces).unwrap();
    let face_rows: Vec<[f64; 3]> = faces
        .iter()
        .map(|f| [f[0] as f64, f[1] as f64, f[2] as f64])
        .collect();
    let from_arrays = SurfaceMesh::from_arrays(
        &NumericArray::from_rows(&vertices).unwrap(),
        &NumericArray::from_rows(&face_rows).unwrap(),
    )
    .unwrap();

    assert_eq!(
        from_lists.to_vertices_and_polygons(),
        from_arrays.to_vertices_and_polygons()
    );
    assert!(from_arrays.is_closed());
}
