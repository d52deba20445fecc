// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon JSON: a polygon is an array of `[x, y]` pairs

use crate::error::GeometryResult;
use crate::geometry::Polygon2;
use std::fs;
use std::path::Path;

fn to_pairs(polygon: &Polygon2) -> Vec<[f64; 2]> {
    polygon.iter().map(|p| [p.x, p.y]).collect()
}

pub fn polygon_from_json(text: &str) -> GeometryResult<Polygon2> {
    let pairs: Vec<[f64; 2]> = serde_json::from_str(text)?;
    Polygon2::from_points(&pairs)
}

pub fn polygons_to_json(polygons: &[Polygon2]) -> GeometryResult<String> {
    let pairs: Vec<Vec<[f64; 2]>> = polygons.iter().map(to_pairs).collect();
    Ok(serde_json::to_string_pretty(&pairs)?)
}

pub fn read_polygon_json(path: impl AsRef<Path>) -> GeometryResult<Polygon2> {
    polygon_from_json(&fs::read_to_string(path.as_ref())?)
}

/// Write `polygons` as an array of polygon arrays
pub fn write_polygons_json(polygons: &[Polygon2], path: impl AsRef<Path>) -> GeometryResult<()> {
    fs::write(path.as_ref(), polygons_to_json(polygons)?)?;
    Ok(())
}
