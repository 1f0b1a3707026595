//! Polygon to zone serialization.
//!
//! KiCad zones have no holes. A polygon becomes one filled zone for its
//! outer contour plus one keep-out zone per hole that forbids copper pour
//! inside it.

use crate::board::{Board, Point, Polygon};
use crate::geometry::transform::{area_to_mm2, point_to_mm};
use crate::nets::Net;

use super::ids::IdGenerator;
use super::records::{ZoneFill, ZoneRecord};

/// Board-wide fill settings shared by every zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneOptions {
    /// Minimum island area in mm²
    pub island_area_min: f64,
}

impl ZoneOptions {
    pub fn from_board(board: &Board) -> Self {
        Self {
            island_area_min: area_to_mm2(board.isle_area),
        }
    }
}

fn points_mm(points: &[Point]) -> Vec<(f64, f64)> {
    points.iter().copied().map(point_to_mm).collect()
}

/// Zones for one copper polygon: the filled outer contour first, then
/// one keep-out per non-empty hole, all on `layer`.
pub fn emit_polygon(
    polygon: &Polygon,
    net: &Net,
    layer: &str,
    options: &ZoneOptions,
    ids: &mut dyn IdGenerator,
) -> Vec<ZoneRecord> {
    check_hole_indices(polygon, layer);

    let mut zones = Vec::with_capacity(polygon.holes.len() + 1);
    zones.push(ZoneRecord {
        net: net.id,
        net_name: net.name.clone(),
        layer: layer.to_string(),
        uuid: ids.next_id(),
        fill: ZoneFill::Filled {
            island_removal_mode: if polygon.full { 2 } else { 0 },
            island_area_min: options.island_area_min,
        },
        points: points_mm(polygon.outer()),
    });

    for (i, range) in polygon.hole_ranges().into_iter().enumerate() {
        if range.is_empty() {
            tracing::warn!("Skipping empty hole {} of polygon on {}", i, layer);
            continue;
        }
        zones.push(ZoneRecord {
            net: 0,
            net_name: String::new(),
            layer: layer.to_string(),
            uuid: ids.next_id(),
            fill: ZoneFill::Keepout,
            points: points_mm(&polygon.points[range]),
        });
    }
    zones
}

fn check_hole_indices(polygon: &Polygon, layer: &str) {
    let n = polygon.points.len();
    let mut previous = 0;
    for (i, &start) in polygon.holes.iter().enumerate() {
        if start > n {
            tracing::warn!(
                "Hole {} of polygon on {} starts at {} past {} points, clamping",
                i,
                layer,
                start,
                n
            );
        } else if start < previous {
            tracing::warn!(
                "Hole {} of polygon on {} starts at {} before {}, clamping",
                i,
                layer,
                start,
                previous
            );
        }
        previous = previous.max(start);
    }
}
