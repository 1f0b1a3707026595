//! Arc endpoint and extent computation.
//!
//! Arcs follow the gEDA angle convention: a point at angle `a` on an arc
//! centred at `(x, y)` with radii `(w, h)` sits at
//! `(x - w·cos a, y + h·sin a)`.

use crate::board::{Arc, Point};

use super::transform::Rotation;

/// Point on the arc's ellipse at `degrees`, unrounded.
pub fn point_at(arc: &Arc, degrees: f64) -> (f64, f64) {
    let r = Rotation::from_degrees(degrees);
    (
        arc.x as f64 - arc.width as f64 * r.cos,
        arc.y as f64 + arc.height as f64 * r.sin,
    )
}

/// Start and end points of an arc.
pub fn arc_ends(arc: &Arc) -> (Point, Point) {
    let start = point_at(arc, arc.start_angle);
    let end = point_at(arc, arc.start_angle + arc.delta);
    (round_point(start), round_point(end))
}

/// Angles that must be checked for the arc's extent: both endpoints plus
/// every multiple of 90° swept over.
pub fn extent_angles(arc: &Arc) -> Vec<f64> {
    let a = arc.start_angle;
    let b = arc.start_angle + arc.delta;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

    let mut angles = vec![a, b];
    let mut quarter = (lo / 90.0).ceil();
    while quarter * 90.0 <= hi {
        angles.push(quarter * 90.0);
        quarter += 1.0;
    }
    angles
}

/// Sweep an arc into `segments` chords, start to end.
pub fn polyline(arc: &Arc, segments: usize) -> Vec<(f64, f64)> {
    let n = segments.max(1);
    (0..=n)
        .map(|i| point_at(arc, arc.start_angle + arc.delta * i as f64 / n as f64))
        .collect()
}

fn round_point((x, y): (f64, f64)) -> Point {
    Point::new(x.round() as i64, y.round() as i64)
}
