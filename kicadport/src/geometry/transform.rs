//! Unit conversion and footprint placement frames.
//!
//! KiCad coordinates are millimetres; the board model stores nanometres.
//! Footprint children are written relative to the footprint anchor,
//! rotated into the footprint's canonical orientation.

use crate::board::{Coord, Point, Side};

const NM_PER_MM: f64 = 1_000_000.0;

/// Convert an internal coordinate to millimetres.
pub fn to_mm(value: Coord) -> f64 {
    value as f64 / NM_PER_MM
}

/// Convert an internal area (nm²) to mm².
pub fn area_to_mm2(area: f64) -> f64 {
    area / (NM_PER_MM * NM_PER_MM)
}

pub fn point_to_mm(p: Point) -> (f64, f64) {
    (to_mm(p.x), to_mm(p.y))
}

/// Sine and cosine of a rotation angle. Right angles are exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pub degrees: f64,
    pub sin: f64,
    pub cos: f64,
}

impl Rotation {
    pub fn from_degrees(degrees: f64) -> Self {
        let (sin, cos) = match canonical_quadrant(degrees) {
            Some(0) => (0.0, 1.0),
            Some(1) => (1.0, 0.0),
            Some(2) => (0.0, -1.0),
            Some(3) => (-1.0, 0.0),
            _ => degrees.to_radians().sin_cos(),
        };
        Self { degrees, sin, cos }
    }

    pub fn identity() -> Self {
        Self::from_degrees(0.0)
    }

    /// Apply `[cos, -sin; sin, cos]` to a vector.
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x * self.cos - y * self.sin, x * self.sin + y * self.cos)
    }
}

/// Quarter-turn index for angles that are exact multiples of 90°.
fn canonical_quadrant(degrees: f64) -> Option<u8> {
    let turns = degrees / 90.0;
    if turns.fract() != 0.0 || !turns.is_finite() {
        return None;
    }
    Some(turns.rem_euclid(4.0) as u8)
}

/// Offset of `point` from `origin`, with x negated on the back side.
pub fn frame_offset(point: (f64, f64), origin: (f64, f64), side: Side) -> (f64, f64) {
    let x = point.0 - origin.0;
    let y = point.1 - origin.1;
    if side.is_back() {
        (-x, y)
    } else {
        (x, y)
    }
}

/// Placement frame of one footprint
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    /// Anchor in millimetres
    pub anchor: (f64, f64),
    pub rotation: Rotation,
    pub side: Side,
}

impl Placement {
    pub fn new(mark: Point, degrees: f64, side: Side) -> Self {
        Self {
            anchor: point_to_mm(mark),
            rotation: Rotation::from_degrees(degrees),
            side,
        }
    }

    /// Footprint-relative coordinates (mm) of a board point.
    pub fn to_local(&self, p: Point) -> (f64, f64) {
        self.local_mm(point_to_mm(p))
    }

    /// Same as `to_local` for a board point already in millimetres.
    pub fn local_mm(&self, (x, y): (f64, f64)) -> (f64, f64) {
        self.rotation
            .apply((x - self.anchor.0, y - self.anchor.1))
    }

    /// Board coordinates (mm) of a footprint-local offset (mm), mirrored
    /// on the back side. Inverse frame for board-space placement; written
    /// footprint children go through `to_local`, which does not mirror.
    pub fn place_local(&self, offset: (f64, f64)) -> (f64, f64) {
        let local = frame_offset(offset, (0.0, 0.0), self.side);
        let (x, y) = self.rotation.apply(local);
        (x + self.anchor.0, y + self.anchor.1)
    }
}

/// Size and angle of a slot pad written as a KiCad oval/rect pad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotShape {
    /// Centre in footprint-local millimetres
    pub center: (f64, f64),
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

const SLOT_EPSILON: f64 = 0.0001;

/// Reclassify a pad slot from its two local endpoints (mm).
///
/// Degenerate slots become squares of `thickness`; everything else is a
/// `len + thickness` by `thickness` shape turned by the slot direction,
/// normalised to `[0, 180)` since the shape is symmetric.
pub fn slot_shape(p1: (f64, f64), p2: (f64, f64), thickness: f64, rotation: f64) -> SlotShape {
    let center = ((p1.0 + p2.0) / 2.0, (p1.1 + p2.1) / 2.0);
    let dx = p2.0 - p1.0;
    let dy = p2.1 - p1.1;

    if dx.abs() <= SLOT_EPSILON && dy.abs() <= SLOT_EPSILON {
        return SlotShape {
            center,
            width: thickness,
            height: thickness,
            angle: rotation,
        };
    }

    let slot_angle = (-dy).atan2(dx).to_degrees().rem_euclid(180.0);
    SlotShape {
        center,
        width: dx.hypot(dy) + thickness,
        height: thickness,
        angle: rotation + slot_angle,
    }
}
