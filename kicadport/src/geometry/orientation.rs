//! Footprint Orientation Inference
//!
//! gEDA footprints carry no rotation of their own; the canonical angle is
//! recovered from where pin 1 sits relative to the footprint centroid,
//! following the IPC-7351 conventions for two-pin and multi-pin parts.

use crate::board::Footprint;

use super::transform::frame_offset;

/// Attribute that pins a footprint's rotation, in degrees.
pub const FIXED_ROTATION_ATTRIBUTE: &str = "xy-fixed-rotation";

/// Designators tried for pin 1, highest priority first.
const REFERENCE_PINS: [&str; 6] = ["1", "2", "A1", "A2", "B1", "B2"];

#[derive(Debug, Clone, Copy)]
struct ReferencePin {
    x: f64,
    y: f64,
    /// Intrinsic angle; pins have none
    angle: f64,
}

/// Infer a footprint's rotation in degrees.
pub fn infer_rotation(footprint: &Footprint) -> f64 {
    if let Some(raw) = footprint.attribute(FIXED_ROTATION_ATTRIBUTE) {
        match raw.trim().parse::<f64>() {
            Ok(theta) if theta.is_finite() => return theta,
            _ => tracing::warn!(
                "Ignoring invalid {} '{}' on {}",
                FIXED_ROTATION_ATTRIBUTE,
                raw,
                footprint.reference()
            ),
        }
    }

    let count = footprint.terminal_count();
    if count == 0 {
        return 0.0;
    }

    let found = reference_pins(footprint);
    let centroid = centroid(footprint);

    for pin in found.iter().flatten() {
        if count == 1 {
            return pin.angle;
        }
        let (x, y) = frame_offset((pin.x, pin.y), centroid, footprint.side);
        if x != 0.0 || y != 0.0 {
            return classify(x, y, count > 2);
        }
    }
    0.0
}

/// Angle in degrees of a pad's slot, y axis pointing up.
pub fn pad_angle(footprint: &Footprint, pad: usize) -> Option<f64> {
    footprint.pads.get(pad).map(|p| {
        ((p.point1.y - p.point2.y) as f64)
            .atan2((p.point2.x - p.point1.x) as f64)
            .to_degrees()
    })
}

fn reference_pins(footprint: &Footprint) -> [Option<ReferencePin>; REFERENCE_PINS.len()] {
    let mut found = [None; REFERENCE_PINS.len()];

    for pin in &footprint.pins {
        if let Some(slot) = REFERENCE_PINS.iter().position(|n| *n == pin.number) {
            found[slot] = Some(ReferencePin {
                x: pin.x as f64,
                y: pin.y as f64,
                angle: 0.0,
            });
        }
    }

    for (i, pad) in footprint.pads.iter().enumerate() {
        if let Some(slot) = REFERENCE_PINS.iter().position(|n| *n == pad.number) {
            let (x, y) = pad.center();
            found[slot] = Some(ReferencePin {
                x,
                y,
                angle: pad_angle(footprint, i).unwrap_or(0.0),
            });
        }
    }
    found
}

/// Mean of pin positions and pad midpoints.
fn centroid(footprint: &Footprint) -> (f64, f64) {
    let points = footprint
        .pins
        .iter()
        .map(|p| (p.x as f64, p.y as f64))
        .chain(footprint.pads.iter().map(|p| p.center()));

    let mut n = 0.0;
    let (mut sx, mut sy) = (0.0, 0.0);
    for (x, y) in points {
        sx += x;
        sy += y;
        n += 1.0;
    }
    if n == 0.0 {
        (0.0, 0.0)
    } else {
        (sx / n, sy / n)
    }
}

/// Bucket pin 1's direction from the centroid into a quarter turn.
fn classify(x: f64, y: f64, more_than_two: bool) -> f64 {
    let d = (-y).atan2(x).to_degrees();

    if more_than_two {
        // pin 1 top-left or dead top reads as 0°
        if d < -100.0 {
            90.0
        } else if d < -10.0 {
            180.0
        } else if d < 80.0 {
            270.0
        } else if d < 170.0 {
            0.0
        } else {
            90.0
        }
    } else {
        // pin 1 left or top-left reads as 0°
        if d < -175.0 {
            0.0
        } else if d < -85.0 {
            90.0
        } else if d < 5.0 {
            180.0
        } else if d < 95.0 {
            270.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pad, Pin, Point, Side};
    use std::collections::HashMap;

    fn pin(number: &str, x: i64, y: i64) -> Pin {
        Pin {
            number: number.to_string(),
            x,
            y,
            ..Default::default()
        }
    }

    fn pad(number: &str, p1: (i64, i64), p2: (i64, i64)) -> Pad {
        Pad {
            number: number.to_string(),
            point1: Point::new(p1.0, p1.1),
            point2: Point::new(p2.0, p2.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_pin_left_to_right_is_zero() {
        let fp = Footprint {
            pins: vec![pin("1", 0, 0), pin("2", 10, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 0.0);
    }

    #[test]
    fn test_two_pin_right_to_left_is_180() {
        let fp = Footprint {
            pins: vec![pin("1", 10, 0), pin("2", 0, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 180.0);
    }

    #[test]
    fn test_two_pin_back_side_mirrors() {
        let fp = Footprint {
            pins: vec![pin("1", 10, 0), pin("2", 0, 0)],
            side: Side::Back,
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 0.0);
    }

    #[test]
    fn test_two_pin_vertical() {
        // pin 1 below the centroid (y grows downwards)
        let fp = Footprint {
            pins: vec![pin("1", 0, 10), pin("2", 0, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 90.0);
    }

    #[test]
    fn test_multi_pin_top_left_is_zero() {
        let fp = Footprint {
            pins: vec![pin("1", 0, 0), pin("2", 10, 0), pin("3", 10, 10), pin("4", 0, 10)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 0.0);
    }

    #[test]
    fn test_multi_pin_bottom_right_is_180() {
        let fp = Footprint {
            pins: vec![pin("1", 10, 10), pin("2", 0, 10), pin("3", 0, 0), pin("4", 10, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 180.0);
    }

    #[test]
    fn test_single_pad_uses_slot_angle() {
        let fp = Footprint {
            pads: vec![pad("1", (0, 0), (10, -10))],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 45.0);

        let fp = Footprint {
            pads: vec![pad("1", (0, 0), (0, 10))],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), -90.0);
    }

    #[test]
    fn test_single_undesignated_pad_is_zero() {
        // "5" is not a reference designator, so the slot angle is not consulted
        let fp = Footprint {
            pads: vec![pad("5", (0, 10), (10, 0))],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 0.0);
    }

    #[test]
    fn test_fixed_rotation_attribute() {
        let mut attributes = HashMap::new();
        attributes.insert(FIXED_ROTATION_ATTRIBUTE.to_string(), "135".to_string());
        let fp = Footprint {
            attributes,
            pins: vec![pin("1", 0, 0), pin("2", 10, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 135.0);
    }

    #[test]
    fn test_malformed_fixed_rotation_falls_through() {
        let mut attributes = HashMap::new();
        attributes.insert(FIXED_ROTATION_ATTRIBUTE.to_string(), "sideways".to_string());
        let fp = Footprint {
            attributes,
            pins: vec![pin("1", 10, 0), pin("2", 0, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 180.0);
    }

    #[test]
    fn test_non_finite_fixed_rotation_falls_through() {
        for raw in ["NaN", "inf", "-inf"] {
            let mut attributes = HashMap::new();
            attributes.insert(FIXED_ROTATION_ATTRIBUTE.to_string(), raw.to_string());
            let fp = Footprint {
                attributes,
                side: Side::Back,
                pins: vec![pin("1", 0, 0), pin("2", 10, 0)],
                ..Default::default()
            };
            assert_eq!(infer_rotation(&fp), 180.0, "attribute {raw}");
        }
    }

    #[test]
    fn test_no_reference_pin_defaults_to_zero() {
        let fp = Footprint {
            pins: vec![pin("G", 0, 0), pin("S", 10, 0), pin("D", 5, 5)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 0.0);
    }

    #[test]
    fn test_pin_at_centroid_falls_to_next_designator() {
        // pin 1 sits on the centroid, pin 2 decides
        let fp = Footprint {
            pins: vec![pin("1", 5, 0), pin("2", 0, 0), pin("3", 10, 0)],
            ..Default::default()
        };
        assert_eq!(infer_rotation(&fp), 90.0);
    }
}
