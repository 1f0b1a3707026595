//! Board Model
//!
//! In-memory representation of a gEDA-style printed circuit board.
//! All coordinates and sizes are in internal units (nanometres); the
//! board is read-only for the duration of an export.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

use super::font::Font;

/// Internal fixed-point unit: one nanometre.
pub type Coord = i64;

/// A complete board layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    pub name: String,
    pub width: Coord,
    pub height: Coord,
    /// Minimum island area kept by polygon fills (nm²)
    pub isle_area: f64,
    pub layers: Vec<Layer>,
    pub footprints: Vec<Footprint>,
    pub vias: Vec<Via>,
    pub netlist: Vec<NetlistEntry>,
    #[serde(default = "super::font::builtin_font")]
    pub font: Font,
}

impl Board {
    /// True when the board carries no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.vias.is_empty()
            && self.footprints.is_empty()
            && self.layers.iter().all(Layer::is_empty)
    }

    pub fn copper_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers.iter().enumerate().filter(|(_, l)| l.is_copper())
    }

    /// Layer group of the first copper layer on the given side.
    pub fn copper_group(&self, side: LayerSide) -> Option<usize> {
        self.copper_layers()
            .find(|(_, l)| l.side == side)
            .map(|(_, l)| l.group)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Copper,
    Silk,
    Outline,
    Notes,
    Mask,
    Paste,
    Fab,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSide {
    #[default]
    Top,
    Bottom,
    Internal,
}

/// One layer of the stack with the drawing primitives it owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    pub side: LayerSide,
    /// Layer group; layers in the same group are electrically one layer
    pub group: usize,
    pub lines: Vec<Line>,
    pub arcs: Vec<Arc>,
    pub polygons: Vec<Polygon>,
    pub texts: Vec<Text>,
}

impl Layer {
    pub fn is_copper(&self) -> bool {
        self.kind == LayerKind::Copper
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.arcs.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

impl Side {
    pub fn is_back(self) -> bool {
        self == Side::Back
    }
}

/// Index of a footprint's text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Description = 0,
    Reference = 1,
    Value = 2,
}

/// A placed component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Footprint {
    /// Placement anchor
    pub mark: Point,
    /// Description (footprint name), reference designator, value
    pub texts: [Text; 3],
    pub side: Side,
    pub hide_name: bool,
    pub attributes: HashMap<String, String>,
    pub pins: Vec<Pin>,
    pub pads: Vec<Pad>,
    pub lines: Vec<Line>,
    pub arcs: Vec<Arc>,
}

impl Footprint {
    pub fn text(&self, field: TextField) -> &Text {
        &self.texts[field as usize]
    }

    pub fn reference(&self) -> &str {
        &self.text(TextField::Reference).string
    }

    pub fn value(&self) -> &str {
        &self.text(TextField::Value).string
    }

    pub fn description(&self) -> &str {
        &self.text(TextField::Description).string
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Net-list node name for one of this footprint's pins or pads, e.g. `R1-2`.
    pub fn node_name(&self, number: &str) -> String {
        format!("{}-{}", self.reference(), number)
    }

    /// Total number of pins and pads.
    pub fn terminal_count(&self) -> usize {
        self.pins.len() + self.pads.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadShape {
    #[default]
    Round,
    Square,
    Octagon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalStyle {
    Sharp,
    Round,
    Solid,
}

/// Through-hole pin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pin {
    pub number: String,
    pub x: Coord,
    pub y: Coord,
    pub thickness: Coord,
    pub clearance: Coord,
    pub mask: Coord,
    pub drill: Coord,
    pub shape: PadShape,
    /// Unplated mechanical hole
    pub hole: bool,
    pub thermal: Option<ThermalStyle>,
}

impl Pin {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Surface-mount pad, an oriented slot between two endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pad {
    pub number: String,
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
    pub clearance: Coord,
    pub mask: Coord,
    pub shape: PadShape,
    pub nopaste: bool,
}

impl Pad {
    /// Midpoint of the two endpoints
    pub fn center(&self) -> (f64, f64) {
        (
            (self.point1.x + self.point2.x) as f64 / 2.0,
            (self.point1.y + self.point2.y) as f64 / 2.0,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Via {
    pub x: Coord,
    pub y: Coord,
    pub thickness: Coord,
    pub drill: Coord,
    pub clearance: Coord,
    pub mask: Coord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
}

/// Elliptic arc; angles in degrees, measured the gEDA way
/// (0° points to -x, 90° to +y)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Arc {
    pub x: Coord,
    pub y: Coord,
    pub width: Coord,
    pub height: Coord,
    pub start_angle: f64,
    pub delta: f64,
    pub thickness: Coord,
}

fn default_scale() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub x: Coord,
    #[serde(default)]
    pub y: Coord,
    /// Quarter turns, 0..=3
    #[serde(default)]
    pub direction: u8,
    /// Percent of the font's nominal size
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub string: String,
    /// Placed on the solder side and drawn mirrored
    #[serde(default)]
    pub mirrored: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            direction: 0,
            scale: default_scale(),
            string: String::new(),
            mirrored: false,
            hidden: false,
        }
    }
}

impl Text {
    /// Direction in degrees, one of 0, 90, 180, 270.
    pub fn angle(&self) -> i32 {
        i32::from(self.direction & 0x03) * 90
    }
}

/// Polygon with optional holes. `points[..holes[0]]` is the outer
/// contour; each hole runs from its start index to the next one
/// (the last to the end of `points`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub holes: Vec<usize>,
    /// Keep all islands of the fill instead of only the largest
    pub full: bool,
}

impl Polygon {
    pub fn outer(&self) -> &[Point] {
        let end = self
            .holes
            .first()
            .copied()
            .unwrap_or(self.points.len())
            .min(self.points.len());
        &self.points[..end]
    }

    /// Point ranges of each hole, start indices clamped into bounds and
    /// forced non-decreasing.
    pub fn hole_ranges(&self) -> Vec<Range<usize>> {
        let n = self.points.len();
        let mut starts = Vec::with_capacity(self.holes.len());
        let mut previous = self.outer().len();
        for &start in &self.holes {
            let start = start.clamp(previous, n);
            starts.push(start);
            previous = start;
        }
        starts
            .iter()
            .enumerate()
            .map(|(i, &start)| start..starts.get(i + 1).copied().unwrap_or(n))
            .collect()
    }
}

/// One named net of the board's net-list with its `REFDES-PIN` members
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetlistEntry {
    pub name: String,
    pub connections: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_name_uses_reference_designator() {
        let mut fp = Footprint::default();
        fp.texts[TextField::Reference as usize].string = "R7".to_string();
        assert_eq!(fp.node_name("2"), "R7-2");
    }

    #[test]
    fn test_polygon_outer_stops_at_first_hole() {
        let poly = Polygon {
            points: (0..7).map(|i| Point::new(i, i)).collect(),
            holes: vec![4],
            full: false,
        };
        assert_eq!(poly.outer().len(), 4);
    }

    #[test]
    fn test_hole_ranges_clamp_bad_indices() {
        let poly = Polygon {
            points: (0..10).map(|i| Point::new(i, 0)).collect(),
            holes: vec![4, 3, 12],
            full: false,
        };
        assert_eq!(poly.hole_ranges(), vec![4..4, 4..10, 10..10]);
    }

    #[test]
    fn test_text_angle_wraps_direction() {
        let text = Text {
            direction: 5,
            ..Default::default()
        };
        assert_eq!(text.angle(), 90);
    }

    #[test]
    fn test_empty_board() {
        let board = Board {
            layers: vec![Layer::default()],
            ..Default::default()
        };
        assert!(board.is_empty());
    }
}
