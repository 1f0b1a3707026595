//! Bounding Boxes
//!
//! Axis-aligned extents of every board primitive, in internal units.
//! Stroke widths are included: lines, pins, vias and arcs grow by half
//! their thickness, pads by the full thickness.

use serde::Serialize;
use std::fmt;

use crate::board::{Arc, Board, Coord, Font, Footprint, Line, Pad, Pin, Point, Polygon, Text, TextField, Via};

use super::arc::{extent_angles, point_at};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x1: Coord,
    pub y1: Coord,
    pub x2: Coord,
    pub y2: Coord,
}

impl BoundingBox {
    /// Degenerate box at the origin.
    pub const ZERO: BoundingBox = BoundingBox {
        x1: 0,
        y1: 0,
        x2: 0,
        y2: 0,
    };

    pub fn from_point(p: Point) -> Self {
        Self {
            x1: p.x,
            y1: p.y,
            x2: p.x,
            y2: p.y,
        }
    }

    /// Box spanning two corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    pub fn expand(self, by: Coord) -> Self {
        Self {
            x1: self.x1 - by,
            y1: self.y1 - by,
            x2: self.x2 + by,
            y2: self.y2 + by,
        }
    }

    pub fn union(self, other: BoundingBox) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn include(&mut self, p: Point) {
        *self = self.union(Self::from_point(p));
    }

    pub fn width(&self) -> Coord {
        self.x2 - self.x1
    }

    pub fn height(&self) -> Coord {
        self.y2 - self.y1
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    /// True if the boxes share at least one point.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Union of an iterator of boxes, `None` when empty
fn union_all(boxes: impl IntoIterator<Item = BoundingBox>) -> Option<BoundingBox> {
    boxes.into_iter().reduce(BoundingBox::union)
}

pub fn line_box(line: &Line) -> BoundingBox {
    BoundingBox::from_corners(line.point1, line.point2).expand(line.thickness / 2)
}

pub fn pad_box(pad: &Pad) -> BoundingBox {
    BoundingBox::from_corners(pad.point1, pad.point2).expand(pad.thickness)
}

pub fn pin_box(pin: &Pin) -> BoundingBox {
    BoundingBox::from_point(pin.position()).expand(pin.thickness / 2)
}

pub fn via_box(via: &Via) -> BoundingBox {
    BoundingBox::from_point(Point::new(via.x, via.y)).expand(via.thickness / 2)
}

/// Extent of an arc including the axis-aligned extrema it sweeps over
pub fn arc_box(arc: &Arc) -> BoundingBox {
    let mut x1 = f64::INFINITY;
    let mut y1 = f64::INFINITY;
    let mut x2 = f64::NEG_INFINITY;
    let mut y2 = f64::NEG_INFINITY;
    for angle in extent_angles(arc) {
        let (x, y) = point_at(arc, angle);
        x1 = x1.min(x);
        y1 = y1.min(y);
        x2 = x2.max(x);
        y2 = y2.max(y);
    }
    BoundingBox {
        x1: x1.floor() as Coord,
        y1: y1.floor() as Coord,
        x2: x2.ceil() as Coord,
        y2: y2.ceil() as Coord,
    }
    .expand(arc.thickness / 2)
}

pub fn polygon_box(polygon: &Polygon) -> BoundingBox {
    union_all(polygon.points.iter().copied().map(BoundingBox::from_point))
        .unwrap_or(BoundingBox::ZERO)
}

/// Extent of a text string, rotated about its origin by its direction.
pub fn text_box(text: &Text, font: &Font) -> BoundingBox {
    let (width, height) = font.measure(&text.string);
    let scale = Coord::from(text.scale);
    let width = width * scale / 100;
    let height = height * scale / 100;

    let origin = Point::new(text.x, text.y);
    let (corner, turns) = if text.mirrored {
        (
            Point::new(text.x - width, text.y + height),
            (4 - (text.direction & 0x03)) & 0x03,
        )
    } else {
        (Point::new(text.x + width, text.y + height), text.direction & 0x03)
    };

    let a = rotate_quarter(origin, origin, turns);
    let b = rotate_quarter(corner, origin, turns);
    BoundingBox::from_corners(a, b)
}

/// Rotate `p` about `center` by `turns` quarter turns (+x towards -y).
fn rotate_quarter(p: Point, center: Point, turns: u8) -> Point {
    let mut dx = p.x - center.x;
    let mut dy = p.y - center.y;
    for _ in 0..turns {
        (dx, dy) = (dy, -dx);
    }
    Point::new(center.x + dx, center.y + dy)
}

/// Extent of a footprint's copper, outline and reference designator.
/// Description and value text are left out.
pub fn footprint_box(footprint: &Footprint, font: &Font) -> BoundingBox {
    let body = union_all(
        footprint
            .lines
            .iter()
            .map(line_box)
            .chain(footprint.pins.iter().map(pin_box))
            .chain(footprint.arcs.iter().map(arc_box))
            .chain(footprint.pads.iter().map(pad_box)),
    );
    let name = text_box(footprint.text(TextField::Reference), font);
    body.map_or(name, |b| b.union(name))
}

/// Extent of everything on the board, `None` for an empty board.
pub fn board_box(board: &Board) -> Option<BoundingBox> {
    if board.is_empty() {
        return None;
    }
    let font = &board.font;
    let layers = board.layers.iter().flat_map(|layer| {
        layer
            .lines
            .iter()
            .map(line_box)
            .chain(layer.arcs.iter().map(arc_box))
            .chain(layer.texts.iter().map(move |t| text_box(t, font)))
            .chain(layer.polygons.iter().map(polygon_box))
    });
    union_all(
        board
            .vias
            .iter()
            .map(via_box)
            .chain(board.footprints.iter().map(|fp| footprint_box(fp, font)))
            .chain(layers),
    )
}

/// Reference to one object of a board, by index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Via(usize),
    Footprint(usize),
    /// Reference designator text of a footprint
    FootprintName(usize),
    Pin { footprint: usize, pin: usize },
    Pad { footprint: usize, pad: usize },
    Line { layer: usize, line: usize },
    Arc { layer: usize, arc: usize },
    Text { layer: usize, text: usize },
    Polygon { layer: usize, polygon: usize },
    LinePoint { layer: usize, line: usize, second: bool },
    PolygonPoint { layer: usize, polygon: usize, point: usize },
}

/// Bounding box of any board object.
///
/// References that do not resolve yield a zero box and a warning.
pub fn bounding_box(board: &Board, object: ObjectRef) -> BoundingBox {
    match lookup_box(board, object) {
        Some(b) => b,
        None => {
            tracing::warn!("Request for bounding box of unsupported object {:?}", object);
            BoundingBox::ZERO
        }
    }
}

fn lookup_box(board: &Board, object: ObjectRef) -> Option<BoundingBox> {
    let font = &board.font;
    let fp = |i: usize| board.footprints.get(i);
    let layer = |i: usize| board.layers.get(i);

    match object {
        ObjectRef::Via(i) => board.vias.get(i).map(via_box),
        ObjectRef::Footprint(i) => fp(i).map(|f| footprint_box(f, font)),
        ObjectRef::FootprintName(i) => fp(i).map(|f| text_box(f.text(TextField::Reference), font)),
        ObjectRef::Pin { footprint, pin } => fp(footprint)?.pins.get(pin).map(pin_box),
        ObjectRef::Pad { footprint, pad } => fp(footprint)?.pads.get(pad).map(pad_box),
        ObjectRef::Line { layer: l, line } => layer(l)?.lines.get(line).map(line_box),
        ObjectRef::Arc { layer: l, arc } => layer(l)?.arcs.get(arc).map(arc_box),
        ObjectRef::Text { layer: l, text } => layer(l)?.texts.get(text).map(|t| text_box(t, font)),
        ObjectRef::Polygon { layer: l, polygon } => layer(l)?.polygons.get(polygon).map(polygon_box),
        ObjectRef::LinePoint { layer: l, line, second } => layer(l)?.lines.get(line).map(|ln| {
            BoundingBox::from_point(if second { ln.point2 } else { ln.point1 })
        }),
        ObjectRef::PolygonPoint { layer: l, polygon, point } => layer(l)?
            .polygons
            .get(polygon)?
            .points
            .get(point)
            .copied()
            .map(BoundingBox::from_point),
    }
}
