//! Copper Connectivity
//!
//! The net resolver only needs one question answered: which copper
//! primitives are electrically reachable from a seed? `ConnectivitySearch`
//! is that seam. `CopperGraph` is the default answer, a petgraph graph of
//! touching copper built once per board and walked breadth-first.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet};

use crate::board::{Board, LayerSide, Point, Polygon, Side};
use crate::geometry::arc::polyline;
use crate::geometry::bbox::{arc_box, line_box, pad_box, pin_box, polygon_box, via_box};
use crate::geometry::BoundingBox;

/// Identity of one copper primitive on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveId {
    Pin { footprint: usize, pin: usize },
    Pad { footprint: usize, pad: usize },
    Via(usize),
    Line { layer: usize, line: usize },
    Arc { layer: usize, arc: usize },
    Polygon { layer: usize, polygon: usize },
}

/// Flood fill over electrically connected copper.
pub trait ConnectivitySearch {
    /// Insert every primitive reachable from `seed` into `found`.
    fn find_connected(&mut self, seed: PrimitiveId, found: &mut HashSet<PrimitiveId>);
}

/// Chords used to approximate copper arcs
const ARC_SEGMENTS: usize = 16;

type Vec2 = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupSpan {
    /// Plated through the whole stack
    All,
    Group(usize),
}

impl GroupSpan {
    fn overlaps(self, other: GroupSpan) -> bool {
        match (self, other) {
            (GroupSpan::Group(a), GroupSpan::Group(b)) => a == b,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Area {
    outer: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
}

impl Area {
    fn from_polygon(polygon: &Polygon) -> Option<Self> {
        let ring = |points: &[Point]| points.iter().map(|p| (p.x as f64, p.y as f64)).collect::<Vec<_>>();
        let outer = ring(polygon.outer());
        if outer.len() < 3 {
            return None;
        }
        let holes = polygon
            .hole_ranges()
            .into_iter()
            .map(|r| ring(&polygon.points[r]))
            .filter(|h| h.len() >= 3)
            .collect();
        Some(Self { outer, holes })
    }

    fn contains(&self, p: Vec2) -> bool {
        in_ring(&self.outer, p) && !self.holes.iter().any(|h| in_ring(h, p))
    }
}

/// Stroked copper: segments with a half width, plus a filled area for polygons
#[derive(Debug, Clone)]
struct CopperShape {
    id: PrimitiveId,
    span: GroupSpan,
    segments: Vec<(Vec2, Vec2)>,
    half_width: f64,
    area: Option<Area>,
    bbox: BoundingBox,
}

impl CopperShape {
    fn dot(id: PrimitiveId, span: GroupSpan, at: Point, thickness: i64, bbox: BoundingBox) -> Self {
        let p = (at.x as f64, at.y as f64);
        Self {
            id,
            span,
            segments: vec![(p, p)],
            half_width: thickness as f64 / 2.0,
            area: None,
            bbox,
        }
    }

    fn stroke(id: PrimitiveId, span: GroupSpan, points: &[Vec2], thickness: i64, bbox: BoundingBox) -> Self {
        let segments = if points.len() == 1 {
            vec![(points[0], points[0])]
        } else {
            points.windows(2).map(|w| (w[0], w[1])).collect()
        };
        Self {
            id,
            span,
            segments,
            half_width: thickness as f64 / 2.0,
            area: None,
            bbox,
        }
    }

    fn touches(&self, other: &CopperShape) -> bool {
        if !self.span.overlaps(other.span) || !self.bbox.intersects(&other.bbox) {
            return false;
        }
        let reach = self.half_width + other.half_width;
        let strokes_meet = self.segments.iter().any(|a| {
            other
                .segments
                .iter()
                .any(|b| segment_distance(*a, *b) <= reach)
        });
        strokes_meet || self.covers(other) || other.covers(self)
    }

    /// True if this shape's fill contains a vertex of `other`.
    fn covers(&self, other: &CopperShape) -> bool {
        match &self.area {
            Some(area) => other.segments.iter().any(|(p, _)| area.contains(*p)),
            None => false,
        }
    }
}

/// Default connectivity search over the board's copper
#[derive(Debug, Clone)]
pub struct CopperGraph {
    graph: UnGraph<PrimitiveId, ()>,
    index: HashMap<PrimitiveId, NodeIndex>,
}

impl CopperGraph {
    pub fn new(board: &Board) -> Self {
        let shapes = collect_shapes(board);

        let mut graph = UnGraph::with_capacity(shapes.len(), shapes.len());
        let mut index = HashMap::with_capacity(shapes.len());
        let nodes: Vec<NodeIndex> = shapes
            .iter()
            .map(|s| {
                let node = graph.add_node(s.id);
                index.insert(s.id, node);
                node
            })
            .collect();

        // sweep over boxes sorted by left edge
        let mut order: Vec<usize> = (0..shapes.len()).collect();
        order.sort_by_key(|&i| shapes[i].bbox.x1);
        for (k, &i) in order.iter().enumerate() {
            for &j in &order[k + 1..] {
                if shapes[j].bbox.x1 > shapes[i].bbox.x2 {
                    break;
                }
                if shapes[i].touches(&shapes[j]) {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        tracing::debug!(
            "Copper graph: {} primitives, {} contacts",
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph, index }
    }

    pub fn primitive_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn contact_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of electrically separate copper clusters.
    pub fn cluster_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    pub fn contains(&self, id: PrimitiveId) -> bool {
        self.index.contains_key(&id)
    }
}

impl ConnectivitySearch for CopperGraph {
    fn find_connected(&mut self, seed: PrimitiveId, found: &mut HashSet<PrimitiveId>) {
        let Some(&start) = self.index.get(&seed) else {
            return;
        };
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            found.insert(self.graph[node]);
        }
    }
}

fn collect_shapes(board: &Board) -> Vec<CopperShape> {
    let mut shapes = Vec::new();
    let top = board.copper_group(LayerSide::Top);
    let bottom = board.copper_group(LayerSide::Bottom);

    for (f, footprint) in board.footprints.iter().enumerate() {
        for (p, pin) in footprint.pins.iter().enumerate() {
            if pin.hole {
                continue;
            }
            shapes.push(CopperShape::dot(
                PrimitiveId::Pin { footprint: f, pin: p },
                GroupSpan::All,
                pin.position(),
                pin.thickness,
                pin_box(pin),
            ));
        }

        let group = match footprint.side {
            Side::Front => top,
            Side::Back => bottom,
        };
        let Some(group) = group else { continue };
        for (p, pad) in footprint.pads.iter().enumerate() {
            let ends = [
                (pad.point1.x as f64, pad.point1.y as f64),
                (pad.point2.x as f64, pad.point2.y as f64),
            ];
            shapes.push(CopperShape::stroke(
                PrimitiveId::Pad { footprint: f, pad: p },
                GroupSpan::Group(group),
                &ends,
                pad.thickness,
                pad_box(pad),
            ));
        }
    }

    for (v, via) in board.vias.iter().enumerate() {
        shapes.push(CopperShape::dot(
            PrimitiveId::Via(v),
            GroupSpan::All,
            Point::new(via.x, via.y),
            via.thickness,
            via_box(via),
        ));
    }

    for (l, layer) in board.copper_layers() {
        let span = GroupSpan::Group(layer.group);
        for (i, line) in layer.lines.iter().enumerate() {
            let ends = [
                (line.point1.x as f64, line.point1.y as f64),
                (line.point2.x as f64, line.point2.y as f64),
            ];
            shapes.push(CopperShape::stroke(
                PrimitiveId::Line { layer: l, line: i },
                span,
                &ends,
                line.thickness,
                line_box(line),
            ));
        }
        for (i, arc) in layer.arcs.iter().enumerate() {
            shapes.push(CopperShape::stroke(
                PrimitiveId::Arc { layer: l, arc: i },
                span,
                &polyline(arc, ARC_SEGMENTS),
                arc.thickness,
                arc_box(arc),
            ));
        }
        for (i, polygon) in layer.polygons.iter().enumerate() {
            let Some(area) = Area::from_polygon(polygon) else {
                tracing::warn!("Skipping degenerate polygon {} on layer {}", i, layer.name);
                continue;
            };
            let mut ring = area.outer.clone();
            ring.push(area.outer[0]);
            let mut shape = CopperShape::stroke(
                PrimitiveId::Polygon { layer: l, polygon: i },
                span,
                &ring,
                0,
                polygon_box(polygon),
            );
            // hole edges are copper boundaries too
            for hole in &area.holes {
                let closed = hole.iter().chain(hole.first()).copied().collect::<Vec<_>>();
                shape
                    .segments
                    .extend(closed.windows(2).map(|w| (w[0], w[1])));
            }
            shape.area = Some(area);
            shapes.push(shape);
        }
    }
    shapes
}

/// Even-odd point-in-polygon test
fn in_ring(ring: &[Vec2], (x, y): Vec2) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_segment_distance(p: Vec2, (a, b): (Vec2, Vec2)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    };
    (a.0 + t * dx - p.0).hypot(a.1 + t * dy - p.1)
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn segment_distance(s: (Vec2, Vec2), t: (Vec2, Vec2)) -> f64 {
    let straddles = |d1: f64, d2: f64| (d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0);
    if straddles(cross(t.0, t.1, s.0), cross(t.0, t.1, s.1))
        && straddles(cross(s.0, s.1, t.0), cross(s.0, s.1, t.1))
    {
        return 0.0;
    }
    point_segment_distance(s.0, t)
        .min(point_segment_distance(s.1, t))
        .min(point_segment_distance(t.0, s))
        .min(point_segment_distance(t.1, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Footprint, Layer, LayerKind, Line, Pad, Pin, Via};

    fn copper(name: &str, side: LayerSide, group: usize) -> Layer {
        Layer {
            name: name.to_string(),
            kind: LayerKind::Copper,
            side,
            group,
            ..Default::default()
        }
    }

    fn line(x1: i64, y1: i64, x2: i64, y2: i64, t: i64) -> Line {
        Line {
            point1: Point::new(x1, y1),
            point2: Point::new(x2, y2),
            thickness: t,
        }
    }

    fn via(x: i64, y: i64) -> Via {
        Via {
            x,
            y,
            thickness: 600,
            drill: 300,
            ..Default::default()
        }
    }

    fn two_pin_board() -> Board {
        let mut top = copper("top", LayerSide::Top, 0);
        top.lines.push(line(0, 0, 10_000, 0, 250));
        Board {
            layers: vec![top, copper("bottom", LayerSide::Bottom, 1)],
            footprints: vec![Footprint {
                pins: vec![
                    Pin {
                        number: "1".to_string(),
                        thickness: 1000,
                        ..Default::default()
                    },
                    Pin {
                        number: "2".to_string(),
                        x: 10_000,
                        thickness: 1000,
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            vias: vec![via(50_000, 50_000)],
            ..Default::default()
        }
    }

    fn search(graph: &mut CopperGraph, seed: PrimitiveId) -> HashSet<PrimitiveId> {
        let mut found = HashSet::new();
        graph.find_connected(seed, &mut found);
        found
    }

    #[test]
    fn test_track_joins_pins() {
        let board = two_pin_board();
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Pin { footprint: 0, pin: 0 });
        assert!(found.contains(&PrimitiveId::Pin { footprint: 0, pin: 1 }));
        assert!(found.contains(&PrimitiveId::Line { layer: 0, line: 0 }));
        assert!(!found.contains(&PrimitiveId::Via(0)));
        assert_eq!(graph.cluster_count(), 2);
    }

    #[test]
    fn test_isolated_via_finds_only_itself() {
        let board = two_pin_board();
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Via(0));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_unknown_seed_finds_nothing() {
        let board = two_pin_board();
        let mut graph = CopperGraph::new(&board);
        assert!(search(&mut graph, PrimitiveId::Via(9)).is_empty());
    }

    #[test]
    fn test_tracks_on_different_groups_do_not_touch() {
        let mut board = two_pin_board();
        board.footprints.clear();
        board.layers[1].lines.push(line(0, 0, 10_000, 0, 250));
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Line { layer: 0, line: 0 });
        assert_eq!(found.len(), 1);
        assert_eq!(graph.contact_count(), 0);
    }

    #[test]
    fn test_via_bridges_layers() {
        let mut board = two_pin_board();
        board.footprints.clear();
        board.layers[1].lines.push(line(10_000, 0, 10_000, 20_000, 250));
        board.vias = vec![via(10_000, 0)];
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Line { layer: 0, line: 0 });
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_polygon_covers_via() {
        let mut board = two_pin_board();
        board.footprints.clear();
        board.layers[0].lines.clear();
        board.layers[0].polygons.push(Polygon {
            points: vec![
                Point::new(0, 0),
                Point::new(100_000, 0),
                Point::new(100_000, 100_000),
                Point::new(0, 100_000),
            ],
            ..Default::default()
        });
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Polygon { layer: 0, polygon: 0 });
        assert!(found.contains(&PrimitiveId::Via(0)));
    }

    #[test]
    fn test_via_in_polygon_hole_is_isolated() {
        let mut board = two_pin_board();
        board.footprints.clear();
        board.layers[0].lines.clear();
        board.layers[0].polygons.push(Polygon {
            points: vec![
                Point::new(0, 0),
                Point::new(100_000, 0),
                Point::new(100_000, 100_000),
                Point::new(0, 100_000),
                Point::new(40_000, 40_000),
                Point::new(60_000, 40_000),
                Point::new(60_000, 60_000),
                Point::new(40_000, 60_000),
            ],
            holes: vec![4],
            full: false,
        });
        let mut graph = CopperGraph::new(&board);
        let found = search(&mut graph, PrimitiveId::Via(0));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_track_leaving_hole_joins_polygon() {
        let mut board = two_pin_board();
        board.footprints.clear();
        board.vias.clear();
        board.layers[0].lines = vec![line(50_000, 50_000, 80_000, 50_000, 250)];
        board.layers[0].polygons.push(Polygon {
            points: vec![
                Point::new(0, 0),
                Point::new(100_000, 0),
                Point::new(100_000, 100_000),
                Point::new(0, 100_000),
                Point::new(40_000, 40_000),
                Point::new(60_000, 40_000),
                Point::new(60_000, 60_000),
                Point::new(40_000, 60_000),
            ],
            holes: vec![4],
            full: false,
        });
        let mut graph = CopperGraph::new(&board);
        // starts inside the hole, crosses its edge into the pour
        let found = search(&mut graph, PrimitiveId::Line { layer: 0, line: 0 });
        assert!(found.contains(&PrimitiveId::Polygon { layer: 0, polygon: 0 }));
        assert_eq!(graph.cluster_count(), 1);
    }

    #[test]
    fn test_pad_sits_on_its_side_group() {
        let mut board = two_pin_board();
        board.footprints = vec![Footprint {
            side: Side::Back,
            pads: vec![Pad {
                number: "1".to_string(),
                point1: Point::new(0, 0),
                point2: Point::new(2_000, 0),
                thickness: 1_000,
                ..Default::default()
            }],
            ..Default::default()
        }];
        let mut graph = CopperGraph::new(&board);
        // top track runs under the pad but the pad is on the bottom group
        let found = search(&mut graph, PrimitiveId::Pad { footprint: 0, pad: 0 });
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_crossing_segments_have_zero_distance() {
        let d = segment_distance(((0.0, 0.0), (10.0, 10.0)), ((0.0, 10.0), (10.0, 0.0)));
        assert_eq!(d, 0.0);
        let d = segment_distance(((0.0, 0.0), (10.0, 0.0)), ((0.0, 3.0), (10.0, 3.0)));
        assert_eq!(d, 3.0);
    }
}
