//! Export Driver
//!
//! Walks a board in KiCad emission order and builds the whole document
//! as one `SExp` tree: header, paper, layer table, nets, footprints, vias,
//! then every layer's tracks, zones and graphics. Nets are resolved on
//! first touch through a `NetResolver`; all run state is dropped when the
//! export finishes.

use serde::Serialize;

use crate::board::{Board, Footprint, Layer, PadShape, Pin, Point, Side, TextField, ThermalStyle, Via};
use crate::core::ExportOptions;
use crate::geometry::orientation::infer_rotation;
use crate::geometry::transform::{point_to_mm, slot_shape, to_mm, Placement};
use crate::nets::{ConnectivitySearch, CopperGraph, Net, NetResolver, NetTable, PrimitiveId};

use super::ids::{IdGenerator, RandomIds};
use super::layers::{kicad_layer, layer_table, side_layers, LayerTarget, SideLayers};
use super::records::{
    arc_geometry, net_def, Effects, FootprintRecord, GraphicArc, GraphicLine, Header, PadForm,
    PadKind, PadRecord, Paper, Property, Segment, StrokeType, TextRecord, Thermal, TrackArc,
    ViaRecord,
};
use super::sexp::SExp;
use super::zone::{emit_polygon, ZoneOptions};

/// Counts of what one export wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub nets: usize,
    pub footprints: usize,
    pub pads: usize,
    pub vias: usize,
    pub tracks: usize,
    pub zones: usize,
    pub keepouts: usize,
    pub graphics: usize,
    pub texts: usize,
    pub skipped_layers: usize,
    pub searches: usize,
}

pub struct KicadExporter<I = RandomIds> {
    options: ExportOptions,
    ids: I,
    stats: ExportStats,
}

impl KicadExporter<RandomIds> {
    pub fn new(options: ExportOptions) -> Self {
        Self::with_ids(options, RandomIds)
    }
}

impl<I: IdGenerator> KicadExporter<I> {
    pub fn with_ids(options: ExportOptions, ids: I) -> Self {
        Self {
            options,
            ids,
            stats: ExportStats::default(),
        }
    }

    /// Render a board with the default copper connectivity search.
    pub fn export(&mut self, board: &Board) -> String {
        let search = CopperGraph::new(board);
        self.export_with(board, search)
    }

    /// Render a board, resolving nets through `search`.
    pub fn export_with<S: ConnectivitySearch>(&mut self, board: &Board, search: S) -> String {
        self.document(board, search).to_pretty_string()
    }

    /// Build the document tree without rendering it.
    pub fn document<S: ConnectivitySearch>(&mut self, board: &Board, search: S) -> SExp {
        let table = NetTable::from_netlist(&board.netlist);
        let mut run = ExportRun {
            board,
            options: &self.options,
            resolver: NetResolver::new(table, search),
            ids: &mut self.ids,
            zone_options: ZoneOptions::from_board(board),
            stats: ExportStats::default(),
        };
        let document = run.document();
        run.stats.searches = run.resolver.searches();
        self.stats = run.stats;

        tracing::info!(
            "Exported {} footprints, {} vias, {} tracks, {} zones over {} nets",
            self.stats.footprints,
            self.stats.vias,
            self.stats.tracks,
            self.stats.zones,
            self.stats.nets
        );
        document
    }

    /// Counts from the most recent export.
    pub fn stats(&self) -> &ExportStats {
        &self.stats
    }
}

/// State of one export pass
struct ExportRun<'a, S> {
    board: &'a Board,
    options: &'a ExportOptions,
    resolver: NetResolver<S>,
    ids: &'a mut dyn IdGenerator,
    zone_options: ZoneOptions,
    stats: ExportStats,
}

impl<'a, S: ConnectivitySearch> ExportRun<'a, S> {
    fn document(&mut self) -> SExp {
        let board = self.board;
        let mut items = vec![SExp::atom("kicad_pcb")];

        let header = Header {
            version: self.options.format_version,
            generator: self.options.generator.clone(),
            generator_version: self.options.generator_version.clone(),
            thickness: self.options.board_thickness,
        };
        items.extend(header.to_sexp());
        items.push(
            Paper {
                width: to_mm(board.width),
                height: to_mm(board.height),
            }
            .to_sexp(),
        );
        items.push(layer_table());

        let nets = self.resolver.table().nets();
        self.stats.nets = nets.len();
        items.extend(nets.iter().map(net_def));

        for (f, footprint) in board.footprints.iter().enumerate() {
            items.push(self.footprint(f, footprint).to_sexp());
        }

        for (v, via) in board.vias.iter().enumerate() {
            items.push(self.via(v, via).to_sexp());
        }

        for (l, layer) in board.layers.iter().enumerate() {
            match kicad_layer(layer) {
                Some(LayerTarget::Copper(name)) => self.copper_layer(l, layer, &name, &mut items),
                Some(LayerTarget::Graphic(name)) => self.graphic_layer(layer, &name, &mut items),
                None => {
                    tracing::warn!(
                        "Unsupported layer {} ({:?}, {:?}), skipping",
                        layer.name,
                        layer.kind,
                        layer.side
                    );
                    self.stats.skipped_layers += 1;
                }
            }
        }

        SExp::List(items)
    }

    fn net_of(&mut self, id: PrimitiveId, node_name: Option<&str>) -> Net {
        self.resolver.resolve(id, node_name).clone()
    }

    fn footprint(&mut self, f: usize, footprint: &Footprint) -> FootprintRecord {
        let rotation = infer_rotation(footprint);
        let placement = Placement::new(footprint.mark, rotation, footprint.side);
        let layers = side_layers(footprint.side);
        let uuid = self.ids.next_id();
        tracing::debug!(
            "Footprint {} at {:?} rotated {}",
            footprint.reference(),
            footprint.mark,
            rotation
        );

        let properties = self.properties(footprint, &placement, &layers);

        let pins = footprint
            .pins
            .iter()
            .enumerate()
            .map(|(p, pin)| self.pin(f, p, footprint, pin, &placement))
            .collect::<Vec<_>>();

        let mut pads = pins;
        for (p, pad) in footprint.pads.iter().enumerate() {
            if pad.thickness <= 0 {
                tracing::debug!(
                    "Skipping zero-thickness pad {} on {}",
                    pad.number,
                    footprint.reference()
                );
                continue;
            }
            let node = footprint.node_name(&pad.number);
            let net = self.net_of(PrimitiveId::Pad { footprint: f, pad: p }, Some(&node));
            let thickness = to_mm(pad.thickness);
            let slot = slot_shape(
                placement.to_local(pad.point1),
                placement.to_local(pad.point2),
                thickness,
                rotation,
            );
            let mut pad_layers = vec![layers.copper.to_string()];
            if !pad.nopaste {
                pad_layers.push(layers.paste.to_string());
            }
            pad_layers.push(layers.mask.to_string());

            pads.push(PadRecord {
                number: pad.number.clone(),
                kind: PadKind::Smd,
                form: match pad.shape {
                    PadShape::Round => PadForm::Oval,
                    PadShape::Square => PadForm::Rect,
                    PadShape::Octagon => PadForm::Octagon,
                },
                at: slot.center,
                angle: Some(slot.angle),
                size: (slot.width, slot.height),
                drill: None,
                layers: pad_layers,
                solder_mask_margin: (to_mm(pad.mask) - thickness) / 2.0,
                clearance: to_mm(pad.clearance) / 2.0,
                thermal: None,
                net,
                uuid: self.ids.next_id(),
            });
        }
        self.stats.pads += pads.len();

        let lines = footprint
            .lines
            .iter()
            .map(|line| GraphicLine {
                tag: "fp_line",
                start: placement.to_local(line.point1),
                end: placement.to_local(line.point2),
                width: to_mm(line.thickness),
                stroke: StrokeType::Default,
                layer: layers.silk.to_string(),
                uuid: self.ids.next_id(),
            })
            .collect();

        let arcs = footprint
            .arcs
            .iter()
            .map(|arc| {
                let (center, end, angle) = arc_geometry(arc);
                GraphicArc {
                    tag: "fp_arc",
                    center: placement.local_mm(center),
                    end: placement.local_mm(end),
                    angle,
                    width: to_mm(arc.thickness),
                    stroke: StrokeType::Default,
                    layer: layers.silk.to_string(),
                    uuid: self.ids.next_id(),
                }
            })
            .collect();

        self.stats.footprints += 1;
        FootprintRecord {
            library_name: format!("{}:{}", self.options.library_prefix, footprint.description()),
            layer: layers.copper.to_string(),
            uuid,
            at: point_to_mm(footprint.mark),
            rotation,
            properties,
            pads,
            lines,
            arcs,
        }
    }

    fn properties(
        &mut self,
        footprint: &Footprint,
        placement: &Placement,
        layers: &SideLayers,
    ) -> Vec<Property> {
        let back = footprint.side == Side::Back;
        let local = |field: TextField| {
            let text = footprint.text(field);
            placement.to_local(Point::new(text.x, text.y))
        };

        let reference = footprint.text(TextField::Reference);
        let reference_angle = if back {
            180 - reference.angle()
        } else {
            reference.angle()
        };
        let value = footprint.text(TextField::Value);
        let description = footprint.text(TextField::Description);

        vec![
            Property {
                name: "Reference",
                value: reference.string.clone(),
                at: local(TextField::Reference),
                angle: reference_angle,
                unlocked: true,
                layer: layers.silk.to_string(),
                hidden: footprint.hide_name,
                uuid: self.ids.next_id(),
                effects: Effects::silk(back),
            },
            Property {
                name: "Value",
                value: value.string.clone(),
                at: local(TextField::Value),
                angle: value.angle(),
                unlocked: false,
                layer: layers.fab.to_string(),
                hidden: true,
                uuid: self.ids.next_id(),
                effects: Effects::fab(),
            },
            Property {
                name: "Footprint",
                value: format!("{}:{}", self.options.library_prefix, description.string),
                at: local(TextField::Description),
                angle: description.angle(),
                unlocked: false,
                layer: layers.fab.to_string(),
                hidden: true,
                uuid: self.ids.next_id(),
                effects: Effects::fab(),
            },
        ]
    }

    fn pin(
        &mut self,
        f: usize,
        p: usize,
        footprint: &Footprint,
        pin: &Pin,
        placement: &Placement,
    ) -> PadRecord {
        let node = footprint.node_name(&pin.number);
        let net = self.net_of(PrimitiveId::Pin { footprint: f, pin: p }, Some(&node));
        let thickness = to_mm(pin.thickness);
        let clearance = to_mm(pin.clearance);

        PadRecord {
            number: pin.number.clone(),
            kind: if pin.hole {
                PadKind::NpThruHole
            } else {
                PadKind::ThruHole
            },
            form: match pin.shape {
                PadShape::Round => PadForm::Circle,
                PadShape::Square => PadForm::Rect,
                PadShape::Octagon => PadForm::Octagon,
            },
            at: placement.to_local(pin.position()),
            angle: None,
            size: (thickness, thickness),
            drill: Some(to_mm(pin.drill)),
            layers: vec!["*.Cu".to_string(), "*.Mask".to_string()],
            solder_mask_margin: (to_mm(pin.mask) - thickness) / 2.0,
            clearance: clearance / 2.0,
            thermal: pin.thermal.map(|style| Thermal {
                zone_connect: if style == ThermalStyle::Solid { 2 } else { 1 },
                gap: clearance / 2.0,
            }),
            net,
            uuid: self.ids.next_id(),
        }
    }

    fn via(&mut self, v: usize, via: &Via) -> ViaRecord {
        let net = self.net_of(PrimitiveId::Via(v), None);
        self.stats.vias += 1;
        ViaRecord {
            at: point_to_mm(Point::new(via.x, via.y)),
            size: to_mm(via.thickness),
            drill: to_mm(via.drill),
            net: net.id,
            uuid: self.ids.next_id(),
        }
    }

    fn copper_layer(&mut self, l: usize, layer: &Layer, name: &str, items: &mut Vec<SExp>) {
        for (i, line) in layer.lines.iter().enumerate() {
            let net = self.net_of(PrimitiveId::Line { layer: l, line: i }, None);
            items.push(
                Segment {
                    start: point_to_mm(line.point1),
                    end: point_to_mm(line.point2),
                    width: to_mm(line.thickness),
                    layer: name.to_string(),
                    net: net.id,
                    uuid: self.ids.next_id(),
                }
                .to_sexp(),
            );
            self.stats.tracks += 1;
        }

        for (i, arc) in layer.arcs.iter().enumerate() {
            let net = self.net_of(PrimitiveId::Arc { layer: l, arc: i }, None);
            let (center, end, angle) = arc_geometry(arc);
            items.push(
                TrackArc {
                    center,
                    end,
                    angle,
                    width: to_mm(arc.thickness),
                    layer: name.to_string(),
                    net: net.id,
                    uuid: self.ids.next_id(),
                }
                .to_sexp(),
            );
            self.stats.tracks += 1;
        }

        for (i, polygon) in layer.polygons.iter().enumerate() {
            let net = self.net_of(PrimitiveId::Polygon { layer: l, polygon: i }, None);
            for zone in emit_polygon(polygon, &net, name, &self.zone_options, &mut *self.ids) {
                if zone.is_keepout() {
                    self.stats.keepouts += 1;
                } else {
                    self.stats.zones += 1;
                }
                items.push(zone.to_sexp());
            }
        }

        if !layer.texts.is_empty() {
            tracing::debug!("Ignoring {} texts on copper layer {}", layer.texts.len(), layer.name);
        }
    }

    fn graphic_layer(&mut self, layer: &Layer, name: &str, items: &mut Vec<SExp>) {
        for line in &layer.lines {
            items.push(
                GraphicLine {
                    tag: "gr_line",
                    start: point_to_mm(line.point1),
                    end: point_to_mm(line.point2),
                    width: to_mm(line.thickness),
                    stroke: StrokeType::Solid,
                    layer: name.to_string(),
                    uuid: self.ids.next_id(),
                }
                .to_sexp(),
            );
            self.stats.graphics += 1;
        }

        for arc in &layer.arcs {
            let (center, end, angle) = arc_geometry(arc);
            items.push(
                GraphicArc {
                    tag: "gr_arc",
                    center,
                    end,
                    angle,
                    width: to_mm(arc.thickness),
                    stroke: StrokeType::Solid,
                    layer: name.to_string(),
                    uuid: self.ids.next_id(),
                }
                .to_sexp(),
            );
            self.stats.graphics += 1;
        }

        for text in &layer.texts {
            let angle = if text.mirrored {
                180 - text.angle()
            } else {
                text.angle()
            };
            items.push(
                TextRecord {
                    text: text.string.clone(),
                    at: point_to_mm(Point::new(text.x, text.y)),
                    angle,
                    layer: name.to_string(),
                    uuid: self.ids.next_id(),
                    effects: Effects::scaled(text.scale, text.mirrored),
                }
                .to_sexp(),
            );
            self.stats.texts += 1;
        }

        if !layer.polygons.is_empty() {
            tracing::debug!(
                "Ignoring {} polygons on non-copper layer {}",
                layer.polygons.len(),
                layer.name
            );
        }
    }
}
