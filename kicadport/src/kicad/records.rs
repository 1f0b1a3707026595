//! Typed KiCad records.
//!
//! Each record is a plain struct holding millimetre values and resolved
//! names; `to_sexp` is the only place that knows the token layout.

use crate::board::Arc;
use crate::geometry::transform::{to_mm, Rotation};
use crate::nets::Net;

use super::sexp::SExp;

/// Chamfer ratio KiCad needs to draw a square pad as an octagon
pub const OCTAGON_CHAMFER_RATIO: f64 = 0.29365;

fn uuid(id: &str) -> SExp {
    SExp::pair("uuid", SExp::string(id))
}

fn layer(name: &str) -> SExp {
    SExp::pair("layer", SExp::string(name))
}

fn yes_no(flag: bool) -> SExp {
    SExp::atom(if flag { "yes" } else { "no" })
}

/// `(at x y angle)`
fn at_angle((x, y): (f64, f64), angle: SExp) -> SExp {
    SExp::list("at", vec![SExp::number(x), SExp::number(y), angle])
}

/// Document preamble: version, generator and general settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: u32,
    pub generator: String,
    pub generator_version: String,
    pub thickness: f64,
}

impl Header {
    pub fn to_sexp(&self) -> Vec<SExp> {
        vec![
            SExp::pair("version", SExp::integer(i64::from(self.version))),
            SExp::pair("generator", SExp::string(&self.generator)),
            SExp::pair("generator_version", SExp::string(&self.generator_version)),
            SExp::list(
                "general",
                vec![SExp::pair("thickness", SExp::number(self.thickness))],
            ),
        ]
    }
}

/// User-sized page in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paper {
    pub width: f64,
    pub height: f64,
}

impl Paper {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            "paper",
            vec![
                SExp::string("User"),
                SExp::number(self.width),
                SExp::number(self.height),
            ],
        )
    }
}

/// `(net id "name")` row of the net table
pub fn net_def(net: &Net) -> SExp {
    SExp::list(
        "net",
        vec![SExp::integer(i64::from(net.id)), SExp::string(&net.name)],
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    /// Font height and width
    pub size: (f64, f64),
    pub thickness: f64,
    /// Emit `(justify left top)`
    pub justify: bool,
    pub mirror: bool,
}

impl Effects {
    /// Silkscreen text: 1 × 0.8 mm, left-top justified
    pub fn silk(mirror: bool) -> Self {
        Self {
            size: (1.0, 0.8),
            thickness: 0.18,
            justify: true,
            mirror,
        }
    }

    /// Hidden fabrication properties
    pub fn fab() -> Self {
        Self {
            size: (1.0, 1.0),
            thickness: 0.1,
            justify: false,
            mirror: false,
        }
    }

    /// Board text at `scale` percent of the nominal size.
    pub fn scaled(scale: u32, mirror: bool) -> Self {
        let s = f64::from(scale) / 100.0;
        Self {
            size: (s, 0.8 * s),
            thickness: 0.18,
            justify: true,
            mirror,
        }
    }

    pub fn to_sexp(&self) -> SExp {
        let mut children = vec![SExp::list(
            "font",
            vec![
                SExp::point("size", self.size),
                SExp::pair("thickness", SExp::number(self.thickness)),
            ],
        )];
        if self.justify {
            let mut justify = vec![SExp::atom("left"), SExp::atom("top")];
            if self.mirror {
                justify.push(SExp::atom("mirror"));
            }
            children.push(SExp::list("justify", justify));
        }
        SExp::list("effects", children)
    }
}

/// Footprint property (`Reference`, `Value`, `Footprint`)
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub value: String,
    pub at: (f64, f64),
    pub angle: i32,
    pub unlocked: bool,
    pub layer: String,
    pub hidden: bool,
    pub uuid: String,
    pub effects: Effects,
}

impl Property {
    pub fn to_sexp(&self) -> SExp {
        let mut children = vec![
            SExp::string(&self.value),
            at_angle(self.at, SExp::integer(i64::from(self.angle))),
        ];
        if self.unlocked {
            children.push(SExp::pair("unlocked", yes_no(true)));
        }
        children.push(layer(&self.layer));
        children.push(SExp::pair("hide", yes_no(self.hidden)));
        children.push(uuid(&self.uuid));
        children.push(self.effects.to_sexp());

        let mut items = vec![SExp::atom("property"), SExp::string(self.name)];
        items.extend(children);
        SExp::List(items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    ThruHole,
    NpThruHole,
    Smd,
}

impl PadKind {
    fn as_str(self) -> &'static str {
        match self {
            PadKind::ThruHole => "thru_hole",
            PadKind::NpThruHole => "np_thru_hole",
            PadKind::Smd => "smd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadForm {
    Circle,
    Oval,
    Rect,
    /// Rectangle with all four corners chamfered
    Octagon,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermal {
    /// 2 = solid, 1 = thermal relief
    pub zone_connect: u8,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PadRecord {
    pub number: String,
    pub kind: PadKind,
    pub form: PadForm,
    pub at: (f64, f64),
    /// Only SMD pads carry an angle
    pub angle: Option<f64>,
    pub size: (f64, f64),
    pub drill: Option<f64>,
    pub layers: Vec<String>,
    pub solder_mask_margin: f64,
    pub clearance: f64,
    pub thermal: Option<Thermal>,
    pub net: Net,
    pub uuid: String,
}

impl PadRecord {
    pub fn to_sexp(&self) -> SExp {
        let shape = match self.form {
            PadForm::Circle => "circle",
            PadForm::Oval => "oval",
            PadForm::Rect | PadForm::Octagon => "rect",
        };
        let mut items = vec![
            SExp::atom("pad"),
            SExp::string(&self.number),
            SExp::atom(self.kind.as_str()),
            SExp::atom(shape),
        ];
        if self.form == PadForm::Octagon {
            items.push(SExp::pair("chamfer_ratio", SExp::number(OCTAGON_CHAMFER_RATIO)));
            items.push(SExp::list(
                "chamfer",
                ["top_left", "top_right", "bottom_left", "bottom_right"]
                    .into_iter()
                    .map(SExp::atom)
                    .collect(),
            ));
        }
        items.push(match self.angle {
            Some(angle) => at_angle(self.at, SExp::number(angle)),
            None => SExp::point("at", self.at),
        });
        items.push(SExp::point("size", self.size));
        if let Some(drill) = self.drill {
            items.push(SExp::pair("drill", SExp::number(drill)));
        }
        items.push(SExp::list(
            "layers",
            self.layers.iter().map(SExp::string).collect(),
        ));
        items.push(SExp::pair("solder_mask_margin", SExp::number(self.solder_mask_margin)));
        items.push(SExp::pair("clearance", SExp::number(self.clearance)));
        if let Some(thermal) = self.thermal {
            items.push(SExp::pair("zone_connect", SExp::integer(i64::from(thermal.zone_connect))));
            items.push(SExp::pair("thermal_gap", SExp::number(thermal.gap)));
        }
        items.push(net_def(&self.net));
        items.push(uuid(&self.uuid));
        SExp::List(items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeType {
    Default,
    Solid,
}

fn stroke(width: f64, kind: StrokeType) -> SExp {
    let kind = match kind {
        StrokeType::Default => "default",
        StrokeType::Solid => "solid",
    };
    SExp::list(
        "stroke",
        vec![
            SExp::pair("width", SExp::number(width)),
            SExp::pair("type", SExp::atom(kind)),
        ],
    )
}

/// `fp_line` / `gr_line`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicLine {
    pub tag: &'static str,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub width: f64,
    pub stroke: StrokeType,
    pub layer: String,
    pub uuid: String,
}

impl GraphicLine {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            self.tag,
            vec![
                SExp::point("start", self.start),
                SExp::point("end", self.end),
                stroke(self.width, self.stroke),
                layer(&self.layer),
                uuid(&self.uuid),
            ],
        )
    }
}

/// Centre, end point (both mm) and sweep of an arc written as a
/// circular arc of radius `(width + height) / 2`.
pub fn arc_geometry(arc: &Arc) -> ((f64, f64), (f64, f64), f64) {
    let center = (to_mm(arc.x), to_mm(arc.y));
    let radius = (to_mm(arc.width) + to_mm(arc.height)) / 2.0;
    let r = Rotation::from_degrees(arc.start_angle + arc.delta);
    let end = (center.0 - radius * r.cos, center.1 + radius * r.sin);
    (center, end, arc.delta)
}

/// `fp_arc` / `gr_arc`, centre-end-angle form
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicArc {
    pub tag: &'static str,
    pub center: (f64, f64),
    pub end: (f64, f64),
    pub angle: f64,
    pub width: f64,
    pub stroke: StrokeType,
    pub layer: String,
    pub uuid: String,
}

impl GraphicArc {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            self.tag,
            vec![
                SExp::point("start", self.center),
                SExp::point("end", self.end),
                SExp::pair("angle", SExp::number(self.angle)),
                stroke(self.width, self.stroke),
                layer(&self.layer),
                uuid(&self.uuid),
            ],
        )
    }
}

/// Copper track
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub width: f64,
    pub layer: String,
    pub net: u32,
    pub uuid: String,
}

impl Segment {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            "segment",
            vec![
                SExp::point("start", self.start),
                SExp::point("end", self.end),
                SExp::pair("width", SExp::number(self.width)),
                layer(&self.layer),
                SExp::pair("net", SExp::integer(i64::from(self.net))),
                uuid(&self.uuid),
            ],
        )
    }
}

/// Copper arc track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackArc {
    pub center: (f64, f64),
    pub end: (f64, f64),
    pub angle: f64,
    pub width: f64,
    pub layer: String,
    pub net: u32,
    pub uuid: String,
}

impl TrackArc {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            "arc",
            vec![
                SExp::point("start", self.center),
                SExp::point("end", self.end),
                SExp::pair("angle", SExp::number(self.angle)),
                SExp::pair("width", SExp::number(self.width)),
                layer(&self.layer),
                SExp::pair("net", SExp::integer(i64::from(self.net))),
                uuid(&self.uuid),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViaRecord {
    pub at: (f64, f64),
    pub size: f64,
    pub drill: f64,
    pub net: u32,
    pub uuid: String,
}

impl ViaRecord {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            "via",
            vec![
                SExp::point("at", self.at),
                SExp::pair("size", SExp::number(self.size)),
                SExp::pair("drill", SExp::number(self.drill)),
                SExp::list("layers", vec![SExp::string("F.Cu"), SExp::string("B.Cu")]),
                SExp::pair("net", SExp::integer(i64::from(self.net))),
                uuid(&self.uuid),
            ],
        )
    }
}

/// Free board text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRecord {
    pub text: String,
    pub at: (f64, f64),
    pub angle: i32,
    pub layer: String,
    pub uuid: String,
    pub effects: Effects,
}

impl TextRecord {
    pub fn to_sexp(&self) -> SExp {
        SExp::list(
            "gr_text",
            vec![
                SExp::string(&self.text),
                at_angle(self.at, SExp::integer(i64::from(self.angle))),
                layer(&self.layer),
                uuid(&self.uuid),
                self.effects.to_sexp(),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneFill {
    /// Copper pour; mode 2 keeps islands above `island_area_min` (mm²),
    /// mode 0 keeps every island
    Filled {
        island_removal_mode: u8,
        island_area_min: f64,
    },
    /// Rule area forbidding copper pour
    Keepout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRecord {
    pub net: u32,
    pub net_name: String,
    pub layer: String,
    pub uuid: String,
    pub fill: ZoneFill,
    pub points: Vec<(f64, f64)>,
}

impl ZoneRecord {
    pub fn is_keepout(&self) -> bool {
        self.fill == ZoneFill::Keepout
    }

    pub fn to_sexp(&self) -> SExp {
        let mut children = vec![
            SExp::pair("net", SExp::integer(i64::from(self.net))),
            SExp::pair("net_name", SExp::string(&self.net_name)),
            layer(&self.layer),
            uuid(&self.uuid),
            SExp::list("hatch", vec![SExp::atom("edge"), SExp::number(0.508)]),
            SExp::list(
                "connect_pads",
                vec![SExp::atom("no"), SExp::pair("clearance", SExp::number(0.25))],
            ),
            SExp::pair("min_thickness", SExp::number(0.1)),
        ];

        match self.fill {
            ZoneFill::Filled {
                island_removal_mode,
                island_area_min,
            } => children.push(SExp::list(
                "fill",
                vec![
                    SExp::atom("yes"),
                    SExp::pair("island_removal_mode", SExp::integer(i64::from(island_removal_mode))),
                    SExp::pair("island_area_min", SExp::number(island_area_min)),
                ],
            )),
            ZoneFill::Keepout => {
                let rules = [
                    ("tracks", "allowed"),
                    ("vias", "allowed"),
                    ("pads", "allowed"),
                    ("copperpour", "not_allowed"),
                    ("footprints", "allowed"),
                ];
                children.push(SExp::list(
                    "keepout",
                    rules
                        .into_iter()
                        .map(|(k, v)| SExp::pair(k, SExp::atom(v)))
                        .collect(),
                ));
                children.push(SExp::pair("fill", SExp::atom("yes")));
            }
        }

        children.push(SExp::pair(
            "polygon",
            SExp::list(
                "pts",
                self.points.iter().map(|&p| SExp::point("xy", p)).collect(),
            ),
        ));
        SExp::list("zone", children)
    }
}

/// One placed footprint with everything it owns
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintRecord {
    pub library_name: String,
    pub layer: String,
    pub uuid: String,
    pub at: (f64, f64),
    pub rotation: f64,
    pub properties: Vec<Property>,
    pub pads: Vec<PadRecord>,
    pub lines: Vec<GraphicLine>,
    pub arcs: Vec<GraphicArc>,
}

impl FootprintRecord {
    pub fn to_sexp(&self) -> SExp {
        let mut children = vec![
            SExp::string(&self.library_name),
            layer(&self.layer),
            uuid(&self.uuid),
            at_angle(self.at, SExp::number(self.rotation)),
        ];
        children.extend(self.properties.iter().map(Property::to_sexp));
        children.extend(self.pads.iter().map(PadRecord::to_sexp));
        children.extend(self.lines.iter().map(GraphicLine::to_sexp));
        children.extend(self.arcs.iter().map(GraphicArc::to_sexp));
        SExp::list("footprint", children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(id: u32, name: &str) -> Net {
        Net {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_octagon_pin_has_chamfer_after_shape() {
        let pad = PadRecord {
            number: "1".to_string(),
            kind: PadKind::ThruHole,
            form: PadForm::Octagon,
            at: (0.0, 1.27),
            angle: None,
            size: (1.5, 1.5),
            drill: Some(0.8),
            layers: vec!["*.Cu".to_string(), "*.Mask".to_string()],
            solder_mask_margin: 0.05,
            clearance: 0.25,
            thermal: Some(Thermal {
                zone_connect: 2,
                gap: 0.25,
            }),
            net: net(1, "GND"),
            uuid: "u".to_string(),
        };
        let text = pad.to_sexp().to_string();
        assert!(text.starts_with(
            "(pad \"1\" thru_hole rect (chamfer_ratio 0.293650) (chamfer top_left top_right bottom_left bottom_right) (at 0.000000 1.270000)"
        ));
        assert!(text.contains("(drill 0.800000)"));
        assert!(text.contains("(zone_connect 2) (thermal_gap 0.250000)"));
        assert!(text.contains("(net 1 \"GND\")"));
    }

    #[test]
    fn test_keepout_zone_layout() {
        let zone = ZoneRecord {
            net: 0,
            net_name: String::new(),
            layer: "F.Cu".to_string(),
            uuid: "u".to_string(),
            fill: ZoneFill::Keepout,
            points: vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)],
        };
        let text = zone.to_sexp().to_string();
        assert!(text.contains("(net_name \"\")"));
        assert!(text.contains("(copperpour not_allowed)"));
        assert!(text.contains("(fill yes)"));
        assert!(!text.contains("island_removal_mode"));
        assert!(zone.is_keepout());
    }

    #[test]
    fn test_filled_zone_island_settings() {
        let zone = ZoneRecord {
            net: 3,
            net_name: "GND".to_string(),
            layer: "B.Cu".to_string(),
            uuid: "u".to_string(),
            fill: ZoneFill::Filled {
                island_removal_mode: 2,
                island_area_min: 0.5,
            },
            points: vec![],
        };
        let text = zone.to_sexp().to_string();
        assert!(text.contains("(fill yes (island_removal_mode 2) (island_area_min 0.500000))"));
    }

    #[test]
    fn test_arc_geometry_uses_mean_radius() {
        let arc = Arc {
            x: 1_000_000,
            y: 2_000_000,
            width: 1_000_000,
            height: 3_000_000,
            start_angle: 0.0,
            delta: 90.0,
            thickness: 0,
        };
        let (center, end, angle) = arc_geometry(&arc);
        assert_eq!(center, (1.0, 2.0));
        assert_eq!(end, (1.0, 4.0));
        assert_eq!(angle, 90.0);
    }

    #[test]
    fn test_mirrored_text_effects() {
        let text = Effects::scaled(200, true).to_sexp().to_string();
        assert_eq!(
            text,
            "(effects (font (size 2.000000 1.600000) (thickness 0.180000)) (justify left top mirror))"
        );
    }

    #[test]
    fn test_property_reference_layout() {
        let prop = Property {
            name: "Reference",
            value: "R1".to_string(),
            at: (0.5, -1.0),
            angle: 90,
            unlocked: true,
            layer: "F.SilkS".to_string(),
            hidden: false,
            uuid: "u".to_string(),
            effects: Effects::silk(false),
        };
        let text = prop.to_sexp().to_string();
        assert!(text.starts_with(
            "(property \"Reference\" \"R1\" (at 0.500000 -1.000000 90) (unlocked yes) (layer \"F.SilkS\") (hide no)"
        ));
    }
}
