//! KiCad layer stack and source-layer naming.

use crate::board::{Layer, LayerKind, LayerSide, Side};

use super::sexp::SExp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    Signal,
    User,
}

impl LayerType {
    fn as_str(self) -> &'static str {
        match self {
            LayerType::Signal => "signal",
            LayerType::User => "user",
        }
    }
}

/// One row of the `(layers ...)` table
#[derive(Debug, Clone, Copy)]
pub struct LayerDef {
    pub id: u32,
    pub name: &'static str,
    pub kind: LayerType,
    pub user_name: Option<&'static str>,
}

const fn def(id: u32, name: &'static str, kind: LayerType) -> LayerDef {
    LayerDef {
        id,
        name,
        kind,
        user_name: None,
    }
}

pub const LAYER_TABLE: &[LayerDef] = &[
    def(0, "F.Cu", LayerType::Signal),
    def(1, "In1.Cu", LayerType::Signal),
    def(2, "In2.Cu", LayerType::Signal),
    def(31, "B.Cu", LayerType::Signal),
    def(32, "B.Adhes", LayerType::User),
    def(33, "F.Adhes", LayerType::User),
    def(34, "B.Paste", LayerType::User),
    def(35, "F.Paste", LayerType::User),
    def(36, "B.SilkS", LayerType::User),
    def(37, "F.SilkS", LayerType::User),
    def(38, "B.Mask", LayerType::User),
    def(39, "F.Mask", LayerType::User),
    def(40, "Dwgs.User", LayerType::User),
    def(41, "Cmts.User", LayerType::User),
    def(42, "Eco1.User", LayerType::User),
    def(43, "Eco2.User", LayerType::User),
    def(44, "Edge.Cuts", LayerType::User),
    def(45, "Margin", LayerType::User),
    LayerDef {
        id: 46,
        name: "B.CrtYd",
        kind: LayerType::User,
        user_name: Some("B.Courtyard"),
    },
    LayerDef {
        id: 47,
        name: "F.CrtYd",
        kind: LayerType::User,
        user_name: Some("F.Courtyard"),
    },
    def(48, "B.Fab", LayerType::User),
    def(49, "F.Fab", LayerType::User),
    def(50, "User.1", LayerType::User),
    def(51, "User.2", LayerType::User),
    def(52, "User.3", LayerType::User),
    def(53, "User.4", LayerType::User),
    def(54, "User.5", LayerType::User),
    def(55, "User.6", LayerType::User),
    def(56, "User.7", LayerType::User),
    def(57, "User.8", LayerType::User),
    def(58, "User.9", LayerType::User),
];

/// The `(layers ...)` block.
pub fn layer_table() -> SExp {
    SExp::list(
        "layers",
        LAYER_TABLE
            .iter()
            .map(|l| {
                let mut row = vec![
                    SExp::integer(i64::from(l.id)),
                    SExp::string(l.name),
                    SExp::atom(l.kind.as_str()),
                ];
                if let Some(user) = l.user_name {
                    row.push(SExp::string(user));
                }
                SExp::List(row)
            })
            .collect(),
    )
}

/// Where a source layer's primitives go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerTarget {
    /// Net-resolved tracks, arcs and zones
    Copper(String),
    /// Unconnected graphics and text
    Graphic(String),
}

impl LayerTarget {
    pub fn name(&self) -> &str {
        match self {
            LayerTarget::Copper(name) | LayerTarget::Graphic(name) => name,
        }
    }
}

/// KiCad destination of a source layer; `None` for unsupported layers.
pub fn kicad_layer(layer: &Layer) -> Option<LayerTarget> {
    let sided = |front: &str, back: &str| match layer.side {
        LayerSide::Top => Some(front.to_string()),
        LayerSide::Bottom => Some(back.to_string()),
        LayerSide::Internal => None,
    };

    match layer.kind {
        LayerKind::Copper => Some(match layer.side {
            LayerSide::Top => LayerTarget::Copper("F.Cu".to_string()),
            LayerSide::Bottom => LayerTarget::Copper("B.Cu".to_string()),
            LayerSide::Internal if layer.name == "outline" => {
                LayerTarget::Graphic("Edge.Cuts".to_string())
            }
            LayerSide::Internal => LayerTarget::Copper(format!("In{}.Cu", layer.group)),
        }),
        LayerKind::Outline => Some(LayerTarget::Graphic("Edge.Cuts".to_string())),
        LayerKind::Notes => Some(LayerTarget::Graphic("Cmts.User".to_string())),
        LayerKind::Silk => sided("F.SilkS", "B.SilkS").map(LayerTarget::Graphic),
        LayerKind::Mask => sided("F.Mask", "B.Mask").map(LayerTarget::Graphic),
        LayerKind::Paste => sided("F.Paste", "B.Paste").map(LayerTarget::Graphic),
        LayerKind::Fab => sided("F.Fab", "B.Fab").map(LayerTarget::Graphic),
        LayerKind::Other => None,
    }
}

/// Layer names used by a footprint placed on one side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideLayers {
    pub copper: &'static str,
    pub silk: &'static str,
    pub fab: &'static str,
    pub paste: &'static str,
    pub mask: &'static str,
}

pub fn side_layers(side: Side) -> SideLayers {
    match side {
        Side::Front => SideLayers {
            copper: "F.Cu",
            silk: "F.SilkS",
            fab: "F.Fab",
            paste: "F.Paste",
            mask: "F.Mask",
        },
        Side::Back => SideLayers {
            copper: "B.Cu",
            silk: "B.SilkS",
            fab: "B.Fab",
            paste: "B.Paste",
            mask: "B.Mask",
        },
    }
}
