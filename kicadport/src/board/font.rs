//! Stroke font metrics used for text bounding boxes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::model::Coord;

/// Metrics of a single glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub width: Coord,
    pub height: Coord,
    /// Advance added after the glyph
    pub delta: Coord,
}

/// Glyph table plus the fallback cell for unmapped characters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub symbols: HashMap<char, Symbol>,
    pub default_width: Coord,
    pub default_height: Coord,
}

// 60 mil cell of the classic gEDA default font
const DEFAULT_CELL: Coord = 1_524_000;
const DEFAULT_DELTA: Coord = 304_800;

impl Default for Font {
    fn default() -> Self {
        Self {
            symbols: HashMap::new(),
            default_width: DEFAULT_CELL,
            default_height: DEFAULT_CELL,
        }
    }
}

impl Font {
    /// Monospaced font with every printable ASCII glyph mapped to one cell.
    pub fn monospace(width: Coord, height: Coord, delta: Coord) -> Self {
        let symbols = (' '..='~')
            .map(|c| {
                (
                    c,
                    Symbol {
                        width,
                        height,
                        delta,
                    },
                )
            })
            .collect();
        Self {
            symbols,
            default_width: width,
            default_height: height,
        }
    }

    pub fn symbol(&self, c: char) -> Option<&Symbol> {
        self.symbols.get(&c)
    }

    /// Unscaled extent of a string: summed advances and tallest glyph.
    pub fn measure(&self, s: &str) -> (Coord, Coord) {
        let mut width = 0;
        let mut height = 0;
        for c in s.chars() {
            match self.symbol(c) {
                Some(sym) => {
                    width += sym.width + sym.delta;
                    height = height.max(sym.height);
                }
                None => {
                    width += self.default_width * 6 / 5;
                    height = self.default_height;
                }
            }
        }
        (width, height)
    }
}

/// Default gEDA-like metrics for boards that ship no font table.
pub fn builtin_font() -> Font {
    Font::monospace(DEFAULT_CELL - DEFAULT_DELTA, DEFAULT_CELL, DEFAULT_DELTA)
}
