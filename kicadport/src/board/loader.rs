//! Board Loader
//!
//! Reads a board layout from its JSON interchange form. Every geometric
//! value is given in nanometres; optional fields fall back to the model
//! defaults.

use std::path::Path;

use thiserror::Error;

use super::model::Board;

#[derive(Debug, Error)]
pub enum BoardLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid board document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid board: {0}")]
    InvalidBoard(String),
}

/// Loader for board layout documents
pub struct BoardLoader;

impl BoardLoader {
    /// Load a board from a file
    pub fn load(path: &Path) -> Result<Board, BoardLoadError> {
        let content = std::fs::read_to_string(path)?;
        let mut board = Self::load_str(&content)?;
        if board.name.is_empty() {
            board.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
        }
        Ok(board)
    }

    /// Load a board from an in-memory document
    pub fn load_str(content: &str) -> Result<Board, BoardLoadError> {
        let board: Board = serde_json::from_str(content)?;
        Self::check(&board)?;

        tracing::debug!(
            "Loaded board '{}': {} layers, {} footprints, {} vias, {} nets",
            board.name,
            board.layers.len(),
            board.footprints.len(),
            board.vias.len(),
            board.netlist.len()
        );
        Ok(board)
    }

    fn check(board: &Board) -> Result<(), BoardLoadError> {
        if board.width < 0 || board.height < 0 {
            return Err(BoardLoadError::InvalidBoard(format!(
                "negative board size {}x{}",
                board.width, board.height
            )));
        }
        for (i, footprint) in board.footprints.iter().enumerate() {
            if let Some(text) = footprint.texts.iter().find(|t| t.direction > 3) {
                return Err(BoardLoadError::InvalidBoard(format!(
                    "footprint {} ({}) has text direction {}",
                    i,
                    footprint.reference(),
                    text.direction
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{LayerKind, LayerSide, Side};

    #[test]
    fn test_load_minimal_board() {
        let board = BoardLoader::load_str(r#"{ "width": 1000, "height": 2000 }"#).unwrap();
        assert_eq!(board.width, 1000);
        assert!(board.is_empty());
        // documents without a font table get the builtin metrics
        assert!(!board.font.symbols.is_empty());
    }

    #[test]
    fn test_load_layers_and_footprint() {
        let json = r#"{
            "layers": [
                { "name": "top", "kind": "copper", "side": "top", "group": 0 },
                { "name": "silk", "kind": "silk", "side": "bottom", "group": 3 }
            ],
            "footprints": [{
                "mark": { "x": 5, "y": 6 },
                "side": "back",
                "texts": [
                    { "string": "0805" },
                    { "string": "C3", "scale": 80 },
                    { "string": "100n" }
                ],
                "pads": [{ "number": "1", "point1": {"x": 0, "y": 0}, "point2": {"x": 10, "y": 0}, "thickness": 4 }]
            }]
        }"#;
        let board = BoardLoader::load_str(json).unwrap();
        assert_eq!(board.layers[1].kind, LayerKind::Silk);
        assert_eq!(board.layers[1].side, LayerSide::Bottom);
        let fp = &board.footprints[0];
        assert_eq!(fp.side, Side::Back);
        assert_eq!(fp.reference(), "C3");
        assert_eq!(fp.texts[1].scale, 80);
        assert_eq!(fp.texts[0].scale, 100);
        assert_eq!(fp.pads[0].thickness, 4);
    }

    #[test]
    fn test_rejects_bad_text_direction() {
        let json = r#"{ "footprints": [{ "texts": [{}, { "direction": 7 }, {}] }] }"#;
        assert!(matches!(
            BoardLoader::load_str(json),
            Err(BoardLoadError::InvalidBoard(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            BoardLoader::load_str("{ not json"),
            Err(BoardLoadError::Json(_))
        ));
    }
}
