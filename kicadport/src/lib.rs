//! kicadport - export gEDA-style PCB layouts to KiCad
//!
//! This library turns an in-memory board layout (footprints, pins, pads,
//! vias, copper and graphic layers, polygons with holes) into a KiCad
//! `.kicad_pcb` document. Footprint orientation is inferred from pin
//! geometry and copper is sorted into nets by a connectivity search.
//!
//! # Quick Start
//!
//! ```no_run
//! use kicadport::{ExportOptions, KicadPortCore};
//! use std::path::Path;
//!
//! let report = KicadPortCore::export_file(
//!     Path::new("board.json"),
//!     Path::new("board.kicad_pcb"),
//!     &ExportOptions::default(),
//! ).unwrap();
//!
//! println!("{} footprints written", report.stats.footprints);
//! ```
//!
//! # Features
//!
//! - **Orientation inference**: IPC-7351 style rotation from pin 1
//! - **Net resolution**: one connectivity search per copper cluster
//! - **Zones**: polygon holes become keep-out areas
//! - **Deterministic output**: pluggable identifier generators

pub mod board;
pub mod core;
pub mod geometry;
pub mod kicad;
pub mod nets;

// Re-export main types
pub use board::{Board, BoardLoadError, BoardLoader};
pub use core::{
    default_output_path, BoardReport, ExportOptions, ExportReport, FootprintSummary,
    KicadPortCore, KicadPortError,
};
pub use geometry::{bounding_box, board_box, infer_rotation, BoundingBox, ObjectRef};
pub use kicad::{ExportStats, IdGenerator, KicadExporter, RandomIds, SequentialIds};
pub use nets::{ConnectivitySearch, CopperGraph, Net, NetResolver, NetTable, PrimitiveId};

/// Load a board file (convenience wrapper).
pub fn load_board(path: &std::path::Path) -> Result<Board, KicadPortError> {
    BoardLoader::load(path).map_err(KicadPortError::from)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Board, BoardLoader, ExportOptions, ExportReport, KicadExporter, KicadPortCore,
        KicadPortError,
    };
}
