//! KiCad `.kicad_pcb` writer.

pub mod exporter;
pub mod ids;
pub mod layers;
pub mod records;
pub mod sexp;
pub mod zone;

pub use exporter::{ExportStats, KicadExporter};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use sexp::{fmt_mm, ParseError, SExp, SExpParser};
pub use zone::{emit_polygon, ZoneOptions};
