//! Core export logic shared by the library API and the CLI.
//! No terminal or process dependencies.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::board::{Board, BoardLoadError, BoardLoader, Side};
use crate::geometry::bbox::{board_box, BoundingBox};
use crate::geometry::orientation::infer_rotation;
use crate::kicad::{ExportStats, IdGenerator, KicadExporter, RandomIds};
use crate::nets::CopperGraph;

#[derive(Debug, thiserror::Error)]
pub enum KicadPortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Load error: {0}")]
    Load(#[from] BoardLoadError),
    #[error("Cannot replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options for export runs (library or CLI).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub generator: String,
    pub generator_version: String,
    /// `(version ...)` of the written document
    pub format_version: u32,
    /// Board thickness in millimetres
    pub board_thickness: f64,
    /// Library nickname prefixed to footprint names
    pub library_prefix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            generator: "kicadport".to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            format_version: 20240108,
            board_thickness: 1.6,
            library_prefix: "geda".to_string(),
        }
    }
}

/// Result of exporting one file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes: usize,
    pub stats: ExportStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct FootprintSummary {
    pub reference: String,
    pub description: String,
    pub side: Side,
    pub rotation: f64,
}

/// Summary of a board without exporting it.
#[derive(Debug, Clone, Serialize)]
pub struct BoardReport {
    pub name: String,
    pub bounding_box: Option<BoundingBox>,
    pub layers: usize,
    pub vias: usize,
    pub nets: usize,
    pub copper_primitives: usize,
    pub copper_clusters: usize,
    pub footprints: Vec<FootprintSummary>,
}

/// `board.json` → `board.kicad_pcb`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("kicad_pcb")
}

/// Core export API used by both the library and the CLI.
pub struct KicadPortCore;

impl KicadPortCore {
    /// Load a board, export it and write the result atomically.
    pub fn export_file(
        input: &Path,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<ExportReport, KicadPortError> {
        Self::export_file_with_ids(input, output, options, RandomIds)
    }

    /// Same as `export_file` with a caller-chosen identifier source.
    pub fn export_file_with_ids<I: IdGenerator>(
        input: &Path,
        output: &Path,
        options: &ExportOptions,
        ids: I,
    ) -> Result<ExportReport, KicadPortError> {
        let board = BoardLoader::load(input)?;
        let mut exporter = KicadExporter::with_ids(options.clone(), ids);
        let document = exporter.export(&board);

        write_atomically(output, document.as_bytes())?;
        tracing::info!("Wrote {} ({} bytes)", output.display(), document.len());

        Ok(ExportReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            bytes: document.len(),
            stats: exporter.stats().clone(),
        })
    }

    /// Export an in-memory board to a string.
    pub fn export_board(board: &Board, options: &ExportOptions) -> String {
        KicadExporter::new(options.clone()).export(board)
    }

    /// Load a board and summarise it.
    pub fn inspect(input: &Path) -> Result<BoardReport, KicadPortError> {
        let board = BoardLoader::load(input)?;
        Ok(Self::inspect_board(&board))
    }

    pub fn inspect_board(board: &Board) -> BoardReport {
        let graph = CopperGraph::new(board);
        BoardReport {
            name: board.name.clone(),
            bounding_box: board_box(board),
            layers: board.layers.len(),
            vias: board.vias.len(),
            nets: board.netlist.len(),
            copper_primitives: graph.primitive_count(),
            copper_clusters: graph.cluster_count(),
            footprints: board
                .footprints
                .iter()
                .map(|f| FootprintSummary {
                    reference: f.reference().to_string(),
                    description: f.description().to_string(),
                    side: f.side,
                    rotation: infer_rotation(f),
                })
                .collect(),
        }
    }
}

/// Write through a temporary file in the destination directory, then
/// rename it over `path`.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), KicadPortError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(path).map_err(|e| KicadPortError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_swaps_extension() {
        assert_eq!(
            default_output_path(Path::new("boards/demo.json")),
            PathBuf::from("boards/demo.kicad_pcb")
        );
        assert_eq!(
            default_output_path(Path::new("demo")),
            PathBuf::from("demo.kicad_pcb")
        );
    }

    #[test]
    fn test_default_options() {
        let options = ExportOptions::default();
        assert_eq!(options.generator, "kicadport");
        assert_eq!(options.format_version, 20240108);
        assert_eq!(options.board_thickness, 1.6);
        assert_eq!(options.library_prefix, "geda");
    }

    #[test]
    fn test_write_atomically_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.kicad_pcb");
        std::fs::write(&path, "old").unwrap();
        write_atomically(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.kicad_pcb");
        assert!(matches!(
            write_atomically(&path, b"x"),
            Err(KicadPortError::Io(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_inspect_missing_file_is_load_error() {
        let err = KicadPortCore::inspect(Path::new("/nonexistent/board.json")).unwrap_err();
        assert!(matches!(err, KicadPortError::Load(BoardLoadError::Io(_))));
    }
}
