//! kicadport CLI - export gEDA-style PCB layouts to KiCad from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use kicadport::geometry::to_mm;
use kicadport::{default_output_path, BoardReport, ExportOptions, KicadPortCore};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kicadport")]
#[command(about = "Export gEDA PCB layouts to KiCad .kicad_pcb files", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a board file to .kicad_pcb
    Export {
        /// Path to the board JSON file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output path (defaults to INPUT with a .kicad_pcb extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Generator name written to the header
        #[arg(long, value_name = "NAME")]
        generator: Option<String>,

        /// Board thickness in millimetres
        #[arg(long, value_name = "MM")]
        thickness: Option<f64>,
    },

    /// Summarise a board without exporting it
    Info {
        /// Path to the board JSON file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Export {
            input,
            output,
            generator,
            thickness,
        } => handle_export(&input, output, generator, thickness),
        Commands::Info { input, format } => handle_info(&input, format),
    };

    process::exit(exit_code);
}

/// Logs go to stderr so `info --format json` stays parseable. `RUST_LOG`
/// takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_export(
    input: &Path,
    output: Option<PathBuf>,
    generator: Option<String>,
    thickness: Option<f64>,
) -> i32 {
    let mut options = ExportOptions::default();
    if let Some(generator) = generator {
        options.generator = generator;
    }
    if let Some(thickness) = thickness {
        if !(thickness.is_finite() && thickness > 0.0) {
            eprintln!("Error: --thickness must be a positive number of millimetres");
            return 1;
        }
        options.board_thickness = thickness;
    }
    let output = output.unwrap_or_else(|| default_output_path(input));

    match KicadPortCore::export_file(input, &output, &options) {
        Ok(report) => {
            let stats = &report.stats;
            println!("Wrote {} ({} bytes)", report.output.display(), report.bytes);
            println!(
                "  {} nets, {} footprints, {} pads, {} vias, {} tracks, {} zones ({} keep-outs)",
                stats.nets,
                stats.footprints,
                stats.pads,
                stats.vias,
                stats.tracks,
                stats.zones,
                stats.keepouts
            );
            if stats.skipped_layers > 0 {
                println!("  {} layers skipped", stats.skipped_layers);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn handle_info(input: &Path, format: OutputFormat) -> i32 {
    match KicadPortCore::inspect(input) {
        Ok(report) => match format {
            OutputFormat::Human => {
                output_human(&report);
                0
            }
            OutputFormat::Json => match serde_json::to_string_pretty(&report) {
                Ok(json) => {
                    println!("{}", json);
                    0
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            },
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_human(report: &BoardReport) {
    let name = if report.name.is_empty() {
        "(unnamed)"
    } else {
        report.name.as_str()
    };
    println!("\nBoard: {}", name);
    println!("{}", "─".repeat(60));

    match &report.bounding_box {
        Some(bbox) => println!(
            "  Extent:   {:.3} x {:.3} mm",
            to_mm(bbox.width()),
            to_mm(bbox.height())
        ),
        None => println!("  Extent:   empty"),
    }
    println!("  Layers:   {}", report.layers);
    println!("  Vias:     {}", report.vias);
    println!("  Nets:     {}", report.nets);
    println!(
        "  Copper:   {} primitives in {} clusters",
        report.copper_primitives, report.copper_clusters
    );

    if report.footprints.is_empty() {
        println!("\n  No footprints");
        return;
    }
    println!("\n  Footprints:");
    for fp in &report.footprints {
        println!(
            "    {:<10} {:<20} {:?} {:>6.1}°",
            fp.reference, fp.description, fp.side, fp.rotation
        );
    }
}
