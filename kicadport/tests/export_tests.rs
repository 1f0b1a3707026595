//! End-to-end export tests for the kicadport library

use kicadport::kicad::{SExp, SExpParser};
use kicadport::prelude::*;
use kicadport::{BoardLoadError, SequentialIds};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn export_fixture(name: &str) -> (String, kicadport::ExportStats) {
    let board = BoardLoader::load(&fixture_path(name)).expect("fixture should load");
    let mut exporter = KicadExporter::with_ids(ExportOptions::default(), SequentialIds::new());
    let text = exporter.export(&board);
    (text, exporter.stats().clone())
}

fn parse(text: &str) -> SExp {
    SExpParser::new(text)
        .parse()
        .expect("exported document should parse")
}

/// Value of a single-valued child such as `(layer "F.Cu")`.
fn value<'a>(item: &'a SExp, key: &str) -> Option<&'a str> {
    item.get(key).and_then(SExp::as_atom)
}

#[test]
fn test_export_simple_board_counts() {
    let (_, stats) = export_fixture("simple_board.json");

    assert_eq!(stats.nets, 3, "no connection, GND, VCC");
    assert_eq!(stats.footprints, 2);
    assert_eq!(stats.pads, 4);
    assert_eq!(stats.vias, 1);
    assert_eq!(stats.tracks, 1);
    assert_eq!(stats.zones, 1);
    assert_eq!(stats.keepouts, 1);
    assert_eq!(stats.graphics, 5, "silk line plus four outline edges");
    assert_eq!(stats.texts, 1);
    assert_eq!(stats.skipped_layers, 0);
}

#[test]
fn test_export_simple_board_header() {
    let (text, _) = export_fixture("simple_board.json");
    let doc = parse(&text);

    assert_eq!(doc.head(), Some("kicad_pcb"));
    assert_eq!(value(&doc, "version"), Some("20240108"));
    assert_eq!(value(&doc, "generator"), Some("kicadport"));
    let names: Vec<String> = doc.get_all("net").iter().map(|n| n.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "(net 0 \"no connection\")",
            "(net 1 \"GND\")",
            "(net 2 \"VCC\")"
        ]
    );
}

#[test]
fn test_copper_cluster_shares_pin_net() {
    let (text, _) = export_fixture("simple_board.json");
    let doc = parse(&text);

    // R1-1 is GND; the track, via and pour touching it inherit the net
    let segment = doc.get_all("segment")[0];
    assert_eq!(value(segment, "net"), Some("1"));
    assert_eq!(value(segment, "layer"), Some("F.Cu"));

    let via = doc.get_all("via")[0];
    assert_eq!(value(via, "net"), Some("1"));

    let zones = doc.get_all("zone");
    assert_eq!(zones.len(), 2);
    assert_eq!(value(zones[0], "net"), Some("1"));
    assert_eq!(value(zones[0], "net_name"), Some("GND"));
    assert!(zones[0].get("keepout").is_none());
    assert_eq!(value(zones[0], "layer"), Some("B.Cu"));
}

#[test]
fn test_polygon_hole_becomes_keepout() {
    let (text, _) = export_fixture("simple_board.json");
    let doc = parse(&text);

    let keepout = doc.get_all("zone")[1];
    assert_eq!(value(keepout, "net"), Some("0"));
    assert_eq!(value(keepout, "net_name"), Some(""));
    let rules = keepout.get("keepout").expect("keep-out rules");
    assert_eq!(value(rules, "copperpour"), Some("not_allowed"));

    // (polygon (pts ...)) collapses to the pts list
    let pts = keepout.get("polygon").unwrap();
    assert_eq!(pts.head(), Some("pts"));
    let corners = pts.get_all("xy");
    assert_eq!(corners.len(), 4);
    assert_eq!(corners[0].to_string(), "(xy 20.000000 25.000000)");
}

#[test]
fn test_footprints_carry_nets_and_placement() {
    let (text, _) = export_fixture("simple_board.json");
    let doc = parse(&text);
    let footprints = doc.get_all("footprint");
    assert_eq!(footprints.len(), 2);

    let r1 = footprints[0];
    assert_eq!(r1.as_list().unwrap()[1].as_atom(), Some("geda:AXIAL_LAY-100"));
    assert_eq!(value(r1, "layer"), Some("F.Cu"));
    assert_eq!(
        r1.get("at").unwrap().to_string(),
        "(at 11.270000 10.000000 0.000000)"
    );
    let pads = r1.get_all("pad");
    assert_eq!(pads.len(), 2);
    assert_eq!(pads[0].get("net").unwrap().to_string(), "(net 1 \"GND\")");
    assert_eq!(pads[1].get("net").unwrap().to_string(), "(net 2 \"VCC\")");
    assert_eq!(value(pads[0], "drill"), Some("0.800000"));

    let c1 = footprints[1];
    assert_eq!(value(c1, "layer"), Some("B.Cu"));
    let pads = c1.get_all("pad");
    assert_eq!(pads[0].get("net").unwrap().to_string(), "(net 0 \"no connection\")");
    assert_eq!(pads[1].get("net").unwrap().to_string(), "(net 2 \"VCC\")");
    assert_eq!(
        pads[1].get("layers").unwrap().to_string(),
        "(layers \"B.Cu\" \"B.Paste\" \"B.Mask\")"
    );
}

#[test]
fn test_graphics_land_on_mapped_layers() {
    let (text, _) = export_fixture("simple_board.json");
    let doc = parse(&text);

    let lines = doc.get_all("gr_line");
    assert_eq!(lines.len(), 5);
    assert_eq!(value(lines[0], "layer"), Some("F.SilkS"));
    for edge in &lines[1..] {
        assert_eq!(value(edge, "layer"), Some("Edge.Cuts"));
    }

    let texts = doc.get_all("gr_text");
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].as_list().unwrap()[1].as_atom(), Some("REV A"));
}

#[test]
fn test_export_is_deterministic_with_sequential_ids() {
    let (first, _) = export_fixture("simple_board.json");
    let (second, _) = export_fixture("simple_board.json");
    assert_eq!(first, second);
}

#[test]
fn test_export_file_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("simple.kicad_pcb");

    let report = KicadPortCore::export_file(
        &fixture_path("simple_board.json"),
        &output,
        &ExportOptions::default(),
    )
    .unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(report.bytes, written.len());
    assert_eq!(report.stats.footprints, 2);
    assert!(written.starts_with("(kicad_pcb\n"));
    parse(&written);
}

#[test]
fn test_export_file_leaves_no_output_on_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("broken.kicad_pcb");

    let err = KicadPortCore::export_file(
        &fixture_path("invalid_board.json"),
        &output,
        &ExportOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        KicadPortError::Load(BoardLoadError::InvalidBoard(_))
    ));
    assert!(!output.exists());
}

#[test]
fn test_malformed_document_is_json_error() {
    let err = BoardLoader::load(&fixture_path("malformed_board.json")).unwrap_err();
    assert!(matches!(err, BoardLoadError::Json(_)));
}

#[test]
fn test_custom_options_reach_header() {
    let board = BoardLoader::load(&fixture_path("simple_board.json")).unwrap();
    let options = ExportOptions {
        generator: "pcb-export".to_string(),
        board_thickness: 0.8,
        ..Default::default()
    };
    let doc = parse(&KicadPortCore::export_board(&board, &options));

    assert_eq!(value(&doc, "generator"), Some("pcb-export"));
    assert_eq!(
        doc.get("general").unwrap().to_string(),
        "(thickness 0.800000)"
    );
}
