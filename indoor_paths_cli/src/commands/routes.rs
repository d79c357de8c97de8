use std::fs;

use anyhow::{Context, Result};
use indoor_osm_io::{extract, write_routes, Document, IngestError};
use indoor_paths::{skeletonize, Tolerances, Way};

use crate::cli::RoutesArgs;
use crate::paths::with_suffix;

/// Runs the path generator end to end: parse → extract rooms/connectors/doors → per-room
/// skeleton + `find_ways` → per-connector `find_ways` → serialize. Rooms are processed in input
/// order, and the final `Way` list is every room's ways followed by every connector's, so output
/// order is a deterministic function of input order.
pub fn run(args: &RoutesArgs) -> Result<()> {
    let output = with_suffix(&args.input, "__routes");
    if output == args.input {
        return Err(IngestError::ConfigInvalid {
            reason: format!("output path {} would overwrite the input file", output.display()),
        }
        .into());
    }

    let xml = fs::read_to_string(&args.input)
        .with_context(|| format!("reading input file {}", args.input.display()))?;
    let doc = Document::parse(&xml)?;

    let tol = Tolerances::default();
    let extract::ExtractResult { mut rooms, connectors, doors_by_level } = extract::extract(&doc, &tol)?;

    log::info!("parsed {} room(s), {} connector(s)", rooms.len(), connectors.len());

    let mut ways: Vec<Way> = Vec::new();
    let mut isolated_doors: Vec<(indoor_paths::Point, String)> = Vec::new();
    for room in &mut rooms {
        let skeleton = skeletonize(&room.outer, &room.holes, &tol);
        room.find_ways(&skeleton, args.sw, args.dd, &tol);
        if room.ways.is_empty() {
            log::info!("room on level {} produced no ways, emitting its doors as isolated nodes", room.level);
            isolated_doors.extend(room.doors.iter().map(|&d| (d, room.level.clone())));
        }
        ways.extend(room.ways.iter().cloned());
    }
    for connector in &connectors {
        ways.extend(connector.find_ways(&doors_by_level, &tol));
    }

    if ways.is_empty() && isolated_doors.is_empty() {
        log::warn!("no ways were synthesized from {}", args.input.display());
    }

    let pretty = if args.no_pretty { indoor_osm_io::PrettyPrint::Flat } else { indoor_osm_io::PrettyPrint::Pretty };
    let xml_out = write_routes(&ways, &isolated_doors, doc.bounds.as_ref(), tol.point_to_point, pretty);
    fs::write(&output, xml_out).with_context(|| format!("writing output file {}", output.display()))?;
    log::info!("wrote {} way(s) to {}", ways.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_output_path_identical_to_input() {
        // `with_suffix` never produces the identical path for a normal `.osm` input, so this
        // guards the invariant rather than exercising the happy path end-to-end (that needs a
        // real file on disk, covered by the `indoor_paths_cli` integration test instead).
        let input = std::path::PathBuf::from("building.osm");
        assert_ne!(with_suffix(&input, "__routes"), input);
    }
}
