use std::fs;

use anyhow::{Context, Result};
use indoor_osm_io::{merge_document, write_document, Document, IngestError, PrettyPrint};
use indoor_paths::Tolerances;

use crate::cli::MergeArgs;
use crate::paths::with_suffix;

/// Runs the point-cluster merger end to end: parse → `merge_document` → serialize, writing
/// `INPUT__merged.osm` alongside the input.
pub fn run(args: &MergeArgs) -> Result<()> {
    let output = with_suffix(&args.input, "__merged");
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
    let merged = merge_document(&doc, &tol);
    log::info!(
        "merged {} node(s) down to {} across {} way(s)",
        doc.nodes.len(),
        merged.nodes.len(),
        merged.ways.len()
    );

    let xml_out = write_document(&merged, PrettyPrint::Pretty);
    fs::write(&output, xml_out).with_context(|| format!("writing output file {}", output.display()))?;
    Ok(())
}
