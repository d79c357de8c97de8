use std::path::PathBuf;

/// Indoor-path synthesis and point-merging over OSM XML 0.6.
#[derive(clap::Parser, Debug)]
#[command(name = "indoor-paths", version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Synthesize a navigation-path graph from an indoor-mapping OSM file
    Routes(RoutesArgs),

    /// Collapse near-coincident nodes across an OSM file's navigation graph
    Merge(MergeArgs),
}

#[derive(clap::Args, Debug)]
pub struct RoutesArgs {
    /// Input OSM XML file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Add direct door-to-door shortcut ways within each room
    #[arg(long)]
    pub dd: bool,

    /// Aggressively simplify way chains by bypassing interior vertices that stay inside the room
    #[arg(long)]
    pub sw: bool,

    /// Write flat XML with no pretty-printed indentation
    #[arg(long)]
    pub no_pretty: bool,
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Input OSM XML file
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
}
