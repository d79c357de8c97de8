mod cli;
mod commands;
mod paths;

use cli::{Cli, Commands};

fn run() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Routes(args) => commands::routes::run(args),
        Commands::Merge(args) => commands::merge::run(args),
    }
}

fn main() -> anyhow::Result<()> {
    run()
}
