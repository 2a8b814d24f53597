//! `stocktally` entry point.

use clap::Parser;
use stocktally_desktop::Cli;

fn main() -> anyhow::Result<()> {
    stocktally_observability::init();

    let cli = Cli::parse();
    stocktally_desktop::commands::run(cli)
}
