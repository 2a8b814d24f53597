//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stocktally_inventory::Variant;

#[derive(Parser, Debug)]
#[command(
    name = "stocktally",
    version,
    about = "Tally pallets, boxes and units per item code and export the count as CSV."
)]
pub struct Cli {
    /// SQLite database holding the tally (default: app data dir).
    #[arg(long, env = "STOCKTALLY_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Field layout: `code-only` or `detailed` (description + total).
    #[arg(long, env = "STOCKTALLY_VARIANT", default_value = "code-only", global = true)]
    pub variant: Variant,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append an item to the tally.
    Add(AddArgs),
    /// Show the tally as a table.
    List,
    /// Remove the row with the given `#`.
    Remove { index: usize },
    /// Remove every row.
    Clear {
        /// Do not ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Write the tally as CSV.
    Export {
        /// Target file (`-` for stdout). Defaults to `contagem_estoque.csv`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive entry: one line per field, Enter moves to the next one.
    Shell {
        /// Line-oriented barcode source (device node, FIFO or file).
        #[arg(long)]
        scan_device: Option<PathBuf>,
    },
}

/// Raw field values; counts are normalized by the store, not by clap.
#[derive(Args, Debug, Default)]
pub struct AddArgs {
    #[arg(short, long, default_value = "")]
    pub code: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub pallets: String,

    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub boxes: String,

    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub units: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_raw_counts() {
        let cli = Cli::try_parse_from([
            "stocktally", "add", "--code", "A1", "--pallets", "-5", "--boxes", "abc", "--units", "7",
        ])
        .unwrap();

        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.code, "A1");
                assert_eq!(args.pallets, "-5");
                assert_eq!(args.boxes, "abc");
                assert_eq!(args.units, "7");
                assert_eq!(args.description, "");
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn variant_and_db_are_global() {
        let cli = Cli::try_parse_from([
            "stocktally", "list", "--variant", "detailed", "--db", "/tmp/t.db",
        ])
        .unwrap();
        assert_eq!(cli.variant, Variant::Detailed);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
    }

    #[test]
    fn rejects_unknown_variant() {
        assert!(Cli::try_parse_from(["stocktally", "--variant", "x", "list"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
