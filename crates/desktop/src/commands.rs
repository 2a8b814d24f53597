//! Subcommand dispatch.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use stocktally_inventory::{
    FixedAnswer, InventoryStore, ItemDraft, KeyValueStorage, ViewProjector,
};

use crate::cli::{AddArgs, Cli, Command};
use crate::config::AppConfig;
use crate::prompt::LineConfirm;
use crate::render;
use crate::scanner::ReaderScanner;
use crate::shell::Shell;
use crate::storage::SqliteStorage;

/// Open the configured database and run `cli.command` against the terminal.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_cli(&cli)?;
    tracing::info!(db = %config.db_path.display(), variant = %config.variant, "starting");

    let storage = SqliteStorage::open(&config.db_path)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(cli.command, &config, storage, &mut stdin.lock(), &mut stdout.lock())
}

/// Run one subcommand against `storage`, reading answers from `input`.
pub fn execute<S, R, W>(
    command: Command,
    config: &AppConfig,
    storage: S,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStorage,
    R: BufRead,
    W: Write,
{
    let schema = config.schema();
    let mut store = InventoryStore::load(storage, schema);
    let projector = ViewProjector::new(schema);

    match command {
        Command::Add(args) => {
            let index = store.len();
            let item = store.add(&draft_from(args))?;
            writeln!(out, "Adicionado #{index}: {}", item.label())?;
        }
        Command::List => {
            if store.is_empty() {
                writeln!(out, "(nenhum item)")?;
            } else {
                let rows = projector.to_rows(store.list());
                write!(out, "{}", render::table(&projector.headers(), &rows))?;
            }
        }
        Command::Remove { index } => {
            let item = store.remove_at(index)?;
            writeln!(out, "Removido #{index}: {}", item.label())?;
        }
        Command::Clear { yes } => {
            let cleared = if yes {
                store.clear(&mut FixedAnswer(true))?
            } else {
                store.clear(&mut LineConfirm::new(&mut *input, &mut *out))?
            };
            if cleared {
                writeln!(out, "Inventário limpo.")?;
            }
        }
        Command::Export { output } => {
            let doc = projector.to_csv(store.list())?;
            match output.as_deref() {
                Some(path) if path == Path::new("-") => out.write_all(doc.as_bytes())?,
                other => {
                    let path = other
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| PathBuf::from(doc.file_name));
                    std::fs::write(&path, doc.as_bytes())
                        .with_context(|| format!("failed to write CSV export to {path:?}"))?;
                    writeln!(
                        out,
                        "Exportados {} itens para {}",
                        doc.record_count(),
                        path.display()
                    )?;
                }
            }
        }
        Command::Shell { scan_device } => {
            let scanner = scan_device.map(ReaderScanner::from_path);
            Shell::new(&mut store, scanner).run(&mut *input, out)?;
        }
    }

    Ok(())
}

fn draft_from(args: AddArgs) -> ItemDraft {
    ItemDraft {
        code: args.code,
        description: args.description,
        pallets: args.pallets,
        boxes_per_pallet: args.boxes,
        units_per_box: args.units,
    }
}
