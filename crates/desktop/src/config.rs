//! Resolved runtime configuration.

use std::path::PathBuf;

use stocktally_inventory::{Schema, Variant};

use crate::cli::Cli;
use crate::storage::default_db_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub variant: Variant,
}

impl AppConfig {
    /// Fill in defaults for anything the command line (or env) left out.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            variant: cli.variant,
        })
    }

    pub fn schema(&self) -> Schema {
        self.variant.schema()
    }
}
