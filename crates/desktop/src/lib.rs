//! `stocktally-desktop`
//!
//! **Responsibility:** Terminal host for the stock tally.
//!
//! This crate provides:
//! - The `stocktally` command line (one-shot subcommands and an interactive shell)
//! - SQLite-backed durable storage for the tally slot
//! - A line-oriented barcode scanner for keyboard-wedge and serial devices
//!
//! All tally rules live in `stocktally-inventory`; this crate only wires them
//! to a terminal, a database file and a scan device.

pub mod cli;
pub mod commands;
pub mod config;
pub mod prompt;
pub mod render;
pub mod scanner;
pub mod shell;
pub mod storage;

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use scanner::ReaderScanner;
pub use shell::Shell;
pub use storage::{SqliteStorage, default_db_path};
