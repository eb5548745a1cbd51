//! junksort - sort a messy directory tree into category folders
//!
//! This library classifies files by extension, sanitizes and transliterates
//! their names, moves them into fixed category folders under the root, removes
//! directories left empty and unpacks the archives that end up in `archives/`.

pub mod archive;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod dispatcher;
pub mod file_category;
pub mod file_organizer;
pub mod normalize;
pub mod output;
pub mod pruner;
pub mod scanner;
pub mod transliterate;

pub use config::{CompiledFilters, Config, ConfigError};
pub use dispatcher::{Dispatcher, Phase, RunError, RunReport};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{MovedFile, OrganizeError};

pub use cli::{run_cli, run_cli_with_config};
