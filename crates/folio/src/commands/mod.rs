//! CLI command implementations.

mod build;
mod check;
mod serve;
mod start;

use std::path::PathBuf;

use clap::Args;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use serve::ServeArgs;
pub(crate) use start::StartArgs;

/// Options selecting the project and its content.
#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long)]
    pub source_dir: Option<PathBuf>,

    /// Include pages marked `draft: true`.
    #[arg(long)]
    pub drafts: bool,
}

impl SourceArgs {
    /// Draft override; absent flag keeps the config value.
    fn include_drafts(&self) -> Option<bool> {
        self.drafts.then_some(true)
    }
}
