//! `folio build` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use folio_config::CliSettings;

use super::SourceArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep existing files in the output directory.
    #[arg(long)]
    pub no_clean: bool,
}

impl BuildArgs {
    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            include_drafts: self.source.include_drafts(),
            ..CliSettings::default()
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let project = Project::load(self.source.config.as_deref(), &self.settings())?;

        output.info(&format!("Source: {}", project.source_dir().display()));
        output.info(&format!("Output: {}", project.output_dir().display()));

        let started = Instant::now();
        let report = project.build(!self.no_clean)?;

        if report.warnings > 0 {
            output.warning(&format!(
                "{} rendering warnings (run `folio check` for details)",
                report.warnings
            ));
        }
        output.success(&format!(
            "Built {} pages, {} listings and {} tag pages in {:.2?}",
            report.pages,
            report.listings,
            report.tag_pages,
            started.elapsed()
        ));
        Ok(())
    }
}
