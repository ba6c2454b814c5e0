//! `folio check` command implementation.

use clap::Args;
use folio_config::CliSettings;

use super::SourceArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl CheckArgs {
    /// Load and render every page without writing anything.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            source_dir: self.source.source_dir.clone(),
            include_drafts: self.source.include_drafts(),
            ..CliSettings::default()
        };
        let project = Project::load(self.source.config.as_deref(), &settings)?;
        let site = project.load_site()?;

        let mut warnings = 0;
        for item in site.items() {
            let page = site.render(&item.path)?;
            for warning in &page.warnings {
                output.warning(&format!("{}: {warning}", item.source.display()));
                warnings += 1;
            }
        }

        output.success(&format!(
            "{} pages, {} navigation entries, {} listings, {} tags",
            site.items().len(),
            site.nav().len(),
            site.listing_paths().len(),
            site.tags().len()
        ));
        if site.drafts_skipped() > 0 {
            output.info(&format!("{} drafts skipped", site.drafts_skipped()));
        }
        if warnings > 0 {
            output.warning(&format!("{warnings} warnings"));
        }
        Ok(())
    }
}
