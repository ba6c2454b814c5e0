//! `folio serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_server::{DEFAULT_DEBOUNCE, SourceWatcher, run_server};

use super::BuildArgs;
use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the serve command.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Do not rebuild when sources change.
    #[arg(long)]
    pub no_watch: bool,
}

impl ServeArgs {
    /// Build the site, then serve it and rebuild on changes.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let mut settings = self.build.settings();
        settings.host = self.host;
        settings.port = self.port;
        let project = Arc::new(Project::load(
            self.build.source.config.as_deref(),
            &settings,
        )?);
        let clean = !self.build.no_clean;

        let report = project.build(clean)?;
        output.success(&format!(
            "Built {} pages into {}",
            report.pages,
            project.output_dir().display()
        ));

        let _watcher = if self.no_watch {
            None
        } else {
            let rebuild = Arc::clone(&project);
            let watcher = SourceWatcher::start(
                project.source_dir(),
                vec![project.output_dir().to_path_buf()],
                DEFAULT_DEBOUNCE,
                move |changed: &[PathBuf]| rebuild_after_change(&rebuild, changed, clean),
            )?;
            output.info(&format!(
                "Watching {} for changes",
                project.source_dir().display()
            ));
            Some(watcher)
        };

        let server = project.server_config();
        output.info(&format!(
            "Serving at http://{}{}",
            server.address(),
            server.base_path
        ));
        run_server(server).await?;
        Ok(())
    }
}

/// Rebuild after a change; failures leave the previous output in place.
///
/// Clean rebuilds are written beside the served directory and swapped in.
fn rebuild_after_change(project: &Project, changed: &[PathBuf], clean: bool) {
    let output = Output::new();
    let result = if clean {
        project.rebuild()
    } else {
        project.build(false)
    };
    match result {
        Ok(report) => output.success(&format!(
            "Rebuilt {} pages ({} changed files)",
            report.pages,
            changed.len()
        )),
        Err(err) => {
            tracing::error!(error = %err, "Rebuild failed");
            output.error(&format!("Rebuild failed: {err}"));
        }
    }
}
