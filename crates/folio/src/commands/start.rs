//! `folio start` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::CliSettings;
use folio_server::run_server;

use crate::error::CliError;
use crate::output::Output;
use crate::project::Project;

/// Arguments for the start command.
#[derive(Args, Debug)]
pub(crate) struct StartArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory with a built site (overrides config).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl StartArgs {
    /// Serve a previously built site.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            output_dir: self.output_dir,
            host: self.host,
            port: self.port,
            ..CliSettings::default()
        };
        let project = Project::load(self.config.as_deref(), &settings)?;

        if !project.output_dir().join("index.html").is_file() {
            return Err(CliError::Validation(format!(
                "No built site in {}; run `folio build` first",
                project.output_dir().display()
            )));
        }

        let server = project.server_config();
        output.info(&format!(
            "Serving {} at http://{}{}",
            server.root.display(),
            server.address(),
            server.base_path
        ));
        run_server(server).await?;
        Ok(())
    }
}
