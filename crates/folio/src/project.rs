//! Loaded configuration and the settings derived from it.

use std::path::Path;

use folio_config::{CliSettings, Config};
use folio_server::ServerConfig;
use folio_site::{Site, SiteConfig};
use folio_static::{BuildConfig, BuildReport, StaticSiteBuilder, Theme};
use folio_storage::FsStorage;

use crate::error::CliError;

/// A `folio.toml` project with CLI overrides applied.
pub(crate) struct Project {
    pub config: Config,
}

impl Project {
    pub(crate) fn load(config_path: Option<&Path>, settings: &CliSettings) -> Result<Self, CliError> {
        let config = Config::load(config_path, Some(settings))?;
        Ok(Self { config })
    }

    pub(crate) fn source_dir(&self) -> &Path {
        &self.config.docs_resolved.source_dir
    }

    pub(crate) fn output_dir(&self) -> &Path {
        &self.config.docs_resolved.output_dir
    }

    pub(crate) fn site_config(&self) -> SiteConfig {
        SiteConfig {
            title: self.config.site.title.clone(),
            base_path: self.config.site.base_path.clone(),
            include_drafts: self.config.docs_resolved.include_drafts,
            toc_depth: self.config.theme.toc_depth,
        }
    }

    pub(crate) fn theme(&self) -> Theme {
        let site = &self.config.site;
        let theme = &self.config.theme;
        Theme {
            site_title: site.title.clone(),
            site_description: site.description.clone(),
            base_path: site.base_path.clone(),
            banner: theme.banner.clone(),
            footer: theme.footer.clone(),
            project_link: theme.project_link.clone(),
            search: theme.search,
        }
    }

    pub(crate) fn build_config(&self, clean: bool) -> BuildConfig {
        BuildConfig {
            theme: self.theme(),
            site_url: self.config.site.url.clone(),
            public_dir: Some(self.config.docs_resolved.public_dir.clone()),
            source_dir: Some(self.source_dir().to_path_buf()),
            clean,
        }
    }

    pub(crate) fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.config.server.host.clone(),
            port: self.config.server.port,
            root: self.output_dir().to_path_buf(),
            base_path: self.config.site.base_path.clone(),
        }
    }

    /// Scan, parse and validate the content tree.
    pub(crate) fn load_site(&self) -> Result<Site, CliError> {
        let source_dir = self.source_dir();
        if !source_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Source directory not found: {}",
                source_dir.display()
            )));
        }
        let storage = FsStorage::with_meta_filename(source_dir.to_path_buf(), &self.config.metadata.name)
            .with_excludes(&self.config.docs_resolved.exclude)?;
        Ok(Site::load(&storage, self.site_config())?)
    }

    /// Load the site and write it to the output directory.
    pub(crate) fn build(&self, clean: bool) -> Result<BuildReport, CliError> {
        let site = self.load_site()?;
        if site.drafts_skipped() > 0 {
            tracing::info!(drafts = site.drafts_skipped(), "Skipped drafts");
        }
        let report = StaticSiteBuilder::new(&site, self.build_config(clean)).build(self.output_dir())?;
        Ok(report)
    }

    /// Rebuild next to the output directory and swap the result in.
    ///
    /// The served tree stays complete while the new one is written, and
    /// survives unchanged when the rebuild fails.
    pub(crate) fn rebuild(&self) -> Result<BuildReport, CliError> {
        let site = self.load_site()?;
        let report = StaticSiteBuilder::new(&site, self.build_config(true))
            .build_replacing(self.output_dir())?;
        Ok(report)
    }
}
