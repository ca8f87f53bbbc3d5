//! Command implementations for the inspection CLI and the load arguments they share.

pub mod models;
pub mod schema;

use std::path::PathBuf;

use clap::Args;
use sea_orm::DatabaseConnection;

use crate::internal::config::LoaderConfig;
use crate::internal::error::LoaderResult;
use crate::internal::loader::{Loaded, Loader};
use crate::utils::path;

/// Configuration files looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["modelwire.toml", "modelwire.json"];

#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Configuration file (.toml or .json)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Working directory that relative globs are resolved against
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl LoadArgs {
    pub fn working_dir(&self) -> LoaderResult<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Explicit `--config`, else the first default file present, else defaults.
    pub fn config(&self, working_dir: &std::path::Path) -> LoaderResult<LoaderConfig> {
        if let Some(config) = &self.config {
            return LoaderConfig::from_file(&path::resolve(config, working_dir)?);
        }
        for name in DEFAULT_CONFIG_FILES {
            let candidate = working_dir.join(name);
            if candidate.is_file() {
                return LoaderConfig::from_file(&candidate);
            }
        }
        Ok(LoaderConfig::default())
    }

    pub async fn load(&self) -> LoaderResult<Loaded<DatabaseConnection>> {
        let working_dir = self.working_dir()?;
        let config = self.config(&working_dir)?;
        Loader::new(config, working_dir).load().await
    }
}
