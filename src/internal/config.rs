//! Loader configuration: defaults, shallow merge, and file loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::internal::error::{LoaderError, LoaderResult};

/// Glob used when no `model_globs` are configured.
pub const DEFAULT_MODEL_GLOB: &str = "models/**/*.{toml,json}";

/// Filename pattern shared by the default migration and seed options.
pub const DEFAULT_UNIT_PATTERN: &str = r"^m\d{8}_\d{6}_[\w-]+$";

/// SQL dialect of the target database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    Sqlite,
    Postgres,
    Mysql,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Postgres => write!(f, "postgres"),
            Self::Mysql => write!(f, "mysql"),
        }
    }
}

/// Driver-level options handed to the ORM alongside the credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectOptions {
    pub dialect: Dialect,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database file for sqlite.
    pub storage: Option<PathBuf>,
    /// Log every SQL statement through the ORM.
    pub logging: bool,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
}

/// Credentials and driver options used when no connection string is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub options: DialectOptions,
}

/// Mechanism a runner uses to remember which units already ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// A table in the connected database.
    Table,
    /// A JSON file on disk.
    Json,
    /// Nothing is recorded.
    None,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Options for a migration or seed runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerOptions {
    pub storage: StorageKind,
    /// Table executed unit names are recorded in. The sea-orm migrator
    /// adapter requires this to equal the migrator's own table.
    pub table_name: String,
    /// Label of the record model; only reported in runner log lines.
    pub model_name: String,
    #[serde(default)]
    pub logging: bool,
    /// Directory holding the units.
    pub path: PathBuf,
    /// Pattern unit names must match.
    pub pattern: String,
}

impl RunnerOptions {
    pub fn migrations() -> Self {
        Self {
            storage: StorageKind::Table,
            table_name: "seaql_migrations".to_string(),
            model_name: "SeaqlMigrations".to_string(),
            logging: false,
            path: PathBuf::from("migrations"),
            pattern: DEFAULT_UNIT_PATTERN.to_string(),
        }
    }

    pub fn seeds() -> Self {
        Self {
            storage: StorageKind::Table,
            table_name: "seaql_seeds".to_string(),
            model_name: "SeaqlSeeds".to_string(),
            logging: false,
            path: PathBuf::from("seeders"),
            pattern: DEFAULT_UNIT_PATTERN.to_string(),
        }
    }
}

/// Complete configuration, every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub connection_string: Option<String>,
    pub connection_options: Option<ConnectionOptions>,
    pub model_globs: Vec<String>,
    pub migration: RunnerOptions,
    pub seed: RunnerOptions,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            connection_options: None,
            model_globs: vec![DEFAULT_MODEL_GLOB.to_string()],
            migration: RunnerOptions::migrations(),
            seed: RunnerOptions::seeds(),
        }
    }
}

/// Caller-supplied configuration; unset keys fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub connection_string: Option<String>,
    pub connection_options: Option<ConnectionOptions>,
    #[serde(alias = "models")]
    pub model_globs: Option<Vec<String>>,
    #[serde(alias = "migration_options")]
    pub migration: Option<RunnerOptions>,
    #[serde(alias = "seed_options")]
    pub seed: Option<RunnerOptions>,
}

impl LoaderConfig {
    /// Overlay `partial` on the defaults, one top-level key at a time.
    ///
    /// Nested records are taken whole from whichever side provides them.
    pub fn merge(partial: PartialConfig) -> Self {
        let defaults = Self::default();
        Self {
            connection_string: partial.connection_string.or(defaults.connection_string),
            connection_options: partial.connection_options.or(defaults.connection_options),
            model_globs: partial.model_globs.unwrap_or(defaults.model_globs),
            migration: partial.migration.unwrap_or(defaults.migration),
            seed: partial.seed.unwrap_or(defaults.seed),
        }
    }

    /// Read a `.toml` or `.json` file and merge it onto the defaults.
    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        let invalid = |message: String| LoaderError::Config {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let partial: PartialConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| invalid(e.to_string()))?,
            Some("json") => serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?,
            _ => return Err(invalid("expected a .toml or .json file".to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(Self::merge(partial))
    }
}
