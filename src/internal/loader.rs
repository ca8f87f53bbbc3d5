//! Loads model definitions, binds them to a connection, and wires associations.
//!
//! A load runs in a fixed order: connect, discover files, register each file
//! as a model, then resolve associations once over the full registry. Files
//! that fail to load are logged and skipped; every other failure aborts the
//! load and is returned to the caller.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::internal::config::{LoaderConfig, RunnerOptions};
use crate::internal::db::{BackendInfo, ConnectTarget, Connector, SeaOrmConnector};
use crate::internal::discovery::{FileDiscovery, GlobDiscovery, discover_all};
use crate::internal::error::LoaderResult;
use crate::internal::migration::{
    Direction, ExecutedUnit, RunContext, RunKind, RunnerFactory, run_directional,
};
use crate::internal::model::{DefinitionImporter, ModelHandle, ModelImporter, ModelRegistry};

/// A discovered file that could not be turned into a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Builds model registries from a [`LoaderConfig`].
///
/// The loader itself holds no per-load state; every [`Loader::load`] returns
/// a new [`Loaded`] record. Loads are not meant to run concurrently against
/// the same database.
pub struct Loader<C: Connector> {
    config: LoaderConfig,
    working_dir: PathBuf,
    connector: C,
    discovery: Arc<dyn FileDiscovery>,
    importer: Arc<dyn ModelImporter<C::Connection>>,
}

impl Loader<SeaOrmConnector> {
    /// Loader over `sea-orm`, glob discovery and definition files.
    pub fn new(config: LoaderConfig, working_dir: impl Into<PathBuf>) -> Self {
        LoaderBuilder::new(config, working_dir, SeaOrmConnector).build()
    }
}

impl<C: Connector> Loader<C> {
    /// Start a loader with a custom connector; see [`LoaderBuilder`].
    pub fn builder(
        config: LoaderConfig,
        working_dir: impl Into<PathBuf>,
        connector: C,
    ) -> LoaderBuilder<C> {
        LoaderBuilder::new(config, working_dir, connector)
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub async fn load(&self) -> LoaderResult<Loaded<C::Connection>> {
        let target = ConnectTarget::from_config(&self.config, &self.working_dir)?;
        let connection = self.connector.connect(&target).await?;

        let files = discover_all(
            self.discovery.as_ref(),
            &self.config.model_globs,
            &self.working_dir,
        )?;
        let (mut registry, skipped) = register_models(self.importer.as_ref(), &files, &connection);
        registry.resolve_associations()?;

        tracing::debug!(
            models = registry.len(),
            skipped = skipped.len(),
            "model registry loaded"
        );
        Ok(Loaded {
            registry: Arc::new(registry),
            connection: Arc::new(connection),
            skipped,
            migration: self.config.migration.clone(),
            seed: self.config.seed.clone(),
        })
    }
}

/// Import every file in order. A failing file is logged and recorded, and
/// the registry built so far is always kept.
pub fn register_models<Conn>(
    importer: &dyn ModelImporter<Conn>,
    files: &[PathBuf],
    connection: &Conn,
) -> (ModelRegistry, Vec<SkippedFile>) {
    let mut registry = ModelRegistry::new();
    let mut skipped = Vec::new();
    for path in files {
        match importer.import(path, connection) {
            Ok(model) => {
                tracing::debug!(model = %model.name(), path = %path.display(), "registered model");
                registry.insert(model);
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to load model");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    (registry, skipped)
}

/// Injects collaborators into a [`Loader`].
pub struct LoaderBuilder<C: Connector> {
    config: LoaderConfig,
    working_dir: PathBuf,
    connector: C,
    discovery: Arc<dyn FileDiscovery>,
    importer: Option<Arc<dyn ModelImporter<C::Connection>>>,
}

impl<C: Connector> LoaderBuilder<C> {
    pub fn new(config: LoaderConfig, working_dir: impl Into<PathBuf>, connector: C) -> Self {
        Self {
            config,
            working_dir: working_dir.into(),
            connector,
            discovery: Arc::new(GlobDiscovery),
            importer: None,
        }
    }

    pub fn discovery(mut self, discovery: Arc<dyn FileDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn importer(mut self, importer: Arc<dyn ModelImporter<C::Connection>>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Finish the loader, importing with [`DefinitionImporter`] unless an
    /// importer was supplied.
    pub fn build(self) -> Loader<C>
    where
        C::Connection: BackendInfo,
    {
        let importer: Arc<dyn ModelImporter<C::Connection>> = match &self.importer {
            Some(importer) => Arc::clone(importer),
            None => Arc::new(DefinitionImporter),
        };
        self.build_with(importer)
    }

    /// Finish with `importer`, for connections without [`BackendInfo`].
    pub fn build_with(self, importer: Arc<dyn ModelImporter<C::Connection>>) -> Loader<C> {
        Loader {
            config: self.config,
            working_dir: self.working_dir,
            connector: self.connector,
            discovery: self.discovery,
            importer,
        }
    }
}

/// The result of one load: registry, connection, and runner delegation.
pub struct Loaded<Conn> {
    registry: Arc<ModelRegistry>,
    connection: Arc<Conn>,
    skipped: Vec<SkippedFile>,
    migration: RunnerOptions,
    seed: RunnerOptions,
}

impl<Conn> Loaded<Conn> {
    pub fn models(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn model(&self, name: &str) -> Option<&ModelHandle> {
        self.registry.get(name)
    }

    pub fn connection(&self) -> &Conn {
        &self.connection
    }

    pub fn shared_connection(&self) -> Arc<Conn> {
        Arc::clone(&self.connection)
    }

    /// Files that were discovered but failed to load.
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn migration_options(&self) -> &RunnerOptions {
        &self.migration
    }

    pub fn seed_options(&self) -> &RunnerOptions {
        &self.seed
    }

    fn context(&self, options: RunnerOptions) -> RunContext<Conn> {
        RunContext {
            options,
            connection: Arc::clone(&self.connection),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Run migrations with the configured options.
    pub async fn run_migrations(
        &self,
        factory: &dyn RunnerFactory<Conn>,
        direction: impl Into<Direction>,
    ) -> LoaderResult<Vec<ExecutedUnit>> {
        self.run_migrations_with(factory, direction, self.migration.clone())
            .await
    }

    pub async fn run_migrations_with(
        &self,
        factory: &dyn RunnerFactory<Conn>,
        direction: impl Into<Direction>,
        options: RunnerOptions,
    ) -> LoaderResult<Vec<ExecutedUnit>> {
        run_directional(
            RunKind::Migration,
            factory,
            self.context(options),
            direction.into(),
        )
        .await
    }

    /// Run seeds with the configured options.
    pub async fn run_seeds(
        &self,
        factory: &dyn RunnerFactory<Conn>,
        direction: impl Into<Direction>,
    ) -> LoaderResult<Vec<ExecutedUnit>> {
        self.run_seeds_with(factory, direction, self.seed.clone())
            .await
    }

    pub async fn run_seeds_with(
        &self,
        factory: &dyn RunnerFactory<Conn>,
        direction: impl Into<Direction>,
        options: RunnerOptions,
    ) -> LoaderResult<Vec<ExecutedUnit>> {
        run_directional(
            RunKind::Seed,
            factory,
            self.context(options),
            direction.into(),
        )
        .await
    }
}

impl<Conn> fmt::Debug for Loaded<Conn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loaded")
            .field("models", &self.registry.names())
            .field("skipped", &self.skipped)
            .field("migration", &self.migration)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
