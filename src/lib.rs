//! Loads model definitions from files matched by globs, binds them to one
//! database connection, resolves their associations once every model is
//! registered, and drives migration and seed runners over that connection.

pub mod cli;
pub mod command;
pub mod internal;
pub mod utils;

pub use internal::config::{
    ConnectionOptions, Dialect, DialectOptions, LoaderConfig, PartialConfig, RunnerOptions,
    StorageKind,
};
pub use internal::db::{BackendInfo, ConnectTarget, Connector, SeaOrmConnector};
pub use internal::discovery::{FileDiscovery, GlobDiscovery};
pub use internal::error::{LoaderError, LoaderResult};
pub use internal::loader::{Loaded, Loader, LoaderBuilder, SkippedFile};
pub use internal::migration::{
    Direction, ExecutedUnit, MigrationRunner, ModelMigration, ModelMigrationFactory, RunContext,
    RunKind, RunnerFactory, SeaOrmRunnerFactory, Target,
};
pub use internal::model::{
    Association, AssociationDef, AssociationKind, FieldDef, FieldKind, ModelHandle,
    ModelImporter, ModelRegistry,
};
