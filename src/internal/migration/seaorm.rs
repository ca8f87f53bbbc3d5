//! Runner adapter over `sea-orm-migration` migrators.
//!
//! Seeds use the same adapter with a second migrator whose
//! `migration_table_name` points at the seed table. The migrator owns its
//! record table, so the configured `table_name` must name that same table.
//! Units of this adapter only see the schema manager; units that need the
//! model registry go through [`super::ModelMigrationFactory`].

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use sea_orm::sea_query::Iden;
use sea_orm_migration::MigratorTrait;

use super::{ExecutedUnit, MigrationRunner, RunContext, RunnerFactory, Target, UnitNamer};
use crate::internal::config::StorageKind;
use crate::internal::error::{LoaderError, LoaderResult};

/// Builds runners for the migrator `M`.
pub struct SeaOrmRunnerFactory<M> {
    _migrator: PhantomData<fn() -> M>,
}

impl<M> SeaOrmRunnerFactory<M> {
    pub fn new() -> Self {
        Self {
            _migrator: PhantomData,
        }
    }
}

impl<M> Default for SeaOrmRunnerFactory<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> RunnerFactory<DatabaseConnection> for SeaOrmRunnerFactory<M>
where
    M: MigratorTrait + 'static,
{
    fn create(
        &self,
        context: RunContext<DatabaseConnection>,
    ) -> LoaderResult<Box<dyn MigrationRunner>> {
        // the migrator records state in its own table only
        if context.options.storage != StorageKind::Table {
            return Err(LoaderError::UnsupportedStorage {
                kind: "sea-orm migrator".to_string(),
                storage: context.options.storage,
            });
        }
        let own_table = Iden::to_string(&*M::migration_table_name());
        if own_table != context.options.table_name {
            return Err(LoaderError::TableMismatch {
                configured: context.options.table_name.clone(),
                runner: own_table,
            });
        }
        let namer = UnitNamer::new(&context.options)?;

        Ok(Box::new(SeaOrmRunner::<M> {
            context,
            namer,
            _migrator: PhantomData,
        }))
    }
}

struct SeaOrmRunner<M> {
    context: RunContext<DatabaseConnection>,
    namer: UnitNamer,
    _migrator: PhantomData<fn() -> M>,
}

#[async_trait]
impl<M> MigrationRunner for SeaOrmRunner<M>
where
    M: MigratorTrait + 'static,
{
    async fn up(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
        if target == Target::Beginning {
            return Ok(Vec::new());
        }
        let db = self.context.connection.as_ref();
        let pending = M::get_pending_migrations(db).await?;
        if self.context.options.logging {
            tracing::debug!(
                count = pending.len(),
                table = %self.context.options.table_name,
                model = %self.context.options.model_name,
                "applying pending units"
            );
        }
        M::up(db, None).await?;
        Ok(pending.iter().map(|m| self.namer.unit(m.name())).collect())
    }

    async fn down(&mut self, _target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
        let db = self.context.connection.as_ref();
        let applied = M::get_applied_migrations(db).await?;
        if self.context.options.logging {
            tracing::debug!(
                count = applied.len(),
                table = %self.context.options.table_name,
                model = %self.context.options.model_name,
                "rolling back applied units"
            );
        }
        M::down(db, None).await?;
        Ok(applied.iter().rev().map(|m| self.namer.unit(m.name())).collect())
    }
}
