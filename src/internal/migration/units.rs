//! Migration units that receive the loaded model registry.
//!
//! Executed unit names are recorded in the configured `table_name` when
//! storage is `table`; with storage `none` nothing is recorded and every unit
//! runs on each call.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sea_orm::sea_query::{Alias, ColumnDef, Expr, Query, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use sea_orm_migration::SchemaManager;

use super::{ExecutedUnit, MigrationRunner, RunContext, RunnerFactory, Target, UnitNamer};
use crate::internal::config::StorageKind;
use crate::internal::error::{LoaderError, LoaderResult};
use crate::internal::model::ModelRegistry;

const VERSION: &str = "version";
const APPLIED_AT: &str = "applied_at";

/// A migration or seed unit that can read the registered models.
#[async_trait]
pub trait ModelMigration: Send + Sync {
    fn name(&self) -> &str;

    async fn up(&self, manager: &SchemaManager, models: &ModelRegistry) -> Result<(), DbErr>;

    async fn down(&self, manager: &SchemaManager, models: &ModelRegistry) -> Result<(), DbErr>;
}

/// Builds runners over an ordered list of [`ModelMigration`] units.
#[derive(Clone, Default)]
pub struct ModelMigrationFactory {
    units: Vec<Arc<dyn ModelMigration>>,
}

impl ModelMigrationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit; units run up in insertion order and down in reverse.
    pub fn with_unit(mut self, unit: impl ModelMigration + 'static) -> Self {
        self.units.push(Arc::new(unit));
        self
    }
}

impl RunnerFactory<DatabaseConnection> for ModelMigrationFactory {
    fn create(
        &self,
        context: RunContext<DatabaseConnection>,
    ) -> LoaderResult<Box<dyn MigrationRunner>> {
        if context.options.storage == StorageKind::Json {
            return Err(LoaderError::UnsupportedStorage {
                kind: "model migration".to_string(),
                storage: context.options.storage,
            });
        }
        let namer = UnitNamer::new(&context.options)?;
        Ok(Box::new(ModelMigrationRunner {
            context,
            namer,
            units: self.units.clone(),
        }))
    }
}

struct ModelMigrationRunner {
    context: RunContext<DatabaseConnection>,
    namer: UnitNamer,
    units: Vec<Arc<dyn ModelMigration>>,
}

impl ModelMigrationRunner {
    fn db(&self) -> &DatabaseConnection {
        self.context.connection.as_ref()
    }

    fn records(&self) -> bool {
        self.context.options.storage == StorageKind::Table
    }

    fn table(&self) -> Alias {
        Alias::new(&self.context.options.table_name)
    }

    async fn applied(&self) -> LoaderResult<HashSet<String>> {
        if !self.records() {
            return Ok(HashSet::new());
        }
        SchemaManager::new(self.db())
            .create_table(
                Table::create()
                    .table(self.table())
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new(VERSION))
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new(APPLIED_AT)).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        let select = Query::select()
            .column(Alias::new(VERSION))
            .from(self.table())
            .to_owned();
        let db = self.db();
        let rows = db.query_all(db.get_database_backend().build(&select)).await?;
        let mut applied = HashSet::new();
        for row in rows {
            applied.insert(row.try_get::<String>("", VERSION)?);
        }
        Ok(applied)
    }

    async fn record(&self, name: &str) -> LoaderResult<()> {
        let applied_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        let mut insert = Query::insert();
        insert
            .into_table(self.table())
            .columns([Alias::new(VERSION), Alias::new(APPLIED_AT)]);
        insert
            .values([name.into(), applied_at.into()])
            .map_err(|e| DbErr::Custom(e.to_string()))?;

        let db = self.db();
        db.execute(db.get_database_backend().build(&insert)).await?;
        Ok(())
    }

    async fn forget(&self, name: &str) -> LoaderResult<()> {
        let delete = Query::delete()
            .from_table(self.table())
            .and_where(Expr::col(Alias::new(VERSION)).eq(name))
            .to_owned();
        let db = self.db();
        db.execute(db.get_database_backend().build(&delete)).await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationRunner for ModelMigrationRunner {
    async fn up(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
        if target == Target::Beginning {
            return Ok(Vec::new());
        }
        let applied = self.applied().await?;
        let manager = SchemaManager::new(self.db());
        let models = self.context.registry.as_ref();

        let mut executed = Vec::new();
        for unit in &self.units {
            if applied.contains(unit.name()) {
                continue;
            }
            unit.up(&manager, models).await?;
            if self.records() {
                self.record(unit.name()).await?;
            }
            executed.push(self.namer.unit(unit.name()));
        }
        tracing::debug!(
            count = executed.len(),
            table = %self.context.options.table_name,
            model = %self.context.options.model_name,
            "applied model migrations"
        );
        Ok(executed)
    }

    async fn down(&mut self, _target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
        let applied = self.applied().await?;
        let manager = SchemaManager::new(self.db());
        let models = self.context.registry.as_ref();

        let mut executed = Vec::new();
        for unit in self.units.iter().rev() {
            if self.records() && !applied.contains(unit.name()) {
                continue;
            }
            unit.down(&manager, models).await?;
            if self.records() {
                self.forget(unit.name()).await?;
            }
            executed.push(self.namer.unit(unit.name()));
        }
        tracing::debug!(
            count = executed.len(),
            table = %self.context.options.table_name,
            model = %self.context.options.model_name,
            "reverted model migrations"
        );
        Ok(executed)
    }
}
