//! Delegation to migration and seed runners.
//!
//! The loader never executes units itself. It builds a fresh runner from a
//! [`RunnerFactory`] for every call, injects the live connection and the model
//! registry, and asks the runner to move up or down.

pub mod seaorm;
pub mod units;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::internal::config::RunnerOptions;
use crate::internal::error::{LoaderError, LoaderResult};
use crate::internal::model::ModelRegistry;

pub use seaorm::SeaOrmRunnerFactory;
pub use units::{ModelMigration, ModelMigrationFactory};

/// Which way to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `"down"` is the only value that selects [`Direction::Down`].
    pub fn normalize(raw: &str) -> Self {
        if raw == "down" { Self::Down } else { Self::Up }
    }
}

impl From<&str> for Direction {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// How far a runner should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// No constraint: run everything outstanding.
    Unbounded,
    /// Rewind to before the first unit.
    Beginning,
}

/// Migrations or seeds; only used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Migration,
    Seed,
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Migration => write!(f, "migration"),
            Self::Seed => write!(f, "seed"),
        }
    }
}

/// A migration or seed unit that a runner executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedUnit {
    pub name: String,
    pub file: PathBuf,
}

/// Everything a runner is constructed from.
pub struct RunContext<Conn> {
    pub options: RunnerOptions,
    pub connection: Arc<Conn>,
    /// Handed to units as their run-time parameters.
    pub registry: Arc<ModelRegistry>,
}

impl<Conn> Clone for RunContext<Conn> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            connection: Arc::clone(&self.connection),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// A runner instance, used for exactly one directional call.
#[async_trait]
pub trait MigrationRunner: Send {
    async fn up(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>>;

    async fn down(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>>;
}

/// Builds runners for a connection type.
pub trait RunnerFactory<Conn>: Send + Sync {
    fn create(&self, context: RunContext<Conn>) -> LoaderResult<Box<dyn MigrationRunner>>;
}

/// Turns unit names into [`ExecutedUnit`]s under the configured directory.
pub(crate) struct UnitNamer {
    path: PathBuf,
    pattern: Regex,
}

impl UnitNamer {
    pub(crate) fn new(options: &RunnerOptions) -> LoaderResult<Self> {
        let pattern = Regex::new(&options.pattern).map_err(|e| LoaderError::UnitPattern {
            pattern: options.pattern.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: options.path.clone(),
            pattern,
        })
    }

    /// Names outside the pattern still run; they are only warned about.
    pub(crate) fn unit(&self, name: &str) -> ExecutedUnit {
        if !self.pattern.is_match(name) {
            tracing::warn!(
                unit = %name,
                pattern = %self.pattern,
                "unit name does not match the configured pattern"
            );
        }
        ExecutedUnit {
            name: name.to_string(),
            file: self.path.join(format!("{name}.rs")),
        }
    }
}

/// Build a runner, move it in `direction`, and log each executed unit.
///
/// Up runs unbounded; down rewinds to the beginning. Runner errors are
/// returned unchanged.
pub async fn run_directional<Conn>(
    kind: RunKind,
    factory: &dyn RunnerFactory<Conn>,
    context: RunContext<Conn>,
    direction: Direction,
) -> LoaderResult<Vec<ExecutedUnit>> {
    let mut runner = factory.create(context)?;
    let executed = match direction {
        Direction::Up => runner.up(Target::Unbounded).await?,
        Direction::Down => runner.down(Target::Beginning).await?,
    };

    for unit in &executed {
        tracing::info!(
            kind = %kind,
            direction = %direction,
            file = %unit.file.display(),
            "== {kind} {direction}: {}",
            unit.name
        );
    }
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::internal::error::LoaderError;

    #[test]
    fn test_direction_normalize() {
        assert_eq!(Direction::normalize("down"), Direction::Down);
        assert_eq!(Direction::normalize("up"), Direction::Up);
        assert_eq!(Direction::normalize("DOWN"), Direction::Up);
        assert_eq!(Direction::normalize(""), Direction::Up);
        assert_eq!(Direction::from("sideways"), Direction::Up);
    }

    /// Records which runner method was called with which target.
    struct Recording {
        calls: Arc<Mutex<Vec<(Direction, Target)>>>,
        units: Vec<ExecutedUnit>,
    }

    #[async_trait]
    impl MigrationRunner for Recording {
        async fn up(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
            self.calls.lock().unwrap().push((Direction::Up, target));
            Ok(self.units.clone())
        }

        async fn down(&mut self, target: Target) -> LoaderResult<Vec<ExecutedUnit>> {
            self.calls.lock().unwrap().push((Direction::Down, target));
            Ok(self.units.iter().rev().cloned().collect())
        }
    }

    struct RecordingFactory {
        calls: Arc<Mutex<Vec<(Direction, Target)>>>,
        created: Arc<Mutex<usize>>,
        fail: bool,
    }

    impl RunnerFactory<()> for RecordingFactory {
        fn create(&self, context: RunContext<()>) -> LoaderResult<Box<dyn MigrationRunner>> {
            if self.fail {
                return Err(LoaderError::Database(sea_orm::DbErr::Migration(
                    "missing migrations directory".to_string(),
                )));
            }
            *self.created.lock().unwrap() += 1;
            let units = ["m20240101_000001_users", "m20240101_000002_posts"]
                .iter()
                .map(|name| ExecutedUnit {
                    name: name.to_string(),
                    file: context.options.path.join(format!("{name}.rs")),
                })
                .collect();
            Ok(Box::new(Recording {
                calls: Arc::clone(&self.calls),
                units,
            }))
        }
    }

    fn context() -> RunContext<()> {
        RunContext {
            options: RunnerOptions::migrations(),
            connection: Arc::new(()),
            registry: Arc::new(ModelRegistry::new()),
        }
    }

    fn factory(fail: bool) -> RecordingFactory {
        RecordingFactory {
            calls: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(Mutex::new(0)),
            fail,
        }
    }

    #[tokio::test]
    async fn test_up_runs_unbounded() {
        let factory = factory(false);
        let executed = run_directional(RunKind::Migration, &factory, context(), Direction::Up)
            .await
            .unwrap();

        assert_eq!(executed.len(), 2);
        assert_eq!(
            *factory.calls.lock().unwrap(),
            vec![(Direction::Up, Target::Unbounded)]
        );
    }

    #[tokio::test]
    async fn test_down_rewinds_to_beginning() {
        let factory = factory(false);
        let executed = run_directional(RunKind::Seed, &factory, context(), Direction::Down)
            .await
            .unwrap();

        assert_eq!(executed[0].name, "m20240101_000002_posts");
        assert_eq!(
            *factory.calls.lock().unwrap(),
            vec![(Direction::Down, Target::Beginning)]
        );
    }

    #[tokio::test]
    async fn test_each_call_builds_a_fresh_runner() {
        let factory = factory(false);
        for direction in [Direction::Up, Direction::Down, Direction::Up] {
            run_directional(RunKind::Migration, &factory, context(), direction)
                .await
                .unwrap();
        }
        assert_eq!(*factory.created.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_factory_error_propagates() {
        let factory = factory(true);
        let err = run_directional(RunKind::Migration, &factory, context(), Direction::Up)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Database(sea_orm::DbErr::Migration(ref m)) if m == "missing migrations directory"
        ));
    }
}
