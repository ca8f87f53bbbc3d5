use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend};
use url::Url;

use crate::internal::config::{Dialect, DialectOptions, LoaderConfig};
use crate::internal::error::{LoaderError, LoaderResult};
use crate::utils::path;

/// Where and how to connect, resolved from a [`LoaderConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectTarget {
    /// A full connection string, with driver options as secondary parameters.
    Url { url: String, options: DialectOptions },
    /// Positional credentials taken from `connection_options`.
    Parts {
        database: Option<String>,
        username: Option<String>,
        password: Option<String>,
        options: DialectOptions,
    },
}

impl ConnectTarget {
    /// The connection string wins when present; otherwise the credentials
    /// in `connection_options` are used. Relative sqlite files are taken
    /// from `working_dir`; a connection string is passed through as written.
    pub fn from_config(config: &LoaderConfig, working_dir: &Path) -> LoaderResult<Self> {
        if let Some(url) = &config.connection_string {
            let options = config
                .connection_options
                .as_ref()
                .map(|o| o.options.clone())
                .unwrap_or_default();
            return Ok(Self::Url {
                url: url.clone(),
                options,
            });
        }

        let connection = config
            .connection_options
            .as_ref()
            .ok_or(LoaderError::MissingConnection)?;
        let mut options = connection.options.clone();
        let mut database = connection.database.clone();
        if options.dialect == Dialect::Sqlite {
            if let Some(storage) = &options.storage {
                options.storage = Some(path::resolve(storage, working_dir)?);
            }
            database = database
                .map(|file| sqlite_file(file, working_dir))
                .transpose()?;
        }
        Ok(Self::Parts {
            database,
            username: connection.username.clone(),
            password: connection.password.clone(),
            options,
        })
    }

    pub fn options(&self) -> &DialectOptions {
        match self {
            Self::Url { options, .. } | Self::Parts { options, .. } => options,
        }
    }

    /// Database URL handed to the ORM.
    pub fn url(&self) -> LoaderResult<String> {
        match self {
            Self::Url { url, .. } => Ok(url.clone()),
            Self::Parts {
                database,
                username,
                password,
                options,
            } => match options.dialect {
                Dialect::Sqlite => Ok(sqlite_url(
                    options.storage.as_deref(),
                    database.as_deref(),
                )),
                Dialect::Postgres | Dialect::Mysql => server_url(
                    options,
                    database.as_deref(),
                    username.as_deref(),
                    password.as_deref(),
                ),
            },
        }
    }
}

fn sqlite_file(file: String, working_dir: &Path) -> LoaderResult<String> {
    if file == ":memory:" {
        return Ok(file);
    }
    let resolved = path::resolve(Path::new(&file), working_dir)?;
    Ok(resolved.to_string_lossy().into_owned())
}

fn sqlite_url(storage: Option<&Path>, database: Option<&str>) -> String {
    let file = storage
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| database.map(str::to_string));
    match file.as_deref() {
        None | Some(":memory:") => "sqlite::memory:".to_string(),
        Some(file) => format!("sqlite://{file}?mode=rwc"),
    }
}

fn server_url(
    options: &DialectOptions,
    database: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> LoaderResult<String> {
    let invalid = |what: &str| LoaderError::InvalidConnection(format!("cannot set {what}"));

    let host = options.host.as_deref().unwrap_or("localhost");
    let mut url = Url::parse(&format!("{}://{host}", options.dialect))
        .map_err(|e| LoaderError::InvalidConnection(e.to_string()))?;
    if let Some(username) = username {
        url.set_username(username).map_err(|_| invalid("username"))?;
    }
    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| invalid("password"))?;
    }
    if let Some(port) = options.port {
        url.set_port(Some(port)).map_err(|_| invalid("port"))?;
    }
    if let Some(database) = database {
        url.set_path(&format!("/{database}"));
    }
    Ok(url.to_string())
}

/// Opens the shared database connection for a load.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Send + Sync + 'static;

    async fn connect(&self, target: &ConnectTarget) -> LoaderResult<Self::Connection>;
}

/// Connector backed by `sea_orm::Database`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmConnector;

#[async_trait]
impl Connector for SeaOrmConnector {
    type Connection = DatabaseConnection;

    async fn connect(&self, target: &ConnectTarget) -> LoaderResult<DatabaseConnection> {
        let options = target.options();
        let mut connect_options = ConnectOptions::new(target.url()?);
        connect_options.sqlx_logging(options.logging);
        if let Some(max) = options.max_connections {
            connect_options.max_connections(max);
        }
        if let Some(min) = options.min_connections {
            connect_options.min_connections(min);
        }
        if let Some(secs) = options.connect_timeout_secs {
            connect_options.connect_timeout(Duration::from_secs(secs));
        }

        tracing::debug!(dialect = %options.dialect, "connecting to database");
        Ok(Database::connect(connect_options).await?)
    }
}

/// Reports the SQL backend behind a connection, so models can be bound to it.
pub trait BackendInfo {
    fn backend(&self) -> Option<DbBackend>;
}

impl BackendInfo for DatabaseConnection {
    fn backend(&self) -> Option<DbBackend> {
        Some(self.get_database_backend())
    }
}
