//! Declarative model definition files (TOML or JSON) and their importer.

use std::path::Path;

use sea_orm::DbBackend;
use serde::{Deserialize, Serialize};

use super::{AssociationDef, FieldDef, ModelHandle, ModelImporter, snake_case};
use crate::internal::db::BackendInfo;
use crate::internal::error::{LoaderError, LoaderResult};

/// Contents of one model definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    /// Defaults to the snake_case plural of `name`.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

impl ModelDefinition {
    /// Parse `content`, picking the format from the extension of `path`.
    pub fn parse(path: &Path, content: &str) -> LoaderResult<Self> {
        let invalid = |message: String| LoaderError::Definition {
            path: path.to_path_buf(),
            message,
        };

        let definition: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(content).map_err(|e| invalid(e.to_string()))?,
            Some("json") => serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?,
            _ => return Err(LoaderError::UnsupportedFormat(path.to_path_buf())),
        };

        if definition.name.trim().is_empty() {
            return Err(invalid("model name must not be empty".to_string()));
        }
        Ok(definition)
    }

    pub fn from_file(path: &Path) -> LoaderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    pub fn table_name(&self) -> String {
        self.table
            .clone()
            .unwrap_or_else(|| format!("{}s", snake_case(&self.name)))
    }

    /// Build the model handle. The associate capability is attached only when
    /// the definition declares associations.
    pub fn into_handle(self, backend: Option<DbBackend>) -> ModelHandle {
        let table = self.table_name();
        let handle = ModelHandle::new(self.name, table)
            .with_fields(self.fields)
            .bound_to(backend);

        if self.associations.is_empty() {
            return handle;
        }
        let declared = self.associations;
        handle.with_associate(move |model, registry| {
            declared
                .iter()
                .map(|def| def.resolve(model, registry))
                .collect()
        })
    }
}

/// Imports [`ModelDefinition`] files and binds them to the connection's backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionImporter;

impl<Conn> ModelImporter<Conn> for DefinitionImporter
where
    Conn: BackendInfo + Send + Sync,
{
    fn import(&self, path: &Path, connection: &Conn) -> LoaderResult<ModelHandle> {
        let definition = ModelDefinition::from_file(path)?;
        Ok(definition.into_handle(connection.backend()))
    }
}
