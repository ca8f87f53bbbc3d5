//! Model handles, their associations, and the registry they are collected into.

pub mod association;
pub mod definition;
pub mod registry;
pub mod schema;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sea_orm::DbBackend;
use serde::{Deserialize, Serialize};

use crate::internal::error::LoaderResult;

pub use association::{Association, AssociationDef, AssociationKind};
pub use definition::{DefinitionImporter, ModelDefinition};
pub use registry::ModelRegistry;

/// Declares a model's relationships once every model is registered.
pub type AssociateFn =
    Arc<dyn Fn(&ModelHandle, &ModelRegistry) -> LoaderResult<Vec<Association>> + Send + Sync>;

/// Turns one discovered file into a model bound to the active connection.
pub trait ModelImporter<Conn>: Send + Sync {
    fn import(&self, path: &Path, connection: &Conn) -> LoaderResult<ModelHandle>;
}

/// Column type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    BigInteger,
    String,
    Text,
    Boolean,
    Float,
    Double,
    Timestamp,
    Uuid,
    Json,
    Binary,
}

/// One column of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key: false,
            nullable: false,
            unique: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A loaded model: one persisted entity type plus its relationships.
///
/// The associate capability is optional. Models without it are registered
/// but skipped by the association pass.
#[derive(Clone)]
pub struct ModelHandle {
    name: String,
    table: String,
    fields: Vec<FieldDef>,
    backend: Option<DbBackend>,
    associate: Option<AssociateFn>,
    associations: Vec<Association>,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            backend: None,
            associate: None,
            associations: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_associate<F>(mut self, associate: F) -> Self
    where
        F: Fn(&ModelHandle, &ModelRegistry) -> LoaderResult<Vec<Association>>
            + Send
            + Sync
            + 'static,
    {
        self.associate = Some(Arc::new(associate));
        self
    }

    /// Bind the model to the SQL backend of the connection it was loaded for.
    pub fn bound_to(mut self, backend: Option<DbBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn backend(&self) -> Option<DbBackend> {
        self.backend
    }

    pub fn associate(&self) -> Option<&AssociateFn> {
        self.associate.as_ref()
    }

    /// Relationships resolved by the association pass.
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Look up a resolved association by alias, falling back to the target name.
    pub fn association(&self, key: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|a| a.alias.as_deref() == Some(key))
            .or_else(|| self.associations.iter().find(|a| a.target == key))
    }

    /// Name of the primary key column, `id` when none is declared.
    pub fn primary_key(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.primary_key)
            .map(|f| f.name.as_str())
            .unwrap_or("id")
    }

    pub(crate) fn set_associations(&mut self, associations: Vec<Association>) {
        self.associations = associations;
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("fields", &self.fields)
            .field("backend", &self.backend)
            .field("associate", &self.associate.is_some())
            .field("associations", &self.associations)
            .finish()
    }
}

/// `PostTag` -> `post_tag`, `HTTPRequest` -> `http_request`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("PostTag"), "post_tag");
        assert_eq!(snake_case("HTTPRequest"), "http_request");
        assert_eq!(snake_case("Order2Item"), "order2_item");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_primary_key_defaults_to_id() {
        let model = ModelHandle::new("User", "users");
        assert_eq!(model.primary_key(), "id");

        let model = ModelHandle::new("Tag", "tags")
            .with_fields(vec![FieldDef::new("slug", FieldKind::String).primary_key()]);
        assert_eq!(model.primary_key(), "slug");
    }

    #[test]
    fn test_associate_capability_is_optional() {
        let plain = ModelHandle::new("User", "users");
        assert!(plain.associate().is_none());

        let wired = ModelHandle::new("User", "users").with_associate(|_, _| Ok(Vec::new()));
        assert!(wired.associate().is_some());
        assert!(format!("{wired:?}").contains("associate: true"));
    }
}
