//! Declared and resolved relationships between models.

use serde::{Deserialize, Serialize};

use super::{ModelHandle, ModelRegistry, snake_case};
use crate::internal::error::{LoaderError, LoaderResult};

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    ManyToMany,
}

impl std::fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BelongsTo => write!(f, "belongs_to"),
            Self::HasOne => write!(f, "has_one"),
            Self::HasMany => write!(f, "has_many"),
            Self::ManyToMany => write!(f, "many_to_many"),
        }
    }
}

/// A relationship as written in a model definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDef {
    pub kind: AssociationKind,
    /// Declared name of the other model.
    pub target: String,
    #[serde(default)]
    pub foreign_key: Option<String>,
    /// Join model, many_to_many only.
    #[serde(default)]
    pub through: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// A relationship checked against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub kind: AssociationKind,
    pub source: String,
    pub target: String,
    pub target_table: String,
    pub foreign_key: String,
    /// Column the foreign key points at.
    pub references: String,
    pub through: Option<String>,
    pub alias: Option<String>,
}

impl AssociationDef {
    pub fn new(kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            foreign_key: None,
            through: None,
            alias: None,
        }
    }

    /// Resolve against the registry on behalf of `source`.
    ///
    /// Only looks the target up; neither model is traversed, so cycles are fine.
    pub fn resolve(
        &self,
        source: &ModelHandle,
        registry: &ModelRegistry,
    ) -> LoaderResult<Association> {
        let target = registry
            .get(&self.target)
            .ok_or_else(|| LoaderError::UnknownModel {
                model: source.name().to_string(),
                target: self.target.clone(),
            })?;

        match (self.kind, &self.through) {
            (AssociationKind::ManyToMany, None) => {
                return Err(LoaderError::InvalidAssociation {
                    model: source.name().to_string(),
                    message: format!("many_to_many with `{}` needs `through`", self.target),
                });
            }
            (AssociationKind::ManyToMany, Some(through)) if !registry.contains(through) => {
                return Err(LoaderError::UnknownModel {
                    model: source.name().to_string(),
                    target: through.clone(),
                });
            }
            (kind, Some(_)) if kind != AssociationKind::ManyToMany => {
                return Err(LoaderError::InvalidAssociation {
                    model: source.name().to_string(),
                    message: format!("`through` is only valid for many_to_many, not {kind}"),
                });
            }
            _ => {}
        }

        let (foreign_key, references) = match self.kind {
            AssociationKind::BelongsTo => (
                format!("{}_id", snake_case(target.name())),
                target.primary_key().to_string(),
            ),
            _ => (
                format!("{}_id", snake_case(source.name())),
                source.primary_key().to_string(),
            ),
        };

        Ok(Association {
            kind: self.kind,
            source: source.name().to_string(),
            target: target.name().to_string(),
            target_table: target.table().to_string(),
            foreign_key: self.foreign_key.clone().unwrap_or(foreign_key),
            references,
            through: self.through.clone(),
            alias: self.alias.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[(&str, &str)]) -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        for (name, table) in names {
            registry.insert(ModelHandle::new(*name, *table));
        }
        registry
    }

    #[test]
    fn test_belongs_to_defaults() {
        let registry = registry(&[("User", "users"), ("BlogPost", "blog_posts")]);
        let post = &registry["BlogPost"];

        let assoc = AssociationDef::new(AssociationKind::BelongsTo, "User")
            .resolve(post, &registry)
            .unwrap();
        assert_eq!(assoc.foreign_key, "user_id");
        assert_eq!(assoc.references, "id");
        assert_eq!(assoc.target_table, "users");
        assert_eq!(assoc.source, "BlogPost");
    }

    #[test]
    fn test_has_many_uses_source_key() {
        let registry = registry(&[("User", "users"), ("BlogPost", "blog_posts")]);
        let user = &registry["User"];

        let mut def = AssociationDef::new(AssociationKind::HasMany, "BlogPost");
        def.alias = Some("posts".to_string());
        let assoc = def.resolve(user, &registry).unwrap();
        assert_eq!(assoc.foreign_key, "user_id");
        assert_eq!(assoc.alias.as_deref(), Some("posts"));
    }

    #[test]
    fn test_explicit_foreign_key_wins() {
        let registry = registry(&[("User", "users"), ("Post", "posts")]);
        let mut def = AssociationDef::new(AssociationKind::BelongsTo, "User");
        def.foreign_key = Some("author_id".to_string());

        let assoc = def.resolve(&registry["Post"], &registry).unwrap();
        assert_eq!(assoc.foreign_key, "author_id");
    }

    #[test]
    fn test_unknown_target() {
        let registry = registry(&[("Post", "posts")]);
        let err = AssociationDef::new(AssociationKind::BelongsTo, "User")
            .resolve(&registry["Post"], &registry)
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::UnknownModel { ref model, ref target } if model == "Post" && target == "User"
        ));
    }

    #[test]
    fn test_many_to_many_requires_registered_through() {
        let registry = registry(&[("Post", "posts"), ("Tag", "tags")]);
        let post = &registry["Post"];

        let err = AssociationDef::new(AssociationKind::ManyToMany, "Tag")
            .resolve(post, &registry)
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidAssociation { .. }));

        let mut def = AssociationDef::new(AssociationKind::ManyToMany, "Tag");
        def.through = Some("PostTag".to_string());
        let err = def.resolve(post, &registry).unwrap_err();
        assert!(matches!(err, LoaderError::UnknownModel { ref target, .. } if target == "PostTag"));
    }

    #[test]
    fn test_through_rejected_outside_many_to_many() {
        let registry = registry(&[("Post", "posts"), ("Tag", "tags")]);
        let mut def = AssociationDef::new(AssociationKind::HasMany, "Tag");
        def.through = Some("Post".to_string());

        let err = def.resolve(&registry["Post"], &registry).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidAssociation { .. }));
    }
}
