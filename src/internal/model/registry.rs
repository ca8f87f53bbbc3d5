//! Registry mapping model names to loaded model handles.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::Index;

use super::ModelHandle;
use crate::internal::error::LoaderResult;

/// Name-to-model mapping built fresh by every load.
///
/// Iteration order is by model name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its declared name. The last model registered
    /// under a name wins; the replaced handle is returned.
    pub fn insert(&mut self, model: ModelHandle) -> Option<ModelHandle> {
        let name = model.name().to_string();
        let replaced = self.models.insert(name.clone(), model);
        if replaced.is_some() {
            tracing::warn!(model = %name, "overwriting previously registered model");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&ModelHandle> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, ModelHandle> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Invoke every model's associate capability once, with the whole
    /// registry in view.
    ///
    /// The first failure stops the pass: models later in iteration order are
    /// not associated, and nothing resolved so far is applied.
    pub fn resolve_associations(&mut self) -> LoaderResult<()> {
        let mut resolved = Vec::new();
        for model in self.models.values() {
            if let Some(associate) = model.associate() {
                let associations = associate(model, self)?;
                tracing::debug!(
                    model = %model.name(),
                    count = associations.len(),
                    "resolved associations"
                );
                resolved.push((model.name().to_string(), associations));
            }
        }

        for (name, associations) in resolved {
            if let Some(model) = self.models.get_mut(&name) {
                model.set_associations(associations);
            }
        }
        Ok(())
    }
}

impl Index<&str> for ModelRegistry {
    type Output = ModelHandle;

    fn index(&self, name: &str) -> &ModelHandle {
        self.get(name)
            .unwrap_or_else(|| panic!("model `{name}` is not registered"))
    }
}

impl<'a> IntoIterator for &'a ModelRegistry {
    type Item = &'a ModelHandle;
    type IntoIter = btree_map::Values<'a, String, ModelHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::internal::error::LoaderError;
    use crate::internal::model::{Association, AssociationDef, AssociationKind};

    fn belongs_to(
        target: &'static str,
    ) -> impl Fn(&ModelHandle, &ModelRegistry) -> LoaderResult<Vec<Association>> + Send + Sync + 'static
    {
        move |model, registry| {
            Ok(vec![
                AssociationDef::new(AssociationKind::BelongsTo, target).resolve(model, registry)?,
            ])
        }
    }

    #[test]
    fn test_last_registered_wins() {
        let mut registry = ModelRegistry::new();
        assert!(registry.insert(ModelHandle::new("User", "users")).is_none());
        let replaced = registry.insert(ModelHandle::new("User", "accounts"));

        assert_eq!(replaced.unwrap().table(), "users");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry["User"].table(), "accounts");
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = ModelRegistry::new();
        registry.insert(ModelHandle::new("Post", "posts"));
        registry.insert(ModelHandle::new("Comment", "comments"));
        registry.insert(ModelHandle::new("User", "users"));

        assert_eq!(registry.names(), vec!["Comment", "Post", "User"]);
    }

    #[test]
    fn test_cyclic_associations_resolve() {
        let mut registry = ModelRegistry::new();
        registry.insert(ModelHandle::new("A", "a").with_associate(belongs_to("B")));
        registry.insert(ModelHandle::new("B", "b").with_associate(belongs_to("A")));

        registry.resolve_associations().unwrap();
        assert_eq!(registry["A"].associations()[0].target, "B");
        assert_eq!(registry["B"].associations()[0].target, "A");
    }

    #[test]
    fn test_models_without_associate_are_skipped() {
        let mut registry = ModelRegistry::new();
        registry.insert(ModelHandle::new("Plain", "plain"));
        registry.insert(ModelHandle::new("Wired", "wired").with_associate(belongs_to("Plain")));

        registry.resolve_associations().unwrap();
        assert!(registry["Plain"].associations().is_empty());
        assert_eq!(registry["Wired"].associations().len(), 1);
    }

    #[test]
    fn test_associate_runs_once_per_model() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModelRegistry::new();
        for name in ["A", "B", "C"] {
            let calls = Arc::clone(&calls);
            registry.insert(ModelHandle::new(name, name).with_associate(move |model, registry| {
                assert_eq!(registry.len(), 3);
                calls.lock().unwrap().push(model.name().to_string());
                Ok(Vec::new())
            }));
        }

        registry.resolve_associations().unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_associate_error_stops_the_pass() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModelRegistry::new();
        let record = |calls: &Arc<Mutex<Vec<String>>>| {
            let calls = Arc::clone(calls);
            move |model: &ModelHandle, _: &ModelRegistry| -> LoaderResult<Vec<Association>> {
                calls.lock().unwrap().push(model.name().to_string());
                Ok(Vec::new())
            }
        };
        registry.insert(ModelHandle::new("A", "a").with_associate(record(&calls)));
        registry.insert(ModelHandle::new("B", "b").with_associate(belongs_to("Missing")));
        registry.insert(ModelHandle::new("C", "c").with_associate(record(&calls)));

        let err = registry.resolve_associations().unwrap_err();
        assert!(matches!(err, LoaderError::UnknownModel { .. }));
        assert_eq!(*calls.lock().unwrap(), vec!["A"]);
    }
}
