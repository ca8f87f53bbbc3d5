//! Prints the `CREATE TABLE` statements for every loaded model in the connection's dialect.

use clap::Parser;

use super::LoadArgs;
use crate::internal::error::LoaderResult;
use crate::internal::model::ModelRegistry;

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

pub async fn execute(args: SchemaArgs) -> LoaderResult<()> {
    let loaded = args.load.load().await?;
    print!("{}", render_schema(loaded.models()));
    Ok(())
}

/// One statement per bound model; unbound models have no dialect and are left out.
pub fn render_schema(registry: &ModelRegistry) -> String {
    registry
        .iter()
        .filter_map(|model| model.create_table_statement())
        .map(|statement| format!("{};\n", statement.sql))
        .collect()
}

#[cfg(test)]
mod tests {
    use sea_orm::DbBackend;

    use super::*;
    use crate::internal::model::{FieldDef, FieldKind, ModelHandle};

    #[test]
    fn test_render_schema_skips_unbound_models() {
        let mut registry = ModelRegistry::new();
        registry.insert(
            ModelHandle::new("Tag", "tags")
                .with_fields(vec![FieldDef::new("id", FieldKind::Integer).primary_key()])
                .bound_to(Some(DbBackend::Sqlite)),
        );
        registry.insert(ModelHandle::new("Draft", "drafts"));

        let out = render_schema(&registry);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("CREATE TABLE IF NOT EXISTS \"tags\""));
        assert!(out.ends_with(");\n"));
    }
}
