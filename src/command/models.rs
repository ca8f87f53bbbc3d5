//! Lists the registered models, their resolved associations, and any skipped definition files.

use std::fmt::Write as _;

use clap::Parser;

use super::LoadArgs;
use crate::internal::error::LoaderResult;
use crate::internal::loader::SkippedFile;
use crate::internal::model::ModelRegistry;

#[derive(Parser, Debug)]
pub struct ModelsArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

pub async fn execute(args: ModelsArgs) -> LoaderResult<()> {
    let loaded = args.load.load().await?;
    print!("{}", render_models(loaded.models(), loaded.skipped()));
    Ok(())
}

pub fn render_models(registry: &ModelRegistry, skipped: &[SkippedFile]) -> String {
    let mut out = String::new();
    if registry.is_empty() {
        out.push_str("No models registered\n");
    }
    for model in registry {
        let _ = writeln!(out, "{} ({})", model.name(), model.table());
        for association in model.associations() {
            let _ = write!(out, "  {} {}", association.kind, association.target);
            if let Some(alias) = &association.alias {
                let _ = write!(out, " as {alias}");
            }
            if let Some(through) = &association.through {
                let _ = write!(out, " through {through}");
            }
            let _ = writeln!(
                out,
                " [{} -> {}]",
                association.foreign_key, association.references
            );
        }
    }
    if !skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped {} file(s):", skipped.len());
        for file in skipped {
            let _ = writeln!(out, "  {}: {}", file.path.display(), file.reason);
        }
    }
    out
}
