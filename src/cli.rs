//! CLI entry for modelwire, defining clap subcommands and dispatching each command handler.

use clap::{Parser, Subcommand};

use crate::command;
use crate::internal::error::{LoaderError, LoaderResult};

// The Cli struct represents the root of the command line interface.
#[derive(Parser, Debug)]
#[command(
    name = "modelwire",
    about = "Load model definitions and inspect what they wire up",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands; their args and execute functions live in the `command` module.
#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Load models and list them with their associations")]
    Models(command::models::ModelsArgs),
    #[command(about = "Load models and print their CREATE TABLE statements")]
    Schema(command::schema::SchemaArgs),
}

/// - Caution: This is a `synchronous` function, it's declared as `async` to be able to use `[tokio::main]`
/// - `args`: parse from command line if it's `None`, otherwise parse from the given args
#[tokio::main]
pub async fn parse(args: Option<&[&str]>) -> LoaderResult<()> {
    parse_async(args).await
}

/// `async` version of the [parse] function
pub async fn parse_async(args: Option<&[&str]>) -> LoaderResult<()> {
    let args = match args {
        Some(args) => {
            Cli::try_parse_from(args).map_err(|e| LoaderError::InvalidArgument(e.to_string()))?
        }
        None => Cli::parse(),
    };
    match args.command {
        Commands::Models(args) => command::models::execute(args).await,
        Commands::Schema(args) => command::schema::execute(args).await,
    }
}

/// this test is to verify that the CLI can be built without panicking
/// according [clap dock](https://docs.rs/clap/latest/clap/_derive/_tutorial/chapter_4/index.html)
#[test]
fn verify_cli() {
    use clap::CommandFactory;

    Cli::command().debug_assert()
}
