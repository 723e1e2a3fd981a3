//! Command-line interface for fixturegen
//!
//! # Usage Examples
//!
//! ## Generate
//! ```bash
//! # One pretty-printed customer
//! fixturegen generate --schema catalog.yaml --type Customer --pretty
//!
//! # 100 orders, reproducible, with settings from a file
//! fixturegen generate --schema catalog.yaml --type Order \
//!   --count 100 --seed 42 --reference-date 2025-01-01 --config fixtures.yaml
//!
//! # Collections of catalog types
//! fixturegen generate --schema catalog.yaml --type "map<string, list<Order>>"
//! ```
//!
//! ## Inspect
//! ```bash
//! fixturegen describe --schema catalog.yaml --type Tree
//! fixturegen check --schema catalog.yaml
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=fixture_generator=trace`.

use clap::{Parser, Subcommand};
use fixturegen::{GenerateOpts, SchemaOpts};
use std::io::Write;

#[derive(Parser)]
#[command(name = "fixturegen")]
#[command(about = "Seeded random test fixtures for types described in a YAML catalog")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate instances of a type as JSON, one document per line
    Generate {
        #[command(flatten)]
        opts: GenerateOpts,
    },

    /// Print a catalog type as YAML
    Describe {
        #[command(flatten)]
        schema: SchemaOpts,

        /// Catalog type name
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        type_name: String,
    },

    /// Validate a catalog and report recursive types
    Check {
        #[command(flatten)]
        schema: SchemaOpts,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { opts } => {
            let catalog = fixturegen::load_catalog(&opts.schema.schema)?;
            let documents = fixturegen::generate_documents(&catalog, &opts)?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for document in &documents {
                writeln!(out, "{document}")?;
            }
            tracing::info!("Generated {} instance(s) of '{}'", documents.len(), opts.type_expr);
        }
        Commands::Describe { schema, type_name } => {
            let catalog = fixturegen::load_catalog(&schema.schema)?;
            print!("{}", fixturegen::describe_type(&catalog, &type_name)?);
        }
        Commands::Check { schema } => {
            let catalog = fixturegen::load_catalog(&schema.schema)?;
            println!("{}", fixturegen::check_catalog(&catalog));
        }
    }

    Ok(())
}
