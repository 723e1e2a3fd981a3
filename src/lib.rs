//! fixturegen library
//!
//! Seeded random test fixtures for types described in a YAML catalog.
//!
//! # Crates
//!
//! - `fixture_core` - type model, generated values and the YAML catalog
//! - `fixture_generator` - registry chain, default randomizers and the
//!   population engine
//! - `fixture_validation` - constraint tag randomizers
//!
//! # CLI Usage
//!
//! ```bash
//! # Three orders as JSON lines
//! fixturegen generate --schema catalog.yaml --type Order --count 3
//!
//! # Describe a type
//! fixturegen describe --schema catalog.yaml --type Order
//!
//! # Validate a catalog
//! fixturegen check --schema catalog.yaml
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use fixture_core::{TypeCatalog, TypeDefinition, TypeRef};
use fixture_generator::{ConfigFile, Configuration, PopulationEngine};
use fixture_validation::ValidationRegistry;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Catalog location shared by every command.
#[derive(Args, Clone, Debug)]
pub struct SchemaOpts {
    /// Path to the type catalog YAML file
    #[arg(long, short = 's', env = "FIXTUREGEN_SCHEMA")]
    pub schema: PathBuf,
}

/// Options of the `generate` command.
#[derive(Args, Clone, Debug)]
pub struct GenerateOpts {
    #[command(flatten)]
    pub schema: SchemaOpts,

    /// Type to generate: a catalog name or an expression like `list<Order>`
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub type_expr: String,

    /// Number of instances to generate
    #[arg(long, short = 'n', default_value = "1")]
    pub count: usize,

    /// Random seed (overrides the configuration file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Generation settings YAML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum nesting depth of composites (overrides the configuration file)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Date `past` / `future` constraints are relative to, as YYYY-MM-DD.
    /// Defaults to today, so pin it for output reproducible across days.
    #[arg(long, value_name = "DATE")]
    pub reference_date: Option<NaiveDate>,

    /// Ignore constraint tags on fields
    #[arg(long)]
    pub no_constraints: bool,

    /// Pretty-print each JSON document
    #[arg(long)]
    pub pretty: bool,
}

/// Load and validate a catalog file.
pub fn load_catalog(path: &Path) -> anyhow::Result<TypeCatalog> {
    TypeCatalog::from_file(path)
        .with_context(|| format!("Failed to load type catalog from {path:?}"))
}

/// Build the session configuration: file settings first, then flags.
pub fn build_configuration(opts: &GenerateOpts) -> anyhow::Result<Configuration> {
    let mut builder = Configuration::builder();
    if let Some(path) = &opts.config {
        let file = ConfigFile::from_file(path)
            .with_context(|| format!("Failed to load configuration from {path:?}"))?;
        builder = file
            .apply(builder)
            .with_context(|| format!("Invalid configuration in {path:?}"))?;
    }
    if let Some(seed) = opts.seed {
        builder = builder.seed(seed);
    }
    if let Some(depth) = opts.max_depth {
        builder = builder.max_depth(depth);
    }
    if let Some(date) = opts.reference_date {
        builder = builder.reference_date(date);
    }
    Ok(builder.build()?)
}

/// Generate `opts.count` instances and render each as a JSON document.
pub fn generate_documents(
    catalog: &TypeCatalog,
    opts: &GenerateOpts,
) -> anyhow::Result<Vec<String>> {
    let type_ref: TypeRef = opts
        .type_expr
        .parse()
        .with_context(|| format!("Invalid type '{}'", opts.type_expr))?;
    anyhow::ensure!(
        catalog.contains_ref(&type_ref),
        "Type '{type_ref}' references names missing from the catalog"
    );

    let config = build_configuration(opts)?;
    tracing::debug!(
        "Generating {} instance(s) of '{type_ref}' with seed {}",
        opts.count,
        config.seed()
    );

    let mut engine = PopulationEngine::new(catalog, config);
    if !opts.no_constraints {
        engine = engine.with_registry(fixture_validation::PRIORITY, ValidationRegistry::new());
    }

    let mut documents = Vec::with_capacity(opts.count);
    for (idx, result) in engine.generate_n(&type_ref, opts.count).enumerate() {
        let value = result.with_context(|| format!("Failed to generate instance {idx}"))?;
        let json = value.to_json();
        let rendered = if opts.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        documents.push(rendered);
    }
    Ok(documents)
}

#[derive(Serialize)]
struct TypeDescription<'a> {
    #[serde(flatten)]
    definition: &'a TypeDefinition,
    recursive: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    implementors: Vec<&'a str>,
}

/// Render a catalog type as YAML.
pub fn describe_type(catalog: &TypeCatalog, name: &str) -> anyhow::Result<String> {
    let definition = catalog
        .get(name)
        .with_context(|| format!("Type '{name}' is not defined in the catalog"))?;
    let description = TypeDescription {
        definition,
        recursive: catalog.is_recursive(name),
        implementors: catalog.implementors(name),
    };
    Ok(serde_yaml::to_string(&description)?)
}

/// Outcome of `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub type_count: usize,
    pub recursive: Vec<String>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog OK: {} type(s)", self.type_count)?;
        if self.recursive.is_empty() {
            write!(f, "No recursive types")
        } else {
            write!(
                f,
                "Recursive types (bounded by max_depth): {}",
                self.recursive.join(", ")
            )
        }
    }
}

/// Summarise an already validated catalog.
pub fn check_catalog(catalog: &TypeCatalog) -> CheckReport {
    CheckReport {
        type_count: catalog.names().len(),
        recursive: catalog
            .recursive_types()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}
