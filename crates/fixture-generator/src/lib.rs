//! Population engine for the fixturegen framework.
//!
//! This crate turns a type description into a fully populated, seeded
//! random instance. Values come from a priority-ordered chain of provider
//! tables; types no provider answers for are decomposed and populated
//! recursively.
//!
//! # Architecture
//!
//! ```text
//!  TypeRef ──► TypeIntrospector ──► TypeDescriptor
//!                                         │
//!                                         ▼
//! ┌──────────────────────┐      ┌───────────────────┐
//! │   PopulationEngine   │─────►│   RegistryChain   │
//! │                      │      │                   │
//! │  - config            │      │  -100 overrides   │
//! │  - rng (StdRng)      │      │    -2 validation  │
//! │  - TraversalContext  │      │   100 defaults    │
//! └──────────┬───────────┘      └───────────────────┘
//!            │
//!            ▼
//!     Value::Object { type_name, fields }
//! ```
//!
//! # Example
//!
//! ```rust
//! use fixture_core::{TypeCatalog, TypeRef};
//! use fixture_generator::{Configuration, PopulationEngine};
//!
//! let catalog = TypeCatalog::from_yaml(r#"
//! types:
//!   - name: User
//!     fields:
//!       - { name: id, type: uuid }
//!       - { name: name, type: string }
//!       - { name: tags, type: "list<string>" }
//! "#).unwrap();
//!
//! let config = Configuration::builder().seed(7).build().unwrap();
//! let mut engine = PopulationEngine::new(&catalog, config);
//! let user = engine.generate(&TypeRef::named("User")).unwrap();
//! assert_eq!(user.type_name(), Some("User"));
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod introspect;
pub mod provider;
pub mod randomizers;
pub mod registry;

// Re-exports for convenience
pub use config::{
    Charset, ConfigFile, Configuration, ConfigurationBuilder, CyclePolicy, FieldContext,
    FieldPredicate, SizeRange, DEFAULT_MAX_DEPTH, DEFAULT_SEED,
};
pub use context::TraversalContext;
pub use engine::{generate, Generated, PopulationEngine};
pub use error::{ConfigError, GenerationError, IntrospectionError, ProviderError};
pub use introspect::TypeIntrospector;
pub use provider::{
    provider_fn, ConstantProvider, FnProvider, ProvideRequest, Provider, ProviderTable, TypeKey,
};
pub use randomizers::DefaultRegistry;
pub use registry::{
    priority, MatchKind, OverrideRegistry, RandomizerRegistry, RegistryChain, Resolution,
    StaticRegistry,
};
