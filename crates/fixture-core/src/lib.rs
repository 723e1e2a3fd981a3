//! Core types for the fixturegen framework.
//!
//! This crate provides the foundational types shared by the generator and
//! by provider tables:
//!
//! - [`TypeRef`] - Declared type of a field, as written in a schema
//! - [`TypeDescriptor`] - One-level decomposition of a type
//! - [`FieldDescriptor`] / [`ConstraintTag`] - Composite fields and their tags
//! - [`Value`] - Generated instance tree
//! - [`TypeCatalog`] - Named type definitions loaded from YAML or built in code
//!
//! # Architecture
//!
//! ```text
//! fixture-core (this crate)
//!    │
//!    ├─── fixture-generator   (registry chain + population engine)
//!    │
//!    └─── fixture-validation  (constraint tag provider table)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fixture_core::{FieldDescriptor, ScalarType, TypeCatalog, TypeDefinition, TypeRef};
//!
//! let catalog = TypeCatalog::new()
//!     .with_type(
//!         TypeDefinition::composite("Node")
//!             .field(FieldDescriptor::new("value", ScalarType::I32))
//!             .field(FieldDescriptor::new("next", TypeRef::named("Node"))),
//!     )
//!     .unwrap();
//!
//! assert!(catalog.is_recursive("Node"));
//! ```

pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use schema::{DefinitionKind, SchemaError, TypeCatalog, TypeDefinition};
pub use types::{
    supertype, ConstraintTag, FieldDescriptor, ScalarType, TypeDescriptor, TypeKind,
    TypeParseError, TypeRef,
};
pub use values::Value;
