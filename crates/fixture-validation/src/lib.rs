//! Constraint tag randomizers for fixturegen.
//!
//! [`ValidationRegistry`] answers for fields carrying bean-validation style
//! constraint tags. Register it with priority [`PRIORITY`] so it sits
//! between user overrides and the built-in defaults:
//!
//! ```rust
//! use fixture_core::{TypeCatalog, TypeRef};
//! use fixture_generator::{Configuration, PopulationEngine};
//! use fixture_validation::{ValidationRegistry, PRIORITY};
//!
//! let catalog = TypeCatalog::from_yaml(r#"
//! types:
//!   - name: Account
//!     fields:
//!       - name: age
//!         type: i32
//!         tags: [{ name: min, value: 18 }, { name: max, value: 99 }]
//!       - name: code
//!         type: string
//!         tags: [{ name: pattern, regexp: "[A-Z]{2}[0-9]{3}" }]
//! "#).unwrap();
//!
//! let mut engine = PopulationEngine::new(&catalog, Configuration::default())
//!     .with_registry(PRIORITY, ValidationRegistry::new());
//! let account = engine.generate(&TypeRef::named("Account")).unwrap();
//! let age = account.get_field("age").and_then(|v| v.as_i64()).unwrap();
//! assert!((18..=99).contains(&age));
//! ```
//!
//! # Tags
//!
//! - `assert_true`, `assert_false` - fixed booleans
//! - `null` - null for any type
//! - `past`, `future` - dates within ten years of the reference date
//! - `min`, `max` (`value`) - integer bounds
//! - `decimal_min`, `decimal_max` (`value`) - float or decimal bounds
//! - `pattern` (`regexp`) - strings matching a regular expression
//! - `size` (`min`, `max`) - string length

pub mod handlers;
pub mod pattern;

use fixture_generator::{priority, Configuration, ProviderTable, RandomizerRegistry};
use handlers::{
    BoolHandler, DecimalMinMaxHandler, MinMaxHandler, NullHandler, PatternHandler, SizeHandler,
    TemporalHandler, Tense,
};
use std::sync::Arc;

pub use pattern::PatternGenerator;

/// Priority at which the validation registry is meant to be registered.
pub const PRIORITY: i32 = priority::CONSTRAINTS;

/// Recognised tag names.
pub mod tags {
    pub const ASSERT_TRUE: &str = "assert_true";
    pub const ASSERT_FALSE: &str = "assert_false";
    pub const NULL: &str = "null";
    pub const PAST: &str = "past";
    pub const FUTURE: &str = "future";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const DECIMAL_MIN: &str = "decimal_min";
    pub const DECIMAL_MAX: &str = "decimal_max";
    pub const PATTERN: &str = "pattern";
    pub const SIZE: &str = "size";
}

/// Registry of constraint tag handlers.
#[derive(Debug, Default)]
pub struct ValidationRegistry {
    table: ProviderTable,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomizerRegistry for ValidationRegistry {
    fn name(&self) -> &str {
        "validation"
    }

    fn init(&mut self, config: &Configuration) {
        let min_max = Arc::new(MinMaxHandler);
        let decimal_min_max = Arc::new(DecimalMinMaxHandler);

        self.table.clear();
        self.table
            .register_tag(tags::ASSERT_FALSE, BoolHandler(false))
            .register_tag(tags::ASSERT_TRUE, BoolHandler(true))
            .register_tag(tags::NULL, NullHandler)
            .register_tag(tags::FUTURE, TemporalHandler(Tense::Future))
            .register_tag(tags::PAST, TemporalHandler(Tense::Past))
            .register_tag_arc(tags::MIN, min_max.clone())
            .register_tag_arc(tags::MAX, min_max)
            .register_tag_arc(tags::DECIMAL_MIN, decimal_min_max.clone())
            .register_tag_arc(tags::DECIMAL_MAX, decimal_min_max)
            .register_tag(tags::PATTERN, PatternHandler)
            .register_tag(tags::SIZE, SizeHandler);

        tracing::debug!(
            "Validation registry ready with {} tag handlers (reference date {})",
            self.table.len(),
            config.reference_date()
        );
    }

    fn table(&self) -> &ProviderTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_registers_every_tag() {
        let mut registry = ValidationRegistry::new();
        registry.init(&Configuration::default());

        let names: Vec<&str> = registry.table().tag_names().collect();
        for tag in [
            tags::ASSERT_TRUE,
            tags::ASSERT_FALSE,
            tags::NULL,
            tags::PAST,
            tags::FUTURE,
            tags::MIN,
            tags::MAX,
            tags::DECIMAL_MIN,
            tags::DECIMAL_MAX,
            tags::PATTERN,
            tags::SIZE,
        ] {
            assert!(names.contains(&tag), "missing handler for {tag}");
        }
        assert_eq!(registry.table().type_keys().count(), 0);
    }

    #[test]
    fn test_reinit_does_not_duplicate() {
        let mut registry = ValidationRegistry::new();
        registry.init(&Configuration::default());
        let first = registry.table().len();
        registry.init(&Configuration::default());
        assert_eq!(registry.table().len(), first);
    }
}
