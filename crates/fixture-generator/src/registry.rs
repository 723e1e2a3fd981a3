//! Priority-ordered chain of randomizer registries.
//!
//! Each [`RandomizerRegistry`] owns one [`ProviderTable`] that it rebuilds
//! from the session [`Configuration`] on [`init`](RandomizerRegistry::init).
//! The [`RegistryChain`] resolves a field by scanning registries in priority
//! order (lower value first, ties in registration order). Within a registry
//! field overrides are tried first, then the field's constraint tags in
//! declaration order, then the declared type.

use crate::config::{Configuration, FieldContext, OverrideKey};
use crate::provider::{Provider, ProviderTable};
use crate::randomizers::DefaultRegistry;
use fixture_core::TypeDescriptor;
use std::fmt;
use std::sync::Arc;

/// Well-known registry priorities. Lower values win.
pub mod priority {
    /// User overrides from the configuration
    pub const OVERRIDES: i32 = -100;
    /// Constraint tag tables
    pub const CONSTRAINTS: i32 = -2;
    /// Built-in scalar defaults
    pub const DEFAULTS: i32 = 100;
}

/// A provider table that can be (re)built from a configuration.
pub trait RandomizerRegistry: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Rebuild the table from scratch for a new session.
    fn init(&mut self, config: &Configuration);

    /// Current table.
    fn table(&self) -> &ProviderTable;
}

/// Registry built from [`Configuration::overrides`].
#[derive(Debug, Default)]
pub struct OverrideRegistry {
    table: ProviderTable,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomizerRegistry for OverrideRegistry {
    fn name(&self) -> &str {
        "overrides"
    }

    fn init(&mut self, config: &Configuration) {
        self.table.clear();
        for entry in config.overrides() {
            match &entry.key {
                OverrideKey::Type(key) => {
                    self.table
                        .register_type_arc(key.clone(), Arc::clone(&entry.provider));
                }
                OverrideKey::Field(predicate) => {
                    self.table
                        .register_field_arc(predicate.clone(), Arc::clone(&entry.provider));
                }
            }
        }
    }

    fn table(&self) -> &ProviderTable {
        &self.table
    }
}

/// A fixed table registered as-is; `init` leaves it untouched.
pub struct StaticRegistry {
    name: String,
    table: ProviderTable,
}

impl StaticRegistry {
    pub fn new(name: impl Into<String>, table: ProviderTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

impl RandomizerRegistry for StaticRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, _config: &Configuration) {}

    fn table(&self) -> &ProviderTable {
        &self.table
    }
}

/// How a provider was matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    /// A field predicate override
    Field,
    /// A constraint tag, by name
    Tag(String),
    /// The declared type or one of its supertypes
    Type,
}

/// Result of a successful resolution.
pub struct Resolution<'a> {
    pub provider: &'a Arc<dyn Provider>,
    /// Name of the registry that answered
    pub registry: &'a str,
    pub matched: MatchKind,
}

struct ChainEntry {
    priority: i32,
    registry: Box<dyn RandomizerRegistry>,
}

/// Ordered composition of registries.
#[derive(Default)]
pub struct RegistryChain {
    entries: Vec<ChainEntry>,
}

impl RegistryChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain with the user override registry and the built-in defaults.
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain
            .register(priority::OVERRIDES, OverrideRegistry::new())
            .register(priority::DEFAULTS, DefaultRegistry::new());
        chain
    }

    /// Add a registry. Equal priorities keep registration order.
    pub fn register(
        &mut self,
        priority: i32,
        registry: impl RandomizerRegistry + 'static,
    ) -> &mut Self {
        self.register_boxed(priority, Box::new(registry))
    }

    pub fn register_boxed(
        &mut self,
        priority: i32,
        registry: Box<dyn RandomizerRegistry>,
    ) -> &mut Self {
        let idx = self
            .entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.entries.len());
        tracing::debug!(
            "Registering randomizer registry '{}' with priority {priority}",
            registry.name()
        );
        self.entries.insert(idx, ChainEntry { priority, registry });
        self
    }

    /// Rebuild every registry's table for a new session.
    pub fn init(&mut self, config: &Configuration) {
        for entry in &mut self.entries {
            entry.registry.init(config);
        }
        tracing::debug!(
            "Initialized {} randomizer registries (seed {})",
            self.entries.len(),
            config.seed()
        );
    }

    /// Find the provider for a value of `descriptor`, optionally populating
    /// `field`. Returns `None` when no registry can answer.
    pub fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        field: Option<&FieldContext<'_>>,
    ) -> Option<Resolution<'_>> {
        for entry in &self.entries {
            let table = entry.registry.table();
            let registry = entry.registry.name();

            if let Some(ctx) = field {
                if let Some(provider) = table.lookup_field(ctx) {
                    return Some(Resolution {
                        provider,
                        registry,
                        matched: MatchKind::Field,
                    });
                }
                for tag in &ctx.field.tags {
                    if let Some(provider) = table.lookup_tag(&tag.name, descriptor) {
                        return Some(Resolution {
                            provider,
                            registry,
                            matched: MatchKind::Tag(tag.name.clone()),
                        });
                    }
                }
            }

            if let Some(provider) = table.lookup_type(descriptor) {
                return Some(Resolution {
                    provider,
                    registry,
                    matched: MatchKind::Type,
                });
            }
        }
        None
    }

    /// `(priority, name)` of every registry in resolution order.
    pub fn registries(&self) -> Vec<(i32, &str)> {
        self.entries
            .iter()
            .map(|e| (e.priority, e.registry.name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for RegistryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.registries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldPredicate;
    use crate::provider::ConstantProvider;
    use fixture_core::{ConstraintTag, FieldDescriptor, ScalarType, Value};

    fn constant_table(key: ScalarType, value: Value) -> ProviderTable {
        let mut table = ProviderTable::new();
        table.register_type(key, ConstantProvider(value));
        table
    }

    #[test]
    fn test_priority_order_and_ties() {
        let mut chain = RegistryChain::new();
        chain
            .register(10, StaticRegistry::new("late", ProviderTable::new()))
            .register(1, StaticRegistry::new("first", ProviderTable::new()))
            .register(10, StaticRegistry::new("later", ProviderTable::new()))
            .register(-5, StaticRegistry::new("earliest", ProviderTable::new()));

        let names: Vec<&str> = chain.registries().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["earliest", "first", "late", "later"]);
    }

    #[test]
    fn test_lower_priority_value_wins() {
        let mut chain = RegistryChain::new();
        chain
            .register(5, StaticRegistry::new("b", constant_table(ScalarType::I32, Value::Int(2))))
            .register(1, StaticRegistry::new("a", constant_table(ScalarType::I32, Value::Int(1))));

        let resolution = chain
            .resolve(&TypeDescriptor::scalar(ScalarType::I32), None)
            .unwrap();
        assert_eq!(resolution.registry, "a");
        assert_eq!(resolution.matched, MatchKind::Type);
    }

    #[test]
    fn test_tags_before_type_within_table() {
        let mut table = constant_table(ScalarType::String, Value::String("plain".to_string()));
        table
            .register_tag("second", ConstantProvider(Value::String("second".to_string())))
            .register_tag("first", ConstantProvider(Value::String("first".to_string())));

        let mut chain = RegistryChain::new();
        chain.register(0, StaticRegistry::new("only", table));

        let field = FieldDescriptor::new("name", ScalarType::String)
            .with_tag(ConstraintTag::new("unknown"))
            .with_tag(ConstraintTag::new("first"))
            .with_tag(ConstraintTag::new("second"));
        let descriptor = TypeDescriptor::scalar(ScalarType::String);
        let ctx = FieldContext {
            owner: "User",
            field: &field,
            field_type: &descriptor,
            path: "User.name",
        };

        let resolution = chain.resolve(&descriptor, Some(&ctx)).unwrap();
        // Field tag order decides, not table order
        assert_eq!(resolution.matched, MatchKind::Tag("first".to_string()));
    }

    #[test]
    fn test_resolve_none() {
        let chain = RegistryChain::new();
        assert!(chain
            .resolve(&TypeDescriptor::scalar(ScalarType::Bool), None)
            .is_none());
    }

    #[test]
    fn test_override_registry_init_rebuilds() {
        let config = Configuration::builder()
            .override_type(ScalarType::I32, ConstantProvider(Value::Int(7)))
            .override_field(
                FieldPredicate::named("id"),
                ConstantProvider(Value::Int(1)),
            )
            .build()
            .unwrap();

        let mut registry = OverrideRegistry::new();
        registry.init(&config);
        assert_eq!(registry.table().len(), 2);

        registry.init(&Configuration::default());
        assert!(registry.table().is_empty());
    }

    #[test]
    fn test_default_chain_layout() {
        let chain = RegistryChain::with_defaults();
        assert_eq!(
            chain.registries(),
            vec![(priority::OVERRIDES, "overrides"), (priority::DEFAULTS, "defaults")]
        );
    }
}
