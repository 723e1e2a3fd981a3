//! Recursive population engine.
//!
//! For every value the engine first asks the [`RegistryChain`] for a
//! provider. Only when nothing answers does it look at the structure of the
//! type: composites are populated field by field, lists, arrays and maps are
//! filled to a size drawn from the configuration, and abstract types are
//! replaced by their configured binding. Everything else is an error.

use crate::config::{Configuration, CyclePolicy, FieldContext};
use crate::context::TraversalContext;
use crate::error::GenerationError;
use crate::introspect::TypeIntrospector;
use crate::provider::ProvideRequest;
use crate::registry::{RandomizerRegistry, RegistryChain};
use fixture_core::{FieldDescriptor, TypeDescriptor, TypeKind, TypeRef, Value};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;

/// Generates populated instances of described types.
///
/// An engine is one generation session: it owns the configuration, the
/// initialised registry chain and a single random source seeded from the
/// configuration. Values are drawn from that source in field declaration
/// order, so the same seed, types and registries always produce the same
/// sequence of instances.
pub struct PopulationEngine<I> {
    introspector: I,
    chain: RegistryChain,
    config: Configuration,
    rng: StdRng,
}

impl<I: TypeIntrospector> PopulationEngine<I> {
    /// Engine with the default registry chain (overrides and built-in
    /// scalar randomizers).
    pub fn new(introspector: I, config: Configuration) -> Self {
        Self::with_chain(introspector, config, RegistryChain::with_defaults())
    }

    /// Engine with a caller-assembled chain.
    pub fn with_chain(introspector: I, config: Configuration, mut chain: RegistryChain) -> Self {
        chain.init(&config);
        let rng = StdRng::seed_from_u64(config.seed());
        Self {
            introspector,
            chain,
            config,
            rng,
        }
    }

    /// Add an extension registry to the chain.
    pub fn with_registry(
        mut self,
        priority: i32,
        registry: impl RandomizerRegistry + 'static,
    ) -> Self {
        self.chain.register(priority, registry);
        self.chain.init(&self.config);
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn chain(&self) -> &RegistryChain {
        &self.chain
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    /// Restart the session with another seed.
    pub fn reseed(&mut self, seed: u64) {
        self.reconfigure(self.config.with_seed(seed));
    }

    /// Restart the session with a new configuration.
    pub fn reconfigure(&mut self, config: Configuration) {
        self.chain.init(&config);
        self.rng = StdRng::seed_from_u64(config.seed());
        self.config = config;
    }

    /// Generate one instance of `type_ref`.
    pub fn generate(&mut self, type_ref: &TypeRef) -> Result<Value, GenerationError> {
        let descriptor = self.introspector.describe(type_ref)?;
        let mut ctx = TraversalContext::new(descriptor.name.clone(), self.config.max_depth());

        let mut session = Session {
            introspector: &self.introspector,
            chain: &self.chain,
            config: &self.config,
            rng: &mut self.rng,
        };
        let value = session.populate(&descriptor, None, &mut ctx)?;

        tracing::debug!(
            "Generated instance of '{}' (seed {})",
            descriptor.name,
            self.config.seed()
        );
        Ok(value)
    }

    /// Generate one instance of a named type.
    pub fn generate_named(&mut self, name: &str) -> Result<Value, GenerationError> {
        self.generate(&TypeRef::named(name))
    }

    /// Generate one instance and deserialize it into `T`.
    pub fn generate_as<T: DeserializeOwned>(
        &mut self,
        type_ref: &TypeRef,
    ) -> Result<T, GenerationError> {
        let value = self.generate(type_ref)?;
        Ok(value.deserialize_into()?)
    }

    /// Lazily generate `count` instances.
    pub fn generate_n(&mut self, type_ref: &TypeRef, count: usize) -> Generated<'_, I> {
        Generated {
            engine: self,
            type_ref: type_ref.clone(),
            remaining: count,
        }
    }
}

/// Generate one instance with a fresh default engine.
pub fn generate<I: TypeIntrospector>(
    introspector: &I,
    type_ref: &TypeRef,
    config: &Configuration,
) -> Result<Value, GenerationError> {
    PopulationEngine::new(introspector, config.clone()).generate(type_ref)
}

/// Iterator returned by [`PopulationEngine::generate_n`].
pub struct Generated<'a, I> {
    engine: &'a mut PopulationEngine<I>,
    type_ref: TypeRef,
    remaining: usize,
}

impl<I: TypeIntrospector> Iterator for Generated<'_, I> {
    type Item = Result<Value, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.engine.generate(&self.type_ref))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I: TypeIntrospector> ExactSizeIterator for Generated<'_, I> {}

/// Borrowed view of an engine for the duration of one `generate` call.
struct Session<'a, I> {
    introspector: &'a I,
    chain: &'a RegistryChain,
    config: &'a Configuration,
    rng: &'a mut StdRng,
}

impl<I: TypeIntrospector> Session<'_, I> {
    fn populate(
        &mut self,
        descriptor: &TypeDescriptor,
        field: Option<&FieldContext<'_>>,
        ctx: &mut TraversalContext,
    ) -> Result<Value, GenerationError> {
        let chain = self.chain;
        if let Some(resolution) = chain.resolve(descriptor, field) {
            let path = ctx.path();
            tracing::trace!(
                "Resolved '{path}' ({}) via registry '{}' ({:?})",
                descriptor.name,
                resolution.registry,
                resolution.matched
            );
            let mut request = ProvideRequest {
                descriptor,
                field: field.map(|f| f.field),
                config: self.config,
                rng: &mut *self.rng,
            };
            return resolution
                .provider
                .provide(&mut request)
                .map_err(|source| GenerationError::ProviderInvocation {
                    path,
                    type_name: descriptor.name.clone(),
                    source,
                });
        }

        match &descriptor.kind {
            TypeKind::Composite { fields } => self.populate_composite(descriptor, fields, ctx),
            TypeKind::Collection { element } | TypeKind::Array { element } => {
                self.populate_list(element, ctx)
            }
            TypeKind::Map { key, value } => self.populate_map(key, value, ctx),
            TypeKind::Abstract => {
                let bound = self.bind_abstract(descriptor, ctx)?;
                self.populate(&bound, field, ctx)
            }
            TypeKind::Scalar(_) | TypeKind::Enum { .. } | TypeKind::Opaque => {
                Err(GenerationError::UnsupportedType {
                    type_name: descriptor.name.clone(),
                    reason: format!(
                        "no provider for {} type at '{}'",
                        descriptor.kind.label(),
                        ctx.path()
                    ),
                })
            }
        }
    }

    fn populate_composite(
        &mut self,
        descriptor: &TypeDescriptor,
        fields: &[FieldDescriptor],
        ctx: &mut TraversalContext,
    ) -> Result<Value, GenerationError> {
        let nested = !ctx.at_root();
        if nested {
            if ctx.remaining_depth() == 0 {
                tracing::trace!("Depth exhausted at '{}', leaving null", ctx.path());
                return Ok(Value::Null);
            }
            if ctx.is_visited(&descriptor.name)
                && self.config.cycle_policy() == CyclePolicy::BreakOnRepeat
            {
                tracing::trace!(
                    "Breaking cycle on '{}' at '{}'",
                    descriptor.name,
                    ctx.path()
                );
                return Ok(Value::Null);
            }
        }

        ctx.enter(&descriptor.name, nested);
        let result = self.populate_fields(&descriptor.name, fields, ctx);
        ctx.leave();

        Ok(Value::Object {
            type_name: descriptor.name.clone(),
            fields: result?,
        })
    }

    fn populate_fields(
        &mut self,
        owner: &str,
        fields: &[FieldDescriptor],
        ctx: &mut TraversalContext,
    ) -> Result<IndexMap<String, Value>, GenerationError> {
        let mut values = IndexMap::with_capacity(fields.len());
        for field in fields {
            ctx.push_field(&field.name);
            let value = self.populate_field(owner, field, ctx);
            ctx.pop();
            values.insert(field.name.clone(), value?);
        }
        Ok(values)
    }

    fn populate_field(
        &mut self,
        owner: &str,
        field: &FieldDescriptor,
        ctx: &mut TraversalContext,
    ) -> Result<Value, GenerationError> {
        let field_type = self.introspector.describe(&field.type_ref)?;
        let path = ctx.path();
        let field_ctx = FieldContext {
            owner,
            field,
            field_type: &field_type,
            path: &path,
        };

        if !field.mutable || self.config.is_excluded(&field_ctx) {
            tracing::trace!("Leaving '{path}' at its zero value");
            return Ok(Value::zero_for(&field_type));
        }
        self.populate(&field_type, Some(&field_ctx), ctx)
    }

    fn populate_list(
        &mut self,
        element: &TypeRef,
        ctx: &mut TraversalContext,
    ) -> Result<Value, GenerationError> {
        let size = self.config.collection_size().sample(&mut *self.rng);
        let element_type = self.introspector.describe(element)?;

        let mut items = Vec::with_capacity(size);
        for idx in 0..size {
            ctx.push_index(idx);
            let item = self.populate(&element_type, None, ctx);
            ctx.pop();
            items.push(item?);
        }
        Ok(Value::List(items))
    }

    fn populate_map(
        &mut self,
        key: &TypeRef,
        value: &TypeRef,
        ctx: &mut TraversalContext,
    ) -> Result<Value, GenerationError> {
        let size = self.config.map_size().sample(&mut *self.rng);
        let key_type = self.introspector.describe(key)?;
        let value_type = self.introspector.describe(value)?;

        let mut entries: Vec<(Value, Value)> = Vec::with_capacity(size);
        for idx in 0..size {
            ctx.push_map_key(idx);
            let generated_key = self.populate(&key_type, None, ctx);
            ctx.pop();
            let generated_key = generated_key?;

            if entries.iter().any(|(existing, _)| *existing == generated_key) {
                tracing::debug!("Skipping duplicate map key at '{}[{idx}]'", ctx.path());
                continue;
            }

            ctx.push_map_value(idx);
            let generated_value = self.populate(&value_type, None, ctx);
            ctx.pop();
            entries.push((generated_key, generated_value?));
        }
        Ok(Value::Map(entries))
    }

    /// Follow configured bindings until a non-abstract type is reached.
    fn bind_abstract(
        &self,
        descriptor: &TypeDescriptor,
        ctx: &TraversalContext,
    ) -> Result<TypeDescriptor, GenerationError> {
        let unresolvable = || GenerationError::UnresolvableType {
            type_name: descriptor.name.clone(),
            path: ctx.path(),
        };

        let mut seen: Vec<String> = Vec::new();
        let mut current = descriptor.clone();
        while matches!(current.kind, TypeKind::Abstract) {
            if seen.contains(&current.name) {
                tracing::warn!("Binding loop through '{}'", current.name);
                return Err(unresolvable());
            }
            let target = self.config.binding(&current.name).ok_or_else(unresolvable)?;
            tracing::trace!("Binding '{}' to '{target}'", current.name);
            seen.push(current.name.clone());
            current = self.introspector.describe(target)?;
        }
        Ok(current)
    }
}
