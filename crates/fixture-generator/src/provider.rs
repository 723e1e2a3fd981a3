//! Value providers and provider tables.
//!
//! A [`Provider`] turns a [`ProvideRequest`] into a [`Value`]. A
//! [`ProviderTable`] maps lookup keys to providers:
//!
//! - field predicates (per-field overrides),
//! - constraint tag names,
//! - type keys, matched exactly first and then by assignability.
//!
//! Tables are ordered: registering an existing key replaces the provider but
//! keeps the original declaration slot, and assignable matches are tried in
//! declaration order.

use crate::config::{Configuration, FieldContext, FieldPredicate};
use crate::error::ProviderError;
use fixture_core::{FieldDescriptor, ScalarType, TypeDescriptor, TypeRef, Value};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Everything a provider may consult while producing a value.
pub struct ProvideRequest<'a> {
    /// Type being produced
    pub descriptor: &'a TypeDescriptor,
    /// Field being populated, absent for collection elements and top-level values
    pub field: Option<&'a FieldDescriptor>,
    /// Session configuration
    pub config: &'a Configuration,
    /// Session random source
    pub rng: &'a mut StdRng,
}

impl ProvideRequest<'_> {
    /// Scalar type requested, if any.
    pub fn scalar(&self) -> Option<ScalarType> {
        self.descriptor.as_scalar()
    }

    /// Name of the field being populated, or the type name.
    pub fn target_name(&self) -> &str {
        self.field
            .map(|f| f.name.as_str())
            .unwrap_or(self.descriptor.name.as_str())
    }
}

/// Produces values for a field or type.
pub trait Provider: Send + Sync {
    /// Generate a value.
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError>;

    /// Whether this provider can produce the given type.
    ///
    /// Lookups skip providers that decline, so a tag handler for text can
    /// coexist with type-based defaults for other field types.
    fn supports(&self, _descriptor: &TypeDescriptor) -> bool {
        true
    }
}

/// Provider backed by a closure.
pub struct FnProvider<F> {
    func: F,
}

impl<F> Provider for FnProvider<F>
where
    F: Fn(&mut ProvideRequest<'_>) -> Result<Value, ProviderError> + Send + Sync,
{
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        (self.func)(request)
    }
}

/// Wrap a closure as a provider.
pub fn provider_fn<F>(func: F) -> FnProvider<F>
where
    F: Fn(&mut ProvideRequest<'_>) -> Result<Value, ProviderError> + Send + Sync,
{
    FnProvider { func }
}

/// Provider that always returns the same value.
#[derive(Debug, Clone)]
pub struct ConstantProvider(pub Value);

impl Provider for ConstantProvider {
    fn provide(&self, _request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Key of a type-based table entry: a canonical type name or a supertype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<ScalarType> for TypeKey {
    fn from(scalar: ScalarType) -> Self {
        Self::new(scalar.name())
    }
}

impl From<&TypeRef> for TypeKey {
    fn from(type_ref: &TypeRef) -> Self {
        Self(type_ref.canonical_name())
    }
}

impl From<TypeRef> for TypeKey {
    fn from(type_ref: TypeRef) -> Self {
        Self::from(&type_ref)
    }
}

/// Ordered provider lookup keyed by field predicate, tag or type.
#[derive(Clone, Default)]
pub struct ProviderTable {
    fields: Vec<(FieldPredicate, Arc<dyn Provider>)>,
    tags: IndexMap<String, Arc<dyn Provider>>,
    types: IndexMap<TypeKey, Arc<dyn Provider>>,
}

impl ProviderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the provider for a type key.
    pub fn register_type(
        &mut self,
        key: impl Into<TypeKey>,
        provider: impl Provider + 'static,
    ) -> &mut Self {
        self.register_type_arc(key, Arc::new(provider))
    }

    pub fn register_type_arc(
        &mut self,
        key: impl Into<TypeKey>,
        provider: Arc<dyn Provider>,
    ) -> &mut Self {
        self.types.insert(key.into(), provider);
        self
    }

    /// Register (or replace) the provider for a constraint tag.
    pub fn register_tag(
        &mut self,
        tag: impl Into<String>,
        provider: impl Provider + 'static,
    ) -> &mut Self {
        self.register_tag_arc(tag, Arc::new(provider))
    }

    pub fn register_tag_arc(
        &mut self,
        tag: impl Into<String>,
        provider: Arc<dyn Provider>,
    ) -> &mut Self {
        self.tags.insert(tag.into(), provider);
        self
    }

    /// Register a provider for every field matching a predicate.
    pub fn register_field(
        &mut self,
        predicate: FieldPredicate,
        provider: impl Provider + 'static,
    ) -> &mut Self {
        self.register_field_arc(predicate, Arc::new(provider))
    }

    pub fn register_field_arc(
        &mut self,
        predicate: FieldPredicate,
        provider: Arc<dyn Provider>,
    ) -> &mut Self {
        self.fields.push((predicate, provider));
        self
    }

    /// Provider for a type: exact name first, then the first assignable
    /// entry in declaration order.
    pub fn lookup_type(&self, descriptor: &TypeDescriptor) -> Option<&Arc<dyn Provider>> {
        if let Some(provider) = self
            .types
            .get(descriptor.name.as_str())
            .filter(|p| p.supports(descriptor))
        {
            return Some(provider);
        }

        self.types
            .iter()
            .filter(|(key, _)| key.as_str() != descriptor.name)
            .find(|(key, provider)| {
                descriptor.supertypes.iter().any(|s| s == key.as_str())
                    && provider.supports(descriptor)
            })
            .map(|(_, provider)| provider)
    }

    /// Provider for a constraint tag, if it supports the type.
    pub fn lookup_tag(&self, tag: &str, descriptor: &TypeDescriptor) -> Option<&Arc<dyn Provider>> {
        self.tags.get(tag).filter(|p| p.supports(descriptor))
    }

    /// First field override matching the field, in registration order.
    pub fn lookup_field(&self, field: &FieldContext<'_>) -> Option<&Arc<dyn Provider>> {
        self.fields
            .iter()
            .find(|(predicate, provider)| {
                predicate.matches(field) && provider.supports(field.field_type)
            })
            .map(|(_, provider)| provider)
    }

    /// Merge another table into this one; `other` wins on key collisions.
    pub fn union(&mut self, other: &ProviderTable) -> &mut Self {
        self.fields.extend(other.fields.iter().cloned());
        for (tag, provider) in &other.tags {
            self.tags.insert(tag.clone(), Arc::clone(provider));
        }
        for (key, provider) in &other.types {
            self.types.insert(key.clone(), Arc::clone(provider));
        }
        self
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.tags.clear();
        self.types.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.tags.len() + self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered tag names in declaration order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// Registered type keys in declaration order.
    pub fn type_keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.types.keys()
    }
}

impl fmt::Debug for ProviderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTable")
            .field(
                "fields",
                &self.fields.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .field("tags", &self.tags.keys().collect::<Vec<_>>())
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}
