//! Type introspection.
//!
//! The engine never inspects types itself; it asks a [`TypeIntrospector`]
//! for the one-level structure of a [`TypeRef`]. Descriptions are shallow:
//! field, element, key and value types stay as `TypeRef`s and are described
//! on demand, so a self-referential type describes in constant work.

use crate::error::IntrospectionError;
use fixture_core::{TypeCatalog, TypeDescriptor, TypeKind, TypeRef};

/// Describes the structure of types.
pub trait TypeIntrospector {
    /// Describe one level of `type_ref`.
    ///
    /// Must be a pure function of the type: the same reference always yields
    /// an equal descriptor with fields in declaration order.
    fn describe(&self, type_ref: &TypeRef) -> Result<TypeDescriptor, IntrospectionError>;
}

impl<T: TypeIntrospector + ?Sized> TypeIntrospector for &T {
    fn describe(&self, type_ref: &TypeRef) -> Result<TypeDescriptor, IntrospectionError> {
        (**self).describe(type_ref)
    }
}

/// Describe the structural (non-named) part of a type reference.
///
/// Returns `None` for named references, which only a catalog can resolve.
pub fn describe_structural(type_ref: &TypeRef) -> Option<TypeDescriptor> {
    let name = type_ref.canonical_name();
    let descriptor = match type_ref {
        TypeRef::Scalar(scalar) => TypeDescriptor::scalar(*scalar),
        TypeRef::Named(_) => return None,
        TypeRef::List(element) => TypeDescriptor::new(
            name,
            TypeKind::Collection {
                element: (**element).clone(),
            },
        ),
        TypeRef::Array(element) => TypeDescriptor::new(
            name,
            TypeKind::Array {
                element: (**element).clone(),
            },
        ),
        TypeRef::Map(key, value) => TypeDescriptor::new(
            name,
            TypeKind::Map {
                key: (**key).clone(),
                value: (**value).clone(),
            },
        ),
    };
    Some(descriptor)
}

impl TypeIntrospector for TypeCatalog {
    fn describe(&self, type_ref: &TypeRef) -> Result<TypeDescriptor, IntrospectionError> {
        match type_ref {
            TypeRef::Named(name) => self
                .describe_named(name)
                .ok_or_else(|| IntrospectionError::UnknownType(name.clone())),
            structural => describe_structural(structural).ok_or_else(|| {
                IntrospectionError::Unsupported {
                    type_name: structural.canonical_name(),
                    reason: "not a structural type".to_string(),
                }
            }),
        }
    }
}
