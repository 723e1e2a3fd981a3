//! Type catalog definitions.
//!
//! A [`TypeCatalog`] is the schema-description form of a set of named
//! types: composites with ordered fields, enums, abstract types and opaque
//! types. Catalogs are built in code or loaded from YAML:
//!
//! ```yaml
//! version: 1
//! types:
//!   - name: Person
//!     implements: [Named]
//!     fields:
//!       - name: name
//!         type: string
//!         tags:
//!           - name: size
//!             min: 2
//!             max: 12
//!       - name: friends
//!         type: list<Person>
//!   - name: Named
//!     kind: abstract
//!   - name: Color
//!     kind: enum
//!     variants: [Red, Green, Blue]
//! ```

use crate::types::{supertype, FieldDescriptor, TypeDescriptor, TypeKind, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading catalog file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Two definitions share a name
    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    /// A field or binding refers to a type the catalog does not define
    #[error("Type '{owner}' references undefined type '{missing}'")]
    UndefinedReference { owner: String, missing: String },

    /// Definition is structurally invalid
    #[error("Invalid definition of type '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },
}

// ============================================================================
// Definitions
// ============================================================================

/// Kind of a catalog definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    #[default]
    Composite,
    Enum,
    Abstract,
    Opaque,
}

/// A named type in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type name
    pub name: String,

    /// Definition kind
    #[serde(default)]
    pub kind: DefinitionKind,

    /// Abstract types this type implements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,

    /// Composite fields in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,

    /// Enum variants in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl TypeDefinition {
    fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            implements: Vec::new(),
            fields: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Start a composite definition.
    pub fn composite(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Composite)
    }

    /// Define an enum with the given variants.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut definition = Self::new(name, DefinitionKind::Enum);
        definition.variants = variants.into_iter().map(Into::into).collect();
        definition
    }

    /// Define an abstract (interface-like) type.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Abstract)
    }

    /// Define a type with no introspectable structure.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(name, DefinitionKind::Opaque)
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare an implemented abstract type.
    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.implements.push(name.into());
        self
    }

    /// Build the descriptor for this definition.
    pub fn to_descriptor(&self) -> TypeDescriptor {
        let kind = match self.kind {
            DefinitionKind::Composite => TypeKind::Composite {
                fields: self.fields.clone(),
            },
            DefinitionKind::Enum => TypeKind::Enum {
                variants: self.variants.clone(),
            },
            DefinitionKind::Abstract => TypeKind::Abstract,
            DefinitionKind::Opaque => TypeKind::Opaque,
        };

        let mut supertypes = self.implements.clone();
        match self.kind {
            DefinitionKind::Composite => supertypes.push(supertype::OBJECT.to_string()),
            DefinitionKind::Enum => supertypes.push(supertype::ENUM.to_string()),
            DefinitionKind::Abstract | DefinitionKind::Opaque => {}
        }

        TypeDescriptor::new(self.name.clone(), kind).with_supertypes(supertypes)
    }

    /// Named types this definition refers to (fields and implemented types).
    pub fn references(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.implements.iter().map(String::as_str).collect();
        for field in &self.fields {
            names.extend(field.type_ref.referenced_names());
        }
        names
    }

    fn check(&self) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("type name is empty"));
        }
        match self.kind {
            DefinitionKind::Enum if self.variants.is_empty() => {
                Err(invalid("enum declares no variants"))
            }
            DefinitionKind::Composite if !self.variants.is_empty() => {
                Err(invalid("only enums declare variants"))
            }
            DefinitionKind::Enum | DefinitionKind::Abstract | DefinitionKind::Opaque
                if !self.fields.is_empty() =>
            {
                Err(invalid("only composites declare fields"))
            }
            _ => {
                let mut seen = HashSet::new();
                for field in &self.fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(invalid(&format!("duplicate field '{}'", field.name)));
                    }
                }
                Ok(())
            }
        }
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_version")]
    #[allow(dead_code)]
    version: u32,
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

// ============================================================================
// Catalog
// ============================================================================

/// A set of named type definitions.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    /// Definitions in declaration order
    types: Vec<TypeDefinition>,

    /// Cached name lookup
    index: HashMap<String, usize>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        let mut catalog = Self::new();
        for definition in file.types {
            catalog.insert(definition)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Add a definition, rejecting duplicate names.
    pub fn insert(&mut self, definition: TypeDefinition) -> Result<(), SchemaError> {
        definition.check()?;
        if self.index.contains_key(&definition.name) {
            return Err(SchemaError::DuplicateType(definition.name));
        }
        self.index.insert(definition.name.clone(), self.types.len());
        self.types.push(definition);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_type(mut self, definition: TypeDefinition) -> Result<Self, SchemaError> {
        self.insert(definition)?;
        Ok(self)
    }

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.index.get(name).and_then(|&idx| self.types.get(idx))
    }

    /// All type names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// Check that every referenced name is defined and that implemented
    /// types are abstract.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for definition in &self.types {
            for missing in definition.references() {
                if self.get(missing).is_none() {
                    return Err(SchemaError::UndefinedReference {
                        owner: definition.name.clone(),
                        missing: missing.to_string(),
                    });
                }
            }
            for parent in &definition.implements {
                if self.get(parent).map(|p| p.kind) != Some(DefinitionKind::Abstract) {
                    return Err(SchemaError::InvalidDefinition {
                        name: definition.name.clone(),
                        reason: format!("implemented type '{parent}' is not abstract"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `name` can reach itself through its field types.
    pub fn is_recursive(&self, name: &str) -> bool {
        let Some(start) = self.get(name) else {
            return false;
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = field_references(start);

        while let Some(current) = stack.pop() {
            if current == name {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(definition) = self.get(current) {
                stack.extend(field_references(definition));
                // An abstract type reaches every implementation
                if definition.kind == DefinitionKind::Abstract {
                    stack.extend(self.implementors(current));
                }
            }
        }
        false
    }

    /// Names of every recursive type, in declaration order.
    pub fn recursive_types(&self) -> Vec<&str> {
        self.types
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| self.is_recursive(name))
            .collect()
    }

    /// Concrete types declaring that they implement `abstract_name`.
    pub fn implementors(&self, abstract_name: &str) -> Vec<&str> {
        self.types
            .iter()
            .filter(|t| t.implements.iter().any(|i| i == abstract_name))
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Resolve a named reference into its descriptor.
    pub fn describe_named(&self, name: &str) -> Option<TypeDescriptor> {
        self.get(name).map(TypeDefinition::to_descriptor)
    }

    /// Whether `type_ref` only mentions defined names.
    pub fn contains_ref(&self, type_ref: &TypeRef) -> bool {
        type_ref
            .referenced_names()
            .into_iter()
            .all(|name| self.get(name).is_some())
    }
}

fn field_references(definition: &TypeDefinition) -> Vec<&str> {
    definition
        .fields
        .iter()
        .flat_map(|f| f.type_ref.referenced_names())
        .collect()
}
