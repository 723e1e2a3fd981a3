//! Type model for fixture generation.
//!
//! Two layers describe a type:
//!
//! - [`TypeRef`] is the declared type of a field as written in a schema:
//!   a scalar, a named type, or a parameterised container. It is shallow,
//!   so a named reference is never expanded until somebody asks for it.
//! - [`TypeDescriptor`] is the one-level decomposition of a `TypeRef`
//!   produced by a type introspector: its kind, its type arguments and,
//!   for composites, the ordered field list.
//!
//! Keeping field types as `TypeRef`s is what lets a composite contain a
//! field of its own type without the description step looping.
//!
//! # YAML Format
//!
//! Simple and named types are plain strings, parameterised types can be
//! written inline or in object form:
//! ```yaml
//! type: i32
//! type: Person
//! type: list<Person>
//! type:
//!   type: map
//!   key_type: string
//!   value_type: list<i64>
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known supertype names used for "assignable from" provider lookup.
pub mod supertype {
    /// Every numeric scalar.
    pub const NUMBER: &str = "Number";
    /// Signed and unsigned integer scalars.
    pub const INTEGER: &str = "Integer";
    /// Floating point and decimal scalars.
    pub const FLOAT: &str = "Float";
    /// Character and string scalars.
    pub const TEXT: &str = "Text";
    /// Dates, times and durations.
    pub const TEMPORAL: &str = "Temporal";
    /// Every enum type.
    pub const ENUM: &str = "Enum";
    /// Every composite type.
    pub const OBJECT: &str = "Object";
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Exact decimal, generated in string form
    Decimal,
    Char,
    String,
    Bytes,
    Uuid,
    /// Date only (YYYY-MM-DD)
    Date,
    /// Time only (HH:MM:SS)
    Time,
    /// Date and time without zone
    DateTime,
    /// Date and time with a fixed UTC offset
    ZonedDateTime,
    Duration,
}

impl ScalarType {
    /// All scalar types, in declaration order.
    pub const ALL: [ScalarType; 21] = [
        ScalarType::Bool,
        ScalarType::I8,
        ScalarType::I16,
        ScalarType::I32,
        ScalarType::I64,
        ScalarType::U8,
        ScalarType::U16,
        ScalarType::U32,
        ScalarType::U64,
        ScalarType::F32,
        ScalarType::F64,
        ScalarType::Decimal,
        ScalarType::Char,
        ScalarType::String,
        ScalarType::Bytes,
        ScalarType::Uuid,
        ScalarType::Date,
        ScalarType::Time,
        ScalarType::DateTime,
        ScalarType::ZonedDateTime,
        ScalarType::Duration,
    ];

    /// Canonical schema name of this scalar.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::ZonedDateTime => "zoned_datetime",
            Self::Duration => "duration",
        }
    }

    /// Parse a scalar name, accepting a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let scalar = match name {
            "bool" | "boolean" => Self::Bool,
            "i8" | "tiny_int" => Self::I8,
            "i16" | "small_int" => Self::I16,
            "i32" | "int" => Self::I32,
            "i64" | "long" | "big_int" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "f32" | "float" => Self::F32,
            "f64" | "double" => Self::F64,
            "decimal" => Self::Decimal,
            "char" => Self::Char,
            "string" | "text" => Self::String,
            "bytes" => Self::Bytes,
            "uuid" => Self::Uuid,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" | "date_time" => Self::DateTime,
            "zoned_datetime" | "timestamp_tz" => Self::ZonedDateTime,
            "duration" => Self::Duration,
            _ => return None,
        };
        Some(scalar)
    }

    /// Abstract types this scalar is assignable to, most specific first.
    pub fn supertypes(&self) -> &'static [&'static str] {
        use supertype::*;
        match self {
            Self::I8
            | Self::I16
            | Self::I32
            | Self::I64
            | Self::U8
            | Self::U16
            | Self::U32
            | Self::U64 => &[INTEGER, NUMBER],
            Self::F32 | Self::F64 | Self::Decimal => &[FLOAT, NUMBER],
            Self::Char | Self::String => &[TEXT],
            Self::Date | Self::Time | Self::DateTime | Self::ZonedDateTime | Self::Duration => {
                &[TEMPORAL]
            }
            Self::Bool | Self::Bytes | Self::Uuid => &[],
        }
    }

    /// Whether this is a signed or unsigned integer type.
    pub fn is_integer(&self) -> bool {
        self.supertypes().contains(&supertype::INTEGER)
    }

    /// Whether this is a floating point or decimal type.
    pub fn is_float(&self) -> bool {
        self.supertypes().contains(&supertype::FLOAT)
    }

    /// Whether this is a text type.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Char | Self::String)
    }

    /// Inclusive value bounds of integer types.
    pub fn integer_bounds(&self) -> Option<(i128, i128)> {
        let bounds = match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::U8 => (0, u8::MAX as i128),
            Self::U16 => (0, u16::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(bounds)
    }

    /// Whether this is an unsigned integer type.
    pub fn is_unsigned(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a field, as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Built-in scalar
    Scalar(ScalarType),
    /// Reference to a catalog type (composite, enum, abstract or opaque)
    Named(String),
    /// Growable sequence
    List(Box<TypeRef>),
    /// Array of values
    Array(Box<TypeRef>),
    /// Key/value mapping
    Map(Box<TypeRef>, Box<TypeRef>),
}

impl TypeRef {
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn list(element: TypeRef) -> Self {
        Self::List(Box::new(element))
    }

    pub fn array(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Canonical name, also used as the provider lookup key.
    pub fn canonical_name(&self) -> String {
        self.to_string()
    }

    /// Named types referenced anywhere in this type, in order of appearance.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Scalar(_) => {}
            Self::Named(name) => names.push(name),
            Self::List(element) | Self::Array(element) => element.collect_names(names),
            Self::Map(key, value) => {
                key.collect_names(names);
                value.collect_names(names);
            }
        }
    }
}

impl From<ScalarType> for TypeRef {
    fn from(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => f.write_str(scalar.name()),
            Self::Named(name) => f.write_str(name),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Array(element) => write!(f, "array<{element}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
        }
    }
}

/// Error returned when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type expression '{expression}': {reason}")]
pub struct TypeParseError {
    pub expression: String,
    pub reason: String,
}

impl TypeParseError {
    fn new(expression: &str, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    /// Parse `i32`, `Person`, `list<T>`, `array<T>` or `map<K, V>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(TypeParseError::new(s, "empty type name"));
        }

        let Some(open) = expr.find('<') else {
            if expr.contains(['>', ',']) {
                return Err(TypeParseError::new(s, "unbalanced type arguments"));
            }
            return Ok(match ScalarType::from_name(expr) {
                Some(scalar) => TypeRef::Scalar(scalar),
                None => TypeRef::Named(expr.to_string()),
            });
        };

        if !expr.ends_with('>') {
            return Err(TypeParseError::new(s, "missing closing '>'"));
        }

        let head = expr[..open].trim();
        let args = split_type_arguments(&expr[open + 1..expr.len() - 1])
            .ok_or_else(|| TypeParseError::new(s, "unbalanced type arguments"))?;

        match (head, args.as_slice()) {
            ("list", [element]) => Ok(TypeRef::list(element.parse()?)),
            ("array", [element]) => Ok(TypeRef::array(element.parse()?)),
            ("map", [key, value]) => Ok(TypeRef::map(key.parse()?, value.parse()?)),
            ("list" | "array" | "map", _) => Err(TypeParseError::new(
                s,
                format!("wrong number of type arguments for '{head}'"),
            )),
            _ => Err(TypeParseError::new(
                s,
                format!("unknown parameterised type '{head}'"),
            )),
        }
    }
}

/// Split `a, map<b, c>` at top-level commas.
fn split_type_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    parts.push(inner[start..].trim());
    Some(parts)
}

// Custom serialization/deserialization for TypeRef
// Supports both the inline string format ("list<i32>") and object format
// ({"type": "list", "element_type": "i32"})

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct TypeRefVisitor;

        impl<'de> Visitor<'de> for TypeRefVisitor {
            type Value = TypeRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a type name or a map describing a parameterised type")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut type_name: Option<String> = None;
                let mut element: Option<TypeRef> = None;
                let mut key: Option<TypeRef> = None;
                let mut value: Option<TypeRef> = None;

                while let Some(entry) = map.next_key::<String>()? {
                    match entry.as_str() {
                        "type" => type_name = Some(map.next_value()?),
                        "element_type" => element = Some(map.next_value()?),
                        "key_type" => key = Some(map.next_value()?),
                        "value_type" => value = Some(map.next_value()?),
                        other => {
                            return Err(M::Error::unknown_field(
                                other,
                                &["type", "element_type", "key_type", "value_type"],
                            ))
                        }
                    }
                }

                let type_name = type_name.ok_or_else(|| M::Error::missing_field("type"))?;

                match type_name.as_str() {
                    "list" => Ok(TypeRef::list(
                        element.ok_or_else(|| M::Error::missing_field("element_type"))?,
                    )),
                    "array" => Ok(TypeRef::array(
                        element.ok_or_else(|| M::Error::missing_field("element_type"))?,
                    )),
                    "map" => Ok(TypeRef::map(
                        key.ok_or_else(|| M::Error::missing_field("key_type"))?,
                        value.ok_or_else(|| M::Error::missing_field("value_type"))?,
                    )),
                    other => other.parse().map_err(M::Error::custom),
                }
            }
        }

        deserializer.deserialize_any(TypeRefVisitor)
    }
}

/// An opaque constraint attached to a field.
///
/// The engine never interprets tags; a provider table resolves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConstraintTagRepr")]
pub struct ConstraintTag {
    /// Tag identifier, e.g. `pattern` or `min`
    pub name: String,

    /// Tag-specific parameters
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintTagRepr {
    Bare(String),
    Full {
        name: String,
        #[serde(flatten)]
        params: BTreeMap<String, serde_json::Value>,
    },
}

impl From<ConstraintTagRepr> for ConstraintTag {
    fn from(repr: ConstraintTagRepr) -> Self {
        match repr {
            ConstraintTagRepr::Bare(name) => Self::new(name),
            ConstraintTagRepr::Full { name, params } => Self { name, params },
        }
    }
}

impl ConstraintTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }

    /// Integer parameter, accepting numbers and numeric strings.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        match self.param(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer parameter wide enough for every integer scalar, accepting
    /// numbers and numeric strings.
    pub fn param_i128(&self, key: &str) -> Option<i128> {
        match self.param(key)? {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float parameter, accepting numbers and numeric strings.
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        match self.param(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key)?.as_str()
    }
}

fn default_mutable() -> bool {
    true
}

/// A field of a composite type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,

    /// Declared field type
    #[serde(rename = "type")]
    pub type_ref: TypeRef,

    /// Attached constraint tags, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ConstraintTag>,

    /// Immutable fields are never populated and keep their zero value
    #[serde(default = "default_mutable")]
    pub mutable: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            tags: Vec::new(),
            mutable: true,
        }
    }

    pub fn with_tag(mut self, tag: ConstraintTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// First tag with the given name.
    pub fn tag(&self, name: &str) -> Option<&ConstraintTag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tag(name).is_some()
    }
}

/// Structural kind of a described type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Scalar(ScalarType),
    Enum { variants: Vec<String> },
    Array { element: TypeRef },
    Collection { element: TypeRef },
    Map { key: TypeRef, value: TypeRef },
    Composite { fields: Vec<FieldDescriptor> },
    /// Interface-like type that needs a concrete binding
    Abstract,
    /// Type with no introspectable structure
    Opaque,
}

impl TypeKind {
    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Enum { .. } => "enum",
            Self::Array { .. } => "array",
            Self::Collection { .. } => "collection",
            Self::Map { .. } => "map",
            Self::Composite { .. } => "composite",
            Self::Abstract => "abstract",
            Self::Opaque => "opaque",
        }
    }
}

/// One-level decomposition of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Canonical type name
    pub name: String,

    /// Structural kind
    pub kind: TypeKind,

    /// Names of abstract types this type is assignable to
    pub supertypes: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
        }
    }

    pub fn with_supertypes<I, S>(mut self, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes.extend(supertypes.into_iter().map(Into::into));
        self
    }

    /// Descriptor of a scalar type.
    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(scalar.name(), TypeKind::Scalar(scalar))
            .with_supertypes(scalar.supertypes().iter().copied())
    }

    /// Whether the type is assignable to `name` (itself or a supertype).
    pub fn is_assignable_to(&self, name: &str) -> bool {
        self.name == name || self.supertypes.iter().any(|s| s == name)
    }

    /// Fields of a composite, empty for every other kind.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Composite { fields } => fields,
            _ => &[],
        }
    }

    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self.kind {
            TypeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite { .. })
    }
}
