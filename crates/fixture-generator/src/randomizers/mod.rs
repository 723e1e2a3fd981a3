//! Built-in randomizers for scalar and enum types.
//!
//! The generator functions in the submodules take an RNG and explicit
//! bounds so constraint handlers can reuse them. [`DefaultRegistry`] wires
//! them to every [`ScalarType`] using the ranges from the session
//! [`Configuration`].

pub mod numeric;
pub mod static_value;
pub mod temporal;
pub mod text;
pub mod uuid;

use crate::config::Configuration;
use crate::error::ProviderError;
use crate::provider::{ProvideRequest, Provider, ProviderTable};
use crate::registry::RandomizerRegistry;
use fixture_core::{supertype, ScalarType, TypeDescriptor, TypeKind, Value};
use rand::Rng;

/// Generate a value of `scalar` from the configured default ranges.
pub fn generate_scalar<R: Rng>(scalar: ScalarType, config: &Configuration, rng: &mut R) -> Value {
    use numeric::DEFAULT_FLOAT_BOUND;

    match scalar {
        ScalarType::Bool => Value::Bool(rng.gen_bool(0.5)),
        ScalarType::I8
        | ScalarType::I16
        | ScalarType::I32
        | ScalarType::I64
        | ScalarType::U8
        | ScalarType::U16
        | ScalarType::U32
        | ScalarType::U64 => numeric::generate_integer(rng, scalar).unwrap_or(Value::Int(0)),
        ScalarType::F32 => {
            numeric::generate_f32_range(rng, -DEFAULT_FLOAT_BOUND, DEFAULT_FLOAT_BOUND)
        }
        ScalarType::F64 => {
            numeric::generate_float_range(rng, -DEFAULT_FLOAT_BOUND, DEFAULT_FLOAT_BOUND)
        }
        ScalarType::Decimal => {
            numeric::generate_decimal_range(rng, -DEFAULT_FLOAT_BOUND, DEFAULT_FLOAT_BOUND)
        }
        ScalarType::Char => text::generate_char(rng, config.charset()),
        ScalarType::String => {
            text::generate_string(rng, config.charset(), config.string_length())
        }
        ScalarType::Bytes => {
            let len = config.string_length().sample(rng);
            uuid::generate_bytes(rng, len)
        }
        ScalarType::Uuid => uuid::generate_uuid_v4(rng),
        ScalarType::Date => temporal::generate_date(rng, config.date_range()),
        ScalarType::Time => temporal::generate_time(rng),
        ScalarType::DateTime => temporal::generate_datetime(rng, config.date_range()),
        ScalarType::ZonedDateTime => temporal::generate_zoned_datetime(rng, config.date_range()),
        ScalarType::Duration => temporal::generate_duration(rng),
    }
}

/// Default provider for one scalar type.
#[derive(Debug, Clone, Copy)]
pub struct ScalarRandomizer {
    scalar: ScalarType,
}

impl ScalarRandomizer {
    pub fn new(scalar: ScalarType) -> Self {
        Self { scalar }
    }
}

impl Provider for ScalarRandomizer {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        Ok(generate_scalar(self.scalar, request.config, &mut *request.rng))
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.as_scalar() == Some(self.scalar)
    }
}

/// Picks one declared variant of an enum uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumRandomizer;

impl Provider for EnumRandomizer {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        match &request.descriptor.kind {
            TypeKind::Enum { variants } if !variants.is_empty() => {
                let idx = request.rng.gen_range(0..variants.len());
                Ok(Value::Enum(variants[idx].clone()))
            }
            _ => Err(ProviderError::TypeMismatch {
                type_name: request.descriptor.name.clone(),
                expected: "enum with at least one variant".to_string(),
            }),
        }
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        matches!(descriptor.kind, TypeKind::Enum { .. })
    }
}

/// Registry holding the built-in randomizers.
#[derive(Debug, Default)]
pub struct DefaultRegistry {
    table: ProviderTable,
}

impl DefaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomizerRegistry for DefaultRegistry {
    fn name(&self) -> &str {
        "defaults"
    }

    fn init(&mut self, _config: &Configuration) {
        self.table.clear();
        for scalar in ScalarType::ALL {
            self.table.register_type(scalar, ScalarRandomizer::new(scalar));
        }
        self.table.register_type(supertype::ENUM, EnumRandomizer);
    }

    fn table(&self) -> &ProviderTable {
        &self.table
    }
}
