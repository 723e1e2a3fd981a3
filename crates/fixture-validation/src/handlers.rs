//! Providers for individual constraint tags.
//!
//! Handlers read their parameters from the tags of the field being
//! populated. Each handler declines the types it cannot produce through
//! [`Provider::supports`], so an unrelated tag never shadows the defaults.

use crate::pattern::PatternGenerator;
use crate::tags;
use chrono::{Months, NaiveDate};
use fixture_core::{ConstraintTag, ScalarType, TypeDescriptor, Value};
use fixture_generator::randomizers::numeric::{self, DEFAULT_FLOAT_BOUND};
use fixture_generator::randomizers::{temporal, text};
use fixture_generator::{ProvideRequest, Provider, ProviderError};
use rand::Rng;

/// How far past/future values may lie from the reference date.
const TEMPORAL_WINDOW_MONTHS: u32 = 120;

fn field_tag<'a>(request: &ProvideRequest<'a>, name: &str) -> Option<&'a ConstraintTag> {
    request.field.and_then(|field| field.tag(name))
}

fn mismatch(request: &ProvideRequest<'_>, expected: &str) -> ProviderError {
    ProviderError::TypeMismatch {
        type_name: request.descriptor.name.clone(),
        expected: expected.to_string(),
    }
}

fn invalid(tag: &str, param: &str, reason: impl Into<String>) -> ProviderError {
    ProviderError::InvalidParameter {
        tag: tag.to_string(),
        param: param.to_string(),
        reason: reason.into(),
    }
}

fn is_numeric(descriptor: &TypeDescriptor) -> bool {
    descriptor
        .as_scalar()
        .is_some_and(|s| s.is_integer() || s.is_float())
}

/// `assert_true` / `assert_false`.
#[derive(Debug, Clone, Copy)]
pub struct BoolHandler(pub bool);

impl Provider for BoolHandler {
    fn provide(&self, _request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        Ok(Value::Bool(self.0))
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.as_scalar() == Some(ScalarType::Bool)
    }
}

/// `null`: any type.
#[derive(Debug, Clone, Copy)]
pub struct NullHandler;

impl Provider for NullHandler {
    fn provide(&self, _request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        Ok(Value::Null)
    }
}

/// Direction of a temporal constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tense {
    Past,
    Future,
}

/// `past` / `future`: dates and date-times within ten years of the
/// configured reference date, never on it.
#[derive(Debug, Clone, Copy)]
pub struct TemporalHandler(pub Tense);

impl TemporalHandler {
    fn window(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        let span = Months::new(TEMPORAL_WINDOW_MONTHS);
        match self.0 {
            Tense::Past => (
                reference.checked_sub_months(span).unwrap_or(NaiveDate::MIN),
                reference.pred_opt().unwrap_or(NaiveDate::MIN),
            ),
            Tense::Future => (
                reference.succ_opt().unwrap_or(NaiveDate::MAX),
                reference.checked_add_months(span).unwrap_or(NaiveDate::MAX),
            ),
        }
    }
}

impl Provider for TemporalHandler {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        let (start, end) = self.window(request.config.reference_date());
        let rng = &mut *request.rng;
        match request.descriptor.as_scalar() {
            Some(ScalarType::Date) => Ok(Value::Date(temporal::random_date(rng, start, end))),
            Some(ScalarType::DateTime) => {
                Ok(Value::DateTime(temporal::random_datetime(rng, start, end)))
            }
            Some(ScalarType::ZonedDateTime) => {
                let utc = temporal::random_datetime(rng, start, end);
                Ok(Value::ZonedDateTime(utc.and_utc().fixed_offset()))
            }
            _ => Err(mismatch(request, "date, datetime or zoned_datetime")),
        }
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        matches!(
            descriptor.as_scalar(),
            Some(ScalarType::Date | ScalarType::DateTime | ScalarType::ZonedDateTime)
        )
    }
}

/// Read the bound carried by `tag` on the field, if the tag is present.
fn read_bound<T>(
    request: &ProvideRequest<'_>,
    tag: &str,
    expected: &str,
    parse: impl Fn(&ConstraintTag) -> Option<T>,
) -> Result<Option<T>, ProviderError> {
    match field_tag(request, tag) {
        None => Ok(None),
        Some(found) => parse(found)
            .map(Some)
            .ok_or_else(|| invalid(tag, "value", expected)),
    }
}

fn numeric_scalar(request: &ProvideRequest<'_>) -> Result<ScalarType, ProviderError> {
    request
        .scalar()
        .ok_or_else(|| mismatch(request, "numeric scalar"))
}

/// Draw an integer of `scalar` in `[lo, hi]`.
fn int_in_range(
    request: &mut ProvideRequest<'_>,
    scalar: ScalarType,
    tag: &str,
    lo: i128,
    hi: i128,
) -> Result<Value, ProviderError> {
    numeric::generate_int_range(&mut *request.rng, scalar, lo, hi)
        .ok_or_else(|| invalid(tag, "value", format!("no {scalar} lies in [{lo}, {hi}]")))
}

/// Draw a number of the requested scalar type in `[min, max]`.
///
/// Integer targets round the bounds inwards. Missing float bounds default
/// to `±DEFAULT_FLOAT_BOUND`, widened so a lone bound is honoured.
fn float_in_range(
    request: &mut ProvideRequest<'_>,
    tag: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Value, ProviderError> {
    let scalar = numeric_scalar(request)?;

    if let Some((type_min, type_max)) = scalar.integer_bounds() {
        let lo = min.map_or(type_min, |v| v.ceil() as i128);
        let hi = max.map_or(type_max, |v| v.floor() as i128);
        return int_in_range(request, scalar, tag, lo, hi);
    }

    let lo = min.unwrap_or_else(|| {
        max.map_or(-DEFAULT_FLOAT_BOUND, |hi| hi.min(0.0) - DEFAULT_FLOAT_BOUND)
    });
    let hi = max.unwrap_or_else(|| lo.max(0.0) + DEFAULT_FLOAT_BOUND);
    if lo > hi {
        return Err(invalid(tag, "value", format!("empty range [{lo}, {hi}]")));
    }

    let rng = &mut *request.rng;
    match scalar {
        ScalarType::F32 => {
            let limit = f64::from(f32::MAX);
            if lo < -limit || hi > limit {
                return Err(invalid(
                    tag,
                    "value",
                    format!("[{lo}, {hi}] exceeds the f32 range"),
                ));
            }
            Ok(numeric::generate_f32_range(rng, lo, hi))
        }
        ScalarType::F64 => Ok(numeric::generate_float_range(rng, lo, hi)),
        ScalarType::Decimal => {
            let value = numeric::sample_f64(rng, lo, hi);
            let rounded = format!("{value:.2}");
            let in_range = rounded.parse::<f64>().is_ok_and(|r| (lo..=hi).contains(&r));
            Ok(Value::Decimal(if in_range { rounded } else { value.to_string() }))
        }
        _ => Err(mismatch(request, "numeric scalar")),
    }
}

/// `min` / `max`: integer bounds, both tags read together.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxHandler;

impl Provider for MinMaxHandler {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        let int_param = |tag: &ConstraintTag| tag.param_i128("value");
        let min = read_bound(request, tags::MIN, "expected an integer", int_param)?;
        let max = read_bound(request, tags::MAX, "expected an integer", int_param)?;

        let scalar = numeric_scalar(request)?;
        match scalar.integer_bounds() {
            Some((type_min, type_max)) => int_in_range(
                request,
                scalar,
                tags::MIN,
                min.unwrap_or(type_min),
                max.unwrap_or(type_max),
            ),
            None => float_in_range(
                request,
                tags::MIN,
                min.map(|v| v as f64),
                max.map(|v| v as f64),
            ),
        }
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        is_numeric(descriptor)
    }
}

/// `decimal_min` / `decimal_max`: bounds given as numbers or numeric strings.
#[derive(Debug, Clone, Copy)]
pub struct DecimalMinMaxHandler;

impl Provider for DecimalMinMaxHandler {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        let float_param =
            |tag: &ConstraintTag| tag.param_f64("value").filter(|v| v.is_finite());
        let min = read_bound(request, tags::DECIMAL_MIN, "expected a finite number", float_param)?;
        let max = read_bound(request, tags::DECIMAL_MAX, "expected a finite number", float_param)?;
        float_in_range(request, tags::DECIMAL_MIN, min, max)
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        is_numeric(descriptor)
    }
}

/// `pattern`: strings matching the `regexp` parameter.
#[derive(Debug, Clone, Copy)]
pub struct PatternHandler;

impl Provider for PatternHandler {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        let regexp = field_tag(request, tags::PATTERN)
            .and_then(|tag| tag.param_str("regexp"))
            .ok_or_else(|| invalid(tags::PATTERN, "regexp", "missing pattern"))?;
        let generator = PatternGenerator::new(regexp)?;
        Ok(Value::String(generator.generate(&mut *request.rng)?))
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.as_scalar() == Some(ScalarType::String)
    }
}

/// `size`: strings with a length in `[min, max]` from the configured charset.
#[derive(Debug, Clone, Copy)]
pub struct SizeHandler;

impl Provider for SizeHandler {
    fn provide(&self, request: &mut ProvideRequest<'_>) -> Result<Value, ProviderError> {
        let tag = field_tag(request, tags::SIZE);
        let read = |param: &str| -> Result<Option<usize>, ProviderError> {
            match tag.and_then(|t| t.param(param)) {
                None => Ok(None),
                Some(_) => tag
                    .and_then(|t| t.param_i64(param))
                    .and_then(|v| usize::try_from(v).ok())
                    .map(Some)
                    .ok_or_else(|| invalid(tags::SIZE, param, "expected a non-negative integer")),
            }
        };

        let min = read("min")?.unwrap_or(0);
        let max = read("max")?
            .unwrap_or_else(|| min.max(request.config.string_length().max));
        if min > max {
            return Err(invalid(tags::SIZE, "max", format!("{max} is below min {min}")));
        }

        let charset = request.config.charset();
        let len = request.rng.gen_range(min..=max);
        Ok(Value::String(text::random_text(&mut *request.rng, charset, len)))
    }

    fn supports(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.as_scalar() == Some(ScalarType::String)
    }
}
