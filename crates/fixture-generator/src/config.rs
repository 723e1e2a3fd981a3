//! Generation session configuration.
//!
//! A [`Configuration`] is an immutable parameter bundle shared by the
//! registry chain, the providers and the population engine. It is built
//! in code with [`ConfigurationBuilder`], optionally starting from a YAML
//! [`ConfigFile`]:
//!
//! ```yaml
//! seed: 7
//! collection_size: { min: 0, max: 3 }
//! max_depth: 4
//! cycle_policy: break_on_repeat
//! charset: alphabetic
//! exclude: [password, Order.internal_notes]
//! fixed:
//!   Order.status: NEW
//! bindings:
//!   Shape: Circle
//! ```

use crate::error::ConfigError;
use crate::provider::{ConstantProvider, Provider, TypeKey};
use crate::randomizers::static_value::yaml_to_value;
use chrono::NaiveDate;
use fixture_core::{FieldDescriptor, TypeDescriptor, TypeRef};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Default seed when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Default bound on nested composite depth.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Inclusive size range for collections, maps and strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: usize,
    pub max: usize,
}

impl SizeRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// An inverted range (`min > max`) is empty.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, size: usize) -> bool {
        !self.is_empty() && (self.min..=self.max).contains(&size)
    }

    /// Draw a size; an empty range always yields zero.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        if self.is_empty() {
            0
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

/// Characters used by text providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// Letters and digits
    #[default]
    Alphanumeric,
    /// Letters only
    Alphabetic,
    /// Digits only
    Numeric,
    /// Printable ASCII including punctuation and space
    Ascii,
}

const ALPHABETIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const NUMERIC: &[u8] = b"0123456789";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

impl Charset {
    /// Draw one character.
    pub fn sample_char<R: Rng>(&self, rng: &mut R) -> char {
        let pool = match self {
            Self::Alphanumeric => ALPHANUMERIC,
            Self::Alphabetic => ALPHABETIC,
            Self::Numeric => NUMERIC,
            Self::Ascii => return char::from(rng.gen_range(0x20u8..=0x7e)),
        };
        char::from(pool[rng.gen_range(0..pool.len())])
    }

    /// Whether `c` belongs to this charset.
    pub fn contains(&self, c: char) -> bool {
        match self {
            Self::Alphanumeric => c.is_ascii_alphanumeric(),
            Self::Alphabetic => c.is_ascii_alphabetic(),
            Self::Numeric => c.is_ascii_digit(),
            Self::Ascii => (' '..='~').contains(&c),
        }
    }
}

/// How the engine treats a composite type already being populated higher up
/// the same branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Keep recursing until the depth budget runs out
    #[default]
    Unroll,
    /// Stop at the first repeated type with a null
    BreakOnRepeat,
}

/// A field as seen by predicates and field-keyed providers.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    /// Name of the composite declaring the field
    pub owner: &'a str,
    /// The field itself
    pub field: &'a FieldDescriptor,
    /// Described field type
    pub field_type: &'a TypeDescriptor,
    /// Dotted path from the generated root, e.g. `Order.customer.email`
    pub path: &'a str,
}

type PredicateFn = dyn Fn(&FieldContext<'_>) -> bool + Send + Sync;

/// Predicate selecting fields for exclusion or overrides.
#[derive(Clone)]
pub struct FieldPredicate {
    label: String,
    test: Arc<PredicateFn>,
}

impl FieldPredicate {
    /// Predicate from an arbitrary closure.
    pub fn new<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&FieldContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Any field with this name, in any type.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(format!("named({name})"), move |ctx| ctx.field.name == name)
    }

    /// The field `name` declared by `owner`.
    pub fn in_type(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self::new(format!("{owner}.{name}"), move |ctx| {
            ctx.owner == owner && ctx.field.name == name
        })
    }

    /// Fields whose type is assignable to `type_name`.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(format!("of_type({type_name})"), move |ctx| {
            ctx.field_type.is_assignable_to(&type_name)
        })
    }

    /// Fields carrying a constraint tag.
    pub fn tagged(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(format!("tagged({tag})"), move |ctx| ctx.field.has_tag(&tag))
    }

    /// The field at an exact dotted path.
    pub fn at_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(format!("at_path({path})"), move |ctx| ctx.path == path)
    }

    /// Parse `field` or `Type.field`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        let valid = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace);
        match spec.split_once('.') {
            None if valid(spec) => Ok(Self::named(spec)),
            Some((owner, name)) if valid(owner) && valid(name) && !name.contains('.') => {
                Ok(Self::in_type(owner, name))
            }
            _ => Err(ConfigError::InvalidExclusion(spec.to_string())),
        }
    }

    pub fn matches(&self, ctx: &FieldContext<'_>) -> bool {
        (self.test)(ctx)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for FieldPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldPredicate").field(&self.label).finish()
    }
}

/// What an override applies to.
#[derive(Debug, Clone)]
pub enum OverrideKey {
    Type(TypeKey),
    Field(FieldPredicate),
}

/// A user-supplied provider.
#[derive(Clone)]
pub struct Override {
    pub key: OverrideKey,
    pub provider: Arc<dyn Provider>,
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Override").field("key", &self.key).finish()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Immutable configuration of a generation session.
#[derive(Debug, Clone)]
pub struct Configuration {
    seed: u64,
    collection_size: SizeRange,
    map_size: SizeRange,
    string_length: SizeRange,
    max_depth: usize,
    cycle_policy: CyclePolicy,
    excluded: Vec<FieldPredicate>,
    overrides: Vec<Override>,
    bindings: HashMap<String, TypeRef>,
    charset: Charset,
    locale: String,
    date_range: (NaiveDate, NaiveDate),
    reference_date: NaiveDate,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            collection_size: SizeRange::new(1, 5),
            map_size: SizeRange::new(1, 5),
            string_length: SizeRange::new(1, 16),
            max_depth: DEFAULT_MAX_DEPTH,
            cycle_policy: CyclePolicy::default(),
            excluded: Vec::new(),
            overrides: Vec::new(),
            bindings: HashMap::new(),
            charset: Charset::default(),
            locale: "en".to_string(),
            date_range: (ymd(2000, 1, 1), ymd(2030, 12, 31)),
            // Only the past/future constraint tags read this
            reference_date: chrono::Utc::now().date_naive(),
        }
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Start a builder from this configuration.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder {
            config: self.clone(),
        }
    }

    /// Same configuration with another seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn collection_size(&self) -> SizeRange {
        self.collection_size
    }

    pub fn map_size(&self) -> SizeRange {
        self.map_size
    }

    pub fn string_length(&self) -> SizeRange {
        self.string_length
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Inclusive range for generated dates.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        self.date_range
    }

    /// "Now" for past/future constraints.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Concrete binding of an abstract type.
    pub fn binding(&self, abstract_name: &str) -> Option<&TypeRef> {
        self.bindings.get(abstract_name)
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn excluded_fields(&self) -> &[FieldPredicate] {
        &self.excluded
    }

    /// Whether any exclusion predicate matches the field.
    pub fn is_excluded(&self, ctx: &FieldContext<'_>) -> bool {
        self.excluded.iter().any(|p| p.matches(ctx))
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Size range of lists and arrays (inclusive).
    pub fn collection_size(mut self, min: usize, max: usize) -> Self {
        self.config.collection_size = SizeRange::new(min, max);
        self
    }

    /// Size range of maps (inclusive).
    pub fn map_size(mut self, min: usize, max: usize) -> Self {
        self.config.map_size = SizeRange::new(min, max);
        self
    }

    /// Length range of generated strings and byte arrays (inclusive).
    pub fn string_length(mut self, min: usize, max: usize) -> Self {
        self.config.string_length = SizeRange::new(min, max);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.config.cycle_policy = policy;
        self
    }

    /// Shorthand for [`CyclePolicy::BreakOnRepeat`].
    pub fn break_cycles(self) -> Self {
        self.cycle_policy(CyclePolicy::BreakOnRepeat)
    }

    /// Leave matching fields at their zero value.
    pub fn exclude(mut self, predicate: FieldPredicate) -> Self {
        self.config.excluded.push(predicate);
        self
    }

    /// Use `provider` for every value of the given type.
    pub fn override_type(
        mut self,
        key: impl Into<TypeKey>,
        provider: impl Provider + 'static,
    ) -> Self {
        self.config.overrides.push(Override {
            key: OverrideKey::Type(key.into()),
            provider: Arc::new(provider),
        });
        self
    }

    /// Use `provider` for every field matching the predicate.
    pub fn override_field(mut self, predicate: FieldPredicate, provider: impl Provider + 'static) -> Self {
        self.config.overrides.push(Override {
            key: OverrideKey::Field(predicate),
            provider: Arc::new(provider),
        });
        self
    }

    /// Populate `abstract_name` with `concrete` instead.
    pub fn bind(mut self, abstract_name: impl Into<String>, concrete: TypeRef) -> Self {
        self.config.bindings.insert(abstract_name.into(), concrete);
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.config.charset = charset;
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.config.locale = locale.into();
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.config.date_range = (start, end);
        self
    }

    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = date;
        self
    }

    pub fn build(self) -> Result<Configuration, ConfigError> {
        let (start, end) = self.config.date_range;
        if start > end {
            return Err(ConfigError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(self.config)
    }
}

/// Inclusive date range as written in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Serialisable subset of [`Configuration`].
///
/// Predicates are limited to `field` / `Type.field` names. Overrides are
/// limited to fixed values under `fixed`; provider overrides can only be
/// supplied in code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub seed: Option<u64>,
    pub collection_size: Option<SizeRange>,
    pub map_size: Option<SizeRange>,
    pub string_length: Option<SizeRange>,
    pub max_depth: Option<usize>,
    pub cycle_policy: Option<CyclePolicy>,
    pub charset: Option<Charset>,
    pub locale: Option<String>,
    pub date_range: Option<DateRange>,
    pub reference_date: Option<NaiveDate>,
    pub exclude: Vec<String>,
    pub bindings: BTreeMap<String, String>,
    /// Constant values keyed by `field` / `Type.field`
    pub fixed: BTreeMap<String, serde_yaml::Value>,
}

impl ConfigFile {
    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply every present setting onto a builder.
    pub fn apply(self, mut builder: ConfigurationBuilder) -> Result<ConfigurationBuilder, ConfigError> {
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(range) = self.collection_size {
            builder = builder.collection_size(range.min, range.max);
        }
        if let Some(range) = self.map_size {
            builder = builder.map_size(range.min, range.max);
        }
        if let Some(range) = self.string_length {
            builder = builder.string_length(range.min, range.max);
        }
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        if let Some(policy) = self.cycle_policy {
            builder = builder.cycle_policy(policy);
        }
        if let Some(charset) = self.charset {
            builder = builder.charset(charset);
        }
        if let Some(locale) = self.locale {
            builder = builder.locale(locale);
        }
        if let Some(range) = self.date_range {
            builder = builder.date_range(range.start, range.end);
        }
        if let Some(date) = self.reference_date {
            builder = builder.reference_date(date);
        }
        for spec in &self.exclude {
            builder = builder.exclude(FieldPredicate::parse(spec)?);
        }
        for (name, target) in self.bindings {
            let concrete = target
                .parse::<TypeRef>()
                .map_err(|source| ConfigError::InvalidBinding {
                    name: name.clone(),
                    source,
                })?;
            builder = builder.bind(name, concrete);
        }
        for (spec, value) in &self.fixed {
            builder = builder.override_field(
                FieldPredicate::parse(spec)?,
                ConstantProvider(yaml_to_value(value)),
            );
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixture_core::ScalarType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_size_range_sampling() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = SizeRange::new(2, 4);
        for _ in 0..100 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }

    #[test]
    fn test_empty_size_range_yields_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = SizeRange::new(5, 1);
        assert!(range.is_empty());
        assert_eq!(range.sample(&mut rng), 0);
    }

    #[test]
    fn test_charset_membership() {
        let mut rng = StdRng::seed_from_u64(42);
        for charset in [
            Charset::Alphanumeric,
            Charset::Alphabetic,
            Charset::Numeric,
            Charset::Ascii,
        ] {
            for _ in 0..50 {
                assert!(charset.contains(charset.sample_char(&mut rng)));
            }
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = Configuration::builder().build().unwrap();
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(config.cycle_policy(), CyclePolicy::Unroll);
        assert_eq!(config.collection_size(), SizeRange::new(1, 5));
    }

    #[test]
    fn test_invalid_date_range() {
        let result = Configuration::builder()
            .date_range(ymd(2020, 1, 1), ymd(2010, 1, 1))
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_field_predicates() {
        let field = FieldDescriptor::new("email", ScalarType::String)
            .with_tag(fixture_core::ConstraintTag::new("pattern"));
        let field_type = TypeDescriptor::scalar(ScalarType::String);
        let ctx = FieldContext {
            owner: "User",
            field: &field,
            field_type: &field_type,
            path: "User.email",
        };

        assert!(FieldPredicate::named("email").matches(&ctx));
        assert!(FieldPredicate::in_type("User", "email").matches(&ctx));
        assert!(!FieldPredicate::in_type("Order", "email").matches(&ctx));
        assert!(FieldPredicate::of_type("Text").matches(&ctx));
        assert!(FieldPredicate::tagged("pattern").matches(&ctx));
        assert!(FieldPredicate::at_path("User.email").matches(&ctx));
        assert!(FieldPredicate::parse("User.email").unwrap().matches(&ctx));
        assert!(FieldPredicate::parse("a.b.c").is_err());
        assert!(FieldPredicate::parse("").is_err());
    }

    #[test]
    fn test_config_file_apply() {
        let yaml = r#"
seed: 7
collection_size: { min: 0, max: 3 }
max_depth: 4
cycle_policy: break_on_repeat
charset: alphabetic
date_range: { start: 2020-01-01, end: 2020-12-31 }
exclude: [password, Order.notes]
bindings:
  Shape: Circle
fixed:
  Order.status: NEW
"#;
        let file = ConfigFile::from_yaml(yaml).unwrap();
        let config = file
            .apply(Configuration::builder())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed(), 7);
        assert_eq!(config.collection_size(), SizeRange::new(0, 3));
        assert_eq!(config.max_depth(), 4);
        assert_eq!(config.cycle_policy(), CyclePolicy::BreakOnRepeat);
        assert_eq!(config.charset(), Charset::Alphabetic);
        assert_eq!(config.date_range(), (ymd(2020, 1, 1), ymd(2020, 12, 31)));
        assert_eq!(config.excluded_fields().len(), 2);
        assert_eq!(config.binding("Shape"), Some(&TypeRef::named("Circle")));
        assert_eq!(config.overrides().len(), 1);
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        assert!(ConfigFile::from_yaml("sede: 1").is_err());
    }

    #[test]
    fn test_config_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed: 99\nlocale: fr").unwrap();

        let config = ConfigFile::from_file(file.path())
            .unwrap()
            .apply(Configuration::builder())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.seed(), 99);
        assert_eq!(config.locale(), "fr");
    }
}
