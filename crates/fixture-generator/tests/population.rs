//! End-to-end population tests against a YAML catalog.

use fixture_core::{ScalarType, TypeCatalog, TypeRef, Value};
use fixture_generator::{
    generate, priority, provider_fn, ConfigFile, ConstantProvider, Configuration,
    FieldPredicate, GenerationError, PopulationEngine, ProviderTable, StaticRegistry,
};
use serde::Deserialize;

const CATALOG: &str = r#"
version: 1
types:
  - name: Status
    kind: enum
    variants: [Pending, Shipped, Delivered]

  - name: Scalars
    fields:
      - { name: small, type: i32 }
      - { name: big, type: i64 }
      - { name: port, type: u16 }
      - { name: ratio, type: f64 }
      - { name: price, type: decimal }
      - { name: label, type: string }
      - { name: initial, type: char }
      - { name: id, type: uuid }
      - { name: day, type: date }
      - { name: at, type: datetime }
      - { name: elapsed, type: duration }

  - name: Point
    fields:
      - { name: x, type: i32 }
      - { name: y, type: i32 }

  - name: Customer
    fields:
      - { name: id, type: uuid }
      - { name: name, type: string }
      - { name: email, type: string, tags: [email] }
      - { name: password, type: string }

  - name: Order
    fields:
      - { name: id, type: i64 }
      - { name: status, type: Status }
      - { name: customer, type: Customer }
      - { name: lines, type: "list<Point>" }
      - { name: notes, type: "map<string, string>" }
      - { name: codes, type: "array<u8>" }

  - name: Tree
    fields:
      - { name: label, type: string }
      - { name: children, type: "list<Tree>" }
"#;

fn catalog() -> TypeCatalog {
    TypeCatalog::from_yaml(CATALOG).unwrap()
}

fn order() -> TypeRef {
    TypeRef::named("Order")
}

fn tree_height(value: &Value) -> usize {
    match value.get_field("children").and_then(Value::as_list) {
        Some(children) => {
            1 + children
                .iter()
                .filter(|c| !c.is_null())
                .map(tree_height)
                .max()
                .unwrap_or(0)
        }
        None => 0,
    }
}

#[test]
fn test_same_seed_same_sequence() {
    let catalog = catalog();
    let config = Configuration::builder().seed(1234).build().unwrap();

    let mut first = PopulationEngine::new(&catalog, config.clone());
    let mut second = PopulationEngine::new(&catalog, config);
    for _ in 0..5 {
        assert_eq!(
            first.generate(&order()).unwrap(),
            second.generate(&order()).unwrap()
        );
    }
}

#[test]
fn test_different_seeds_differ() {
    let catalog = catalog();
    let a = generate(&catalog, &order(), &Configuration::default().with_seed(1)).unwrap();
    let b = generate(&catalog, &order(), &Configuration::default().with_seed(2)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_scalars_are_not_zero() {
    let catalog = catalog();
    let value = generate(
        &catalog,
        &TypeRef::named("Scalars"),
        &Configuration::default(),
    )
    .unwrap();

    let scalars = [
        ("small", ScalarType::I32),
        ("big", ScalarType::I64),
        ("port", ScalarType::U16),
        ("ratio", ScalarType::F64),
        ("price", ScalarType::Decimal),
        ("label", ScalarType::String),
        ("initial", ScalarType::Char),
        ("id", ScalarType::Uuid),
        ("day", ScalarType::Date),
        ("at", ScalarType::DateTime),
        ("elapsed", ScalarType::Duration),
    ];
    for (field, scalar) in scalars {
        let generated = value.get_field(field).unwrap();
        assert_ne!(generated, &Value::zero_scalar(scalar), "field {field}");
    }
}

#[test]
fn test_collection_and_map_sizes_stay_in_bounds() {
    let catalog = catalog();
    let config = Configuration::builder()
        .collection_size(2, 4)
        .map_size(1, 3)
        .build()
        .unwrap();
    let mut engine = PopulationEngine::new(&catalog, config);

    for result in engine.generate_n(&order(), 25) {
        let value = result.unwrap();
        let lines = value.get_field("lines").and_then(Value::as_list).unwrap();
        assert!((2..=4).contains(&lines.len()));
        let codes = value.get_field("codes").and_then(Value::as_list).unwrap();
        assert!((2..=4).contains(&codes.len()));
        let notes = value.get_field("notes").and_then(Value::as_map).unwrap();
        assert!((1..=3).contains(&notes.len()));
    }
}

#[test]
fn test_recursive_collections_terminate() {
    let catalog = catalog();
    let config = Configuration::builder()
        .max_depth(3)
        .collection_size(1, 2)
        .build()
        .unwrap();
    let tree = generate(&catalog, &TypeRef::named("Tree"), &config).unwrap();

    // Root plus three nested levels; the fourth level is cut to null
    assert_eq!(tree_height(&tree), 4);
}

#[test]
fn test_field_override_beats_type_default() {
    let catalog = catalog();
    let config = Configuration::builder()
        .override_field(
            FieldPredicate::in_type("Point", "x"),
            ConstantProvider(Value::Int(7)),
        )
        .build()
        .unwrap();
    let mut engine = PopulationEngine::new(&catalog, config);

    let mut y_values = Vec::new();
    for _ in 0..5 {
        let point = engine.generate_named("Point").unwrap();
        assert_eq!(point.get_field("x"), Some(&Value::Int(7)));
        y_values.push(point.get_field("y").and_then(Value::as_i64).unwrap());
    }
    assert!(y_values.iter().any(|y| *y != 7));
}

#[test]
fn test_field_override_beats_type_override() {
    let catalog = catalog();
    let config = Configuration::builder()
        .override_type(ScalarType::I32, ConstantProvider(Value::Int(1)))
        .override_field(FieldPredicate::named("x"), ConstantProvider(Value::Int(7)))
        .build()
        .unwrap();
    let point = generate(&catalog, &TypeRef::named("Point"), &config).unwrap();

    assert_eq!(point.get_field("x"), Some(&Value::Int(7)));
    assert_eq!(point.get_field("y"), Some(&Value::Int(1)));
}

#[test]
fn test_excluded_field_keeps_zero_value() {
    let catalog = catalog();
    let config = Configuration::builder()
        .exclude(FieldPredicate::named("password"))
        .exclude(FieldPredicate::in_type("Order", "lines"))
        .build()
        .unwrap();
    let value = generate(&catalog, &order(), &config).unwrap();

    assert_eq!(
        value.get_path("customer.password"),
        Some(&Value::String(String::new()))
    );
    assert_eq!(value.get_field("lines"), Some(&Value::List(Vec::new())));
    assert!(!value
        .get_path("customer.name")
        .and_then(Value::as_str)
        .unwrap()
        .is_empty());
}

#[test]
fn test_tag_handler_beats_type_default() {
    let catalog = catalog();
    let mut table = ProviderTable::new();
    table.register_tag("email", provider_fn(|request| {
        let user = request.config.charset().sample_char(&mut *request.rng);
        Ok(Value::String(format!("{user}@example.com")))
    }));

    let mut engine = PopulationEngine::new(&catalog, Configuration::default())
        .with_registry(priority::CONSTRAINTS, StaticRegistry::new("tags", table));
    let customer = engine.generate_named("Customer").unwrap();

    let email = customer.get_field("email").and_then(Value::as_str).unwrap();
    assert!(email.ends_with("@example.com"));
    let name = customer.get_field("name").and_then(Value::as_str).unwrap();
    assert!(!name.contains('@'));
}

#[test]
fn test_type_override_beats_tag_handler() {
    let catalog = catalog();
    let mut table = ProviderTable::new();
    table.register_tag("email", ConstantProvider(Value::String("tag".to_string())));

    let config = Configuration::builder()
        .override_type(ScalarType::String, ConstantProvider(Value::String("override".to_string())))
        .build()
        .unwrap();
    let mut engine = PopulationEngine::new(&catalog, config)
        .with_registry(priority::CONSTRAINTS, StaticRegistry::new("tags", table));
    let customer = engine.generate_named("Customer").unwrap();

    assert_eq!(
        customer.get_field("email"),
        Some(&Value::String("override".to_string()))
    );
}

#[test]
fn test_enum_fields_pick_declared_variants() {
    let catalog = catalog();
    let mut engine = PopulationEngine::new(&catalog, Configuration::default());

    for result in engine.generate_n(&order(), 10) {
        let status = result.unwrap();
        match status.get_field("status") {
            Some(Value::Enum(variant)) => {
                assert!(["Pending", "Shipped", "Delivered"].contains(&variant.as_str()))
            }
            other => panic!("Expected enum variant, got {other:?}"),
        }
    }
}

#[test]
fn test_unknown_root_type_is_unsupported() {
    let catalog = catalog();
    let err = generate(&catalog, &TypeRef::named("Invoice"), &Configuration::default())
        .unwrap_err();
    assert!(matches!(err, GenerationError::UnsupportedType { .. }));
}

#[derive(Debug, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
struct Order {
    id: i64,
    status: String,
    lines: Vec<Point>,
}

#[test]
fn test_generate_as_caller_types() {
    let catalog = catalog();
    let config = Configuration::builder()
        .collection_size(3, 3)
        .override_type(ScalarType::I32, ConstantProvider(Value::Int(5)))
        .build()
        .unwrap();
    let mut engine = PopulationEngine::new(&catalog, config);

    let order: Order = engine.generate_as(&order()).unwrap();
    assert_eq!(order.lines.len(), 3);
    assert!(order.lines.iter().all(|p| p.x == 5 && p.y == 5));
    assert!(!order.status.is_empty());
    assert_ne!(order.id, 0);
}

#[test]
fn test_config_file_drives_engine() {
    let catalog = catalog();
    let file = ConfigFile::from_yaml(
        r#"
seed: 5
collection_size: { min: 0, max: 0 }
exclude: [Customer.password]
fixed:
  Order.id: 99
"#,
    )
    .unwrap();
    let config = file.apply(Configuration::builder()).unwrap().build().unwrap();
    let value = generate(&catalog, &order(), &config).unwrap();

    assert_eq!(value.get_field("id"), Some(&Value::Int(99)));
    assert_eq!(value.get_field("lines"), Some(&Value::List(Vec::new())));
    assert_eq!(
        value.get_path("customer.password"),
        Some(&Value::String(String::new()))
    );
}
