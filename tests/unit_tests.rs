use clap::Parser;
use fixturegen::{
    build_configuration, check_catalog, describe_type, generate_documents, load_catalog,
    GenerateOpts, SchemaOpts,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"
types:
  - name: Status
    kind: enum
    variants: [NEW, PAID, SHIPPED]

  - name: Shape
    kind: abstract

  - name: Circle
    implements: [Shape]
    fields:
      - { name: radius, type: f64 }

  - name: Order
    fields:
      - { name: id, type: uuid }
      - { name: status, type: Status }
      - { name: confirmed, type: bool, tags: [assert_true] }
      - { name: lines, type: "list<string>" }
      - { name: placed, type: date, tags: [past] }

  - name: Tree
    fields:
      - { name: label, type: string }
      - { name: children, type: "list<Tree>" }
"#;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    opts: GenerateOpts,
}

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn opts(schema: PathBuf, type_expr: &str) -> GenerateOpts {
    GenerateOpts {
        schema: SchemaOpts { schema },
        type_expr: type_expr.to_string(),
        count: 3,
        seed: Some(42),
        config: None,
        max_depth: None,
        reference_date: None,
        no_constraints: false,
        pretty: false,
    }
}

#[test]
fn test_generate_args_parsing() {
    let cli = TestCli::parse_from([
        "fixturegen",
        "--schema",
        "catalog.yaml",
        "--type",
        "list<Order>",
        "-n",
        "5",
        "--seed",
        "9",
        "--no-constraints",
    ]);

    assert_eq!(cli.opts.schema.schema, PathBuf::from("catalog.yaml"));
    assert_eq!(cli.opts.type_expr, "list<Order>");
    assert_eq!(cli.opts.count, 5);
    assert_eq!(cli.opts.seed, Some(9));
    assert!(cli.opts.no_constraints);
    assert!(!cli.opts.pretty);
    assert_eq!(cli.opts.max_depth, None);
}

#[test]
fn test_generate_args_defaults() {
    let cli = TestCli::parse_from(["fixturegen", "-s", "c.yaml", "-t", "Order"]);
    assert_eq!(cli.opts.count, 1);
    assert_eq!(cli.opts.seed, None);
    assert!(cli.opts.config.is_none());
    assert!(cli.opts.reference_date.is_none());
}

#[test]
fn test_reference_date_pins_past_values() {
    let cli = TestCli::parse_from([
        "fixturegen",
        "-s",
        "c.yaml",
        "-t",
        "Order",
        "--reference-date",
        "2024-06-01",
    ]);
    let reference = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(cli.opts.reference_date, Some(reference));
    assert_eq!(build_configuration(&cli.opts).unwrap().reference_date(), reference);

    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();
    let mut opts = opts(schema.path().to_path_buf(), "Order");
    opts.reference_date = Some(reference);

    let documents = generate_documents(&catalog, &opts).unwrap();
    assert_eq!(documents, generate_documents(&catalog, &opts).unwrap());
    for document in &documents {
        let json: serde_json::Value = serde_json::from_str(document).unwrap();
        let placed: chrono::NaiveDate = json["placed"].as_str().unwrap().parse().unwrap();
        assert!(placed < reference);
    }
}

#[test]
fn test_invalid_reference_date_is_rejected() {
    let result = TestCli::try_parse_from([
        "fixturegen",
        "-s",
        "c.yaml",
        "-t",
        "Order",
        "--reference-date",
        "June 1st",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_load_catalog_reports_path() {
    let err = load_catalog(&PathBuf::from("/nonexistent/catalog.yaml")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/catalog.yaml"));
}

#[test]
fn test_generate_documents_deterministic() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();
    let opts = opts(schema.path().to_path_buf(), "Order");

    let first = generate_documents(&catalog, &opts).unwrap();
    let second = generate_documents(&catalog, &opts).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);

    for document in &first {
        assert!(!document.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(document).unwrap();
        assert_eq!(json["confirmed"], serde_json::Value::Bool(true));
        let status = json["status"].as_str().unwrap();
        assert!(["NEW", "PAID", "SHIPPED"].contains(&status));
    }
}

#[test]
fn test_generate_documents_pretty() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();
    let mut opts = opts(schema.path().to_path_buf(), "Circle");
    opts.count = 1;
    opts.pretty = true;

    let documents = generate_documents(&catalog, &opts).unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].contains("\n  \"radius\""));
}

#[test]
fn test_generate_documents_type_expression() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();
    let opts = opts(schema.path().to_path_buf(), "list<Status>");

    for document in generate_documents(&catalog, &opts).unwrap() {
        let json: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert!(json.is_array());
    }
}

#[test]
fn test_generate_documents_unknown_type() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();
    let opts = opts(schema.path().to_path_buf(), "list<Invoice>");

    let err = generate_documents(&catalog, &opts).unwrap_err();
    assert!(err.to_string().contains("missing from the catalog"));
}

#[test]
fn test_cli_flags_override_config_file() {
    let schema = write_temp(CATALOG);
    let config = write_temp("seed: 1\nmax_depth: 2\nexclude: [Order.lines]\n");

    let mut opts = opts(schema.path().to_path_buf(), "Order");
    opts.config = Some(config.path().to_path_buf());
    opts.max_depth = Some(5);

    let configuration = build_configuration(&opts).unwrap();
    assert_eq!(configuration.seed(), 42);
    assert_eq!(configuration.max_depth(), 5);
    assert_eq!(configuration.excluded_fields().len(), 1);

    opts.seed = None;
    assert_eq!(build_configuration(&opts).unwrap().seed(), 1);
}

#[test]
fn test_excluded_field_from_config_file() {
    let schema = write_temp(CATALOG);
    let config = write_temp("exclude: [Order.lines]\n");
    let catalog = load_catalog(schema.path()).unwrap();

    let mut opts = opts(schema.path().to_path_buf(), "Order");
    opts.config = Some(config.path().to_path_buf());

    for document in generate_documents(&catalog, &opts).unwrap() {
        let json: serde_json::Value = serde_json::from_str(&document).unwrap();
        assert_eq!(json["lines"], serde_json::json!([]));
    }
}

#[test]
fn test_invalid_config_file() {
    let schema = write_temp(CATALOG);
    let config = write_temp("colection_size: { min: 1, max: 2 }\n");

    let mut opts = opts(schema.path().to_path_buf(), "Order");
    opts.config = Some(config.path().to_path_buf());

    let err = build_configuration(&opts).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load configuration"));
}

#[test]
fn test_describe_type() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();

    let tree = describe_type(&catalog, "Tree").unwrap();
    assert!(tree.contains("name: Tree"));
    assert!(tree.contains("recursive: true"));

    let shape = describe_type(&catalog, "Shape").unwrap();
    assert!(shape.contains("kind: abstract"));
    assert!(shape.contains("- Circle"));

    assert!(describe_type(&catalog, "Invoice").is_err());
}

#[test]
fn test_check_catalog_report() {
    let schema = write_temp(CATALOG);
    let catalog = load_catalog(schema.path()).unwrap();

    let report = check_catalog(&catalog);
    assert_eq!(report.type_count, 5);
    assert_eq!(report.recursive, vec!["Tree".to_string()]);

    let rendered = report.to_string();
    assert!(rendered.starts_with("Catalog OK: 5 type(s)"));
    assert!(rendered.contains("Tree"));
}
