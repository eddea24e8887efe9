use super::*;
use crate::model::TestType;

#[test]
fn test_parse_schema_with_tests() {
    let yaml = r#"
version: 1
description: One row per store
columns:
  - name: store_id
    type: BIGINT
    tests:
      - unique
      - not_null
  - name: store_type
    tests:
      - accepted_values:
          values: [Supermarket, Convenience, Hypermarket, Express]
"#;
    let schema = ModelSchema::parse(yaml).unwrap();
    assert_eq!(schema.columns.len(), 2);
    assert_eq!(schema.columns[0].data_type.as_deref(), Some("BIGINT"));

    let tests = schema.extract_tests("dim_store");
    assert_eq!(tests.len(), 3);
    assert!(matches!(
        &tests[2].test_type,
        TestType::AcceptedValues { values } if values.len() == 4
    ));
}

#[test]
fn test_unsupported_version() {
    let err = ModelSchema::parse("version: 2\n").unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedSchemaVersion { version: 2 }));
}

#[test]
fn test_unknown_field_rejected() {
    assert!(ModelSchema::parse("version: 1\nconfig: {}\n").is_err());
}

#[test]
fn test_unknown_tests_are_skipped() {
    let yaml = r#"
version: 1
columns:
  - name: email
    tests: [not_null, looks_like_email]
"#;
    let schema = ModelSchema::parse(yaml).unwrap();
    assert_eq!(schema.extract_tests("stg_customers").len(), 1);
}
