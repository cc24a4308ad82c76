use spreadsheet_validation::ConfigError;
use spreadsheet_validation::decode::{DecodeFormat, DecodeOptions, decode_bytes};
use spreadsheet_validation::schema::SchemaDefinition;

fn validator() -> spreadsheet_validation::SpreadsheetValidator {
    SchemaDefinition::from_path("tests/fixtures/simple_schema.json")
        .unwrap()
        .build_validator()
        .unwrap()
}

fn csv(text: &str) -> spreadsheet_validation::types::RawGrid {
    decode_bytes(text.as_bytes(), DecodeFormat::Csv, &DecodeOptions::default()).unwrap()
}

#[test]
fn definition_file_builds_a_working_validator() {
    let report = validator().validate(&csv(
        "CODE,QTY,EXPIRES\nABC1,3,01/02/2031\nabc!,0,31/12/2029\nTOOLONGCODE,2.5,soon\n",
    ));

    let cells: Vec<(String, &str)> = report
        .cells
        .iter()
        .map(|c| (c.cell.to_string(), c.error_message.as_str()))
        .collect();
    assert_eq!(
        cells,
        vec![
            ("A3".to_string(), "Use letters and digits only"),
            ("B3".to_string(), "Value must be between 1 and 99999"),
            ("C3".to_string(), "Date must be on or after 01/01/2030"),
            ("A4".to_string(), "Value must have at most 8 characters"),
            ("B4".to_string(), "Numeric value must be an integer"),
            ("C4".to_string(), "Value is not a valid date"),
        ]
    );
}

#[test]
fn strict_headers_flag_is_honoured() {
    let report = validator().validate(&csv("CODE,QTY,EXPIRES,NOTES\nABC1,3,01/02/2031,x\n"));
    assert_eq!(report.headers, vec!["Unexpected header in column D: NOTES".to_string()]);
}

#[test]
fn definitions_missing_options_are_rejected() {
    let json = r#"{
        "headers": [{ "label": "QTY", "field": "quantity", "column": 1 }],
        "fields": [{ "field": "quantity", "column": 1, "rules": [{ "rule": "numberRange", "min": 1 }] }]
    }"#;
    let err = SchemaDefinition::from_json_str(json).unwrap().to_parts().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingRuleOption {
            rule: "numberRange",
            option: "max"
        }
    ));
}

#[test]
fn definitions_with_unmapped_fields_are_rejected() {
    let json = r#"{
        "headers": [{ "label": "QTY", "field": "quantity", "column": 1 }],
        "fields": [{ "field": "price", "column": 2, "rules": [{ "rule": "number" }] }]
    }"#;
    let err = SchemaDefinition::from_json_str(json).unwrap().build_validator().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownField { field } if field == "price"));
}

#[test]
fn unknown_keys_and_bad_patterns_are_rejected() {
    let unknown = r#"{ "headers": [], "fields": [], "strict": true }"#;
    assert!(matches!(
        SchemaDefinition::from_json_str(unknown),
        Err(ConfigError::Definition(_))
    ));

    let bad_pattern = r#"{
        "headers": [{ "label": "CODE", "field": "code", "column": 1 }],
        "fields": [{ "field": "code", "column": 1, "rules": [{ "rule": "matches", "pattern": "([a-z" }] }]
    }"#;
    assert!(matches!(
        SchemaDefinition::from_json_str(bad_pattern).unwrap().to_parts(),
        Err(ConfigError::InvalidPattern { .. })
    ));
}

#[test]
fn columns_beyond_xfd_are_rejected() {
    let json = r#"{
        "headers": [{ "label": "QTY", "field": "quantity", "column": 1 }],
        "fields": [{ "field": "quantity", "column": 16385, "rules": [] }]
    }"#;
    assert!(matches!(
        SchemaDefinition::from_json_str(json).unwrap().to_parts(),
        Err(ConfigError::UnsupportedColumn { column: 16385, .. })
    ));
}
