//! Applying a schema to mapped records.

use crate::address::CellAddress;
use crate::schema::Schema;
use crate::types::Record;

use super::report::CellError;

/// Run every schema chain against `record`, in declared-field order.
///
/// Fields missing from the record are validated as [`crate::types::Value::Null`]. At most one
/// error is produced per field.
pub fn validate_record(schema: &Schema, record: &Record) -> Vec<CellError> {
    schema
        .chains()
        .iter()
        .filter_map(|chain| chain.evaluate(record.get(chain.field())))
        .map(|err| CellError {
            cell: CellAddress::from_checked(err.column, record.row_number),
            value: err.value,
            error_message: err.error_message,
        })
        .collect()
}

/// Validate records sequentially; errors come out row-major, then in declared-field order.
pub fn validate_records(schema: &Schema, records: &[Record]) -> Vec<CellError> {
    records
        .iter()
        .flat_map(|record| validate_record(schema, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RangeConfig, Rule, RuleChain, RuleConfig, StringMaxConfig};
    use crate::types::Value;

    fn schema() -> Schema {
        Schema::new(vec![
            RuleChain::new(
                "code",
                1,
                vec![
                    Rule::required(RuleConfig::default()),
                    Rule::string(RuleConfig::default()),
                    Rule::string_max(StringMaxConfig::new(5)),
                ],
            )
            .unwrap(),
            RuleChain::new(
                "quantity",
                2,
                vec![
                    Rule::required(RuleConfig::default()),
                    Rule::number(RuleConfig::default()),
                    Rule::number_range(RangeConfig::new(1.0, 99999.0)).unwrap(),
                ],
            )
            .unwrap(),
        ])
        .unwrap()
    }

    fn record(row: usize, code: Value, quantity: Value) -> Record {
        let mut r = Record::new(row);
        r.insert("code", code);
        r.insert("quantity", quantity);
        r
    }

    #[test]
    fn valid_record_produces_nothing() {
        let r = record(2, Value::text("ABC"), Value::Number(5.0));
        assert!(validate_record(&schema(), &r).is_empty());
    }

    #[test]
    fn each_failing_field_yields_one_addressed_error() {
        let r = record(7, Value::text("TOO-LONG"), Value::Number(0.0));
        let errors = validate_record(&schema(), &r);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].cell.to_string(), "A7");
        assert_eq!(errors[0].error_message, "Value must have at most 5 characters");
        assert_eq!(errors[1].cell.to_string(), "B7");
        assert_eq!(errors[1].value, Value::Number(0.0));
    }

    #[test]
    fn missing_fields_are_validated_as_null() {
        let r = Record::new(2);
        let errors = validate_record(&schema(), &r);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.error_message == "A value is required"));
    }

    #[test]
    fn errors_are_row_major_then_field_order() {
        let records = vec![
            record(2, Value::Null, Value::Null),
            record(3, Value::text("OK"), Value::Number(1.0)),
            record(4, Value::Number(1.0), Value::text("x")),
        ];
        let cells: Vec<String> = validate_records(&schema(), &records)
            .iter()
            .map(|e| e.cell.to_string())
            .collect();
        assert_eq!(cells, vec!["A2", "B2", "A4", "B4"]);
    }

    #[test]
    fn validation_is_idempotent() {
        let records = vec![record(2, Value::text(""), Value::Number(-1.0))];
        assert_eq!(
            validate_records(&schema(), &records),
            validate_records(&schema(), &records)
        );
    }
}
