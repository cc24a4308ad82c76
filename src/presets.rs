//! Ready-made templates.
//!
//! The coupon template describes a batch-coupon upload: one coupon per row, nine columns from
//! `A` (coupon code) to `I` (plan type).

use crate::error::ConfigResult;
use crate::rules::{
    BoundConfig, DateConfig, DateMinConfig, MatchesConfig, RangeConfig, Rule, RuleChain, RuleConfig,
    StringMaxConfig,
};
use crate::schema::{HeaderEntry, HeaderMapping, Schema};
use crate::validation::{SpreadsheetValidator, ValidationOptions};

/// Expected coupon headers as `(label, field)`, in column order starting at `A`.
pub const COUPON_HEADERS: [(&str, &str); 9] = [
    ("CODIGO DO CUPOM", "couponCode"),
    ("QUANTIDADE", "quantity"),
    ("DESCONTO NA MENSALIDADE (%)", "installmentDiscountPercentage"),
    ("DESCONTO NA ADESAO (%)", "registrationFeeDiscountPercentage"),
    ("LIVRE DE CARENCIA (SIM/NAO)", "freeGracePeriod"),
    ("DURACAO (MESES)", "duration"),
    ("DATA DE EXPIRACAO (DD/MM/YYYY)", "redeemExpirationDate"),
    ("PLANO (TRIMESTRAL/SEMESTRAL/ANUAL)", "planName"),
    ("TIPO DE PLANO (INDIVIDUAL/FAMILIAR)", "planType"),
];

/// Header mapping of the coupon template.
pub fn coupon_header_mapping() -> ConfigResult<HeaderMapping> {
    HeaderMapping::new(
        COUPON_HEADERS
            .iter()
            .enumerate()
            .map(|(idx0, (label, field))| HeaderEntry::new(*label, *field, idx0 + 1))
            .collect(),
    )
}

fn percentage(field: &str, column: usize) -> ConfigResult<RuleChain> {
    RuleChain::new(
        field,
        column,
        vec![
            Rule::required(RuleConfig::default()),
            Rule::number(RuleConfig::default()),
            Rule::number_range(RangeConfig::new(0.0, 100.0))?,
        ],
    )
}

/// Rule chains of the coupon template.
///
/// Expiration dates must not be in the past; "today" is fixed when this function runs.
pub fn coupon_schema() -> ConfigResult<Schema> {
    Schema::new(vec![
        RuleChain::new(
            "couponCode",
            1,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::string(RuleConfig::default()),
                Rule::string_max(StringMaxConfig::new(80)),
            ],
        )?,
        RuleChain::new(
            "quantity",
            2,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::number(RuleConfig::default()),
                Rule::number_range(RangeConfig::new(1.0, 99_999.0))?,
            ],
        )?,
        percentage("installmentDiscountPercentage", 3)?,
        percentage("registrationFeeDiscountPercentage", 4)?,
        RuleChain::new(
            "freeGracePeriod",
            5,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::string(RuleConfig::default()),
                Rule::matches(
                    MatchesConfig::new("^(sim|n[aã]o)$").with_message("Value must be Sim or Nao"),
                )?,
            ],
        )?,
        RuleChain::new(
            "duration",
            6,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::number(RuleConfig::default()),
                Rule::integer(RuleConfig::default()),
                Rule::number_min(BoundConfig::new(1.0))?,
            ],
        )?,
        RuleChain::new(
            "redeemExpirationDate",
            7,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::date(DateConfig::default()),
                Rule::date_min(DateMinConfig::default()),
            ],
        )?,
        RuleChain::new(
            "planName",
            8,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::string(RuleConfig::default()),
                Rule::matches(
                    MatchesConfig::new("^(trimestral|semestral|anual)$")
                        .with_message("Value must be Trimestral, Semestral or Anual"),
                )?,
            ],
        )?,
        RuleChain::new(
            "planType",
            9,
            vec![
                Rule::required(RuleConfig::default()),
                Rule::string(RuleConfig::default()),
                Rule::matches(
                    MatchesConfig::new("^(individual|fam[ií]liar?)$")
                        .with_message("Value must be Individual or Familiar"),
                )?,
            ],
        )?,
    ])
}

/// A validator for the coupon template.
pub fn coupon_validator(options: ValidationOptions) -> ConfigResult<SpreadsheetValidator> {
    SpreadsheetValidator::with_options(coupon_header_mapping()?, coupon_schema()?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use chrono::{Duration, Local};

    fn header_row() -> Vec<Value> {
        COUPON_HEADERS.iter().map(|(label, _)| Value::text(*label)).collect()
    }

    fn future_date() -> String {
        (Local::now().date_naive() + Duration::days(30))
            .format("%d/%m/%Y")
            .to_string()
    }

    fn valid_row() -> Vec<Value> {
        vec![
            Value::text("PROMO2030"),
            Value::Number(10.0),
            Value::Number(15.0),
            Value::Number(0.0),
            Value::text("Sim"),
            Value::Number(12.0),
            Value::text(future_date()),
            Value::text("anual"),
            Value::text("familiar"),
        ]
    }

    #[test]
    fn every_schema_field_has_its_own_column() {
        let schema = coupon_schema().unwrap();
        let columns: Vec<usize> = schema.chains().iter().map(RuleChain::column).collect();
        assert_eq!(columns, (1..=9).collect::<Vec<_>>());
        let mapping = coupon_header_mapping().unwrap();
        assert!(schema.check_against(&mapping).is_ok());
    }

    #[test]
    fn valid_coupon_row_passes() {
        let v = coupon_validator(ValidationOptions::default()).unwrap();
        let report = v.validate(&[header_row(), valid_row()]);
        assert!(report.is_valid(), "{report:?}");
    }

    #[test]
    fn plan_name_pattern_is_anchored() {
        let v = coupon_validator(ValidationOptions::default()).unwrap();
        let mut row = valid_row();
        row[7] = Value::text("trimestralmente");
        let report = v.validate(&[header_row(), row]);
        assert_eq!(report.cells.len(), 1);
        assert_eq!(report.cells[0].cell.to_string(), "H2");
        assert_eq!(
            report.cells[0].error_message,
            "Value must be Trimestral, Semestral or Anual"
        );
    }

    #[test]
    fn plan_type_lands_in_column_i() {
        let v = coupon_validator(ValidationOptions::default()).unwrap();
        let mut row = valid_row();
        row[8] = Value::Null;
        let report = v.validate(&[header_row(), row]);
        assert_eq!(report.cells[0].cell.to_string(), "I2");
        assert_eq!(report.cells[0].error_message, "A value is required");
    }
}
