//! Ordered, short-circuiting rule chains bound to a field and a column.

use crate::address::{check_column, column_letter};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Value;

use super::rule::Rule;

/// The first failing rule of a chain, tagged with the field's column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// 1-based column of the field.
    pub column: usize,
    /// Field name the chain is bound to.
    pub field: String,
    pub value: Value,
    pub error_message: String,
}

impl FieldError {
    /// Column letters of the field (the "field address").
    pub fn field_address(&self) -> String {
        column_letter(self.column).unwrap_or_default()
    }
}

/// Rules for one field, evaluated in declared order; the first failure wins.
#[derive(Debug, Clone)]
pub struct RuleChain {
    field: String,
    column: usize,
    rules: Vec<Rule>,
}

impl RuleChain {
    /// Bind `rules` to `field` at the 1-based `column`.
    ///
    /// Fails if the column has no spreadsheet address.
    pub fn new(field: impl Into<String>, column: usize, rules: Vec<Rule>) -> ConfigResult<Self> {
        let field = field.into();
        if column == 0 {
            return Err(ConfigError::InvalidColumn { field });
        }
        check_column(column)?;
        Ok(Self {
            field,
            column,
            rules,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the chain against `value`.
    ///
    /// Rules after the first failing one are never applied, so at most one error is produced.
    pub fn evaluate(&self, value: &Value) -> Option<FieldError> {
        let failed = self
            .rules
            .iter()
            .map(|rule| rule.apply(value))
            .find(|result| !result.valid)?;

        Some(FieldError {
            column: self.column,
            field: self.field.clone(),
            value: failed.value.clone(),
            error_message: failed.error_message,
        })
    }
}
