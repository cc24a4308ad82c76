//! JSON schema definitions.
//!
//! A definition document describes the header layout and the rule chains declaratively:
//!
//! ```json
//! {
//!   "strictHeaders": false,
//!   "headers": [
//!     { "label": "CODIGO DO CUPOM", "field": "couponCode", "column": 1 },
//!     { "label": "QUANTIDADE", "field": "quantity", "column": 2 }
//!   ],
//!   "fields": [
//!     { "field": "couponCode", "column": 1, "rules": [
//!       { "rule": "required" }, { "rule": "string" }, { "rule": "stringMax", "max": 80 }
//!     ] },
//!     { "field": "quantity", "column": 2, "rules": [
//!       { "rule": "required" }, { "rule": "number" },
//!       { "rule": "numberRange", "min": 1, "max": 99999, "errorMessage": "1 to 99999" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Building a definition fails loudly on anything a rule cannot work without (missing `min`,
//! `max` or `pattern`, unparseable dates, unknown fields).

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::rules::{
    BoundConfig, DEFAULT_DATE_FORMAT, DateConfig, DateMinConfig, MatchesConfig, RangeConfig, Rule,
    RuleChain, RuleConfig, StringMaxConfig,
};
use crate::validation::{HeaderStrictness, SpreadsheetValidator, ValidationOptions};

use super::{HeaderEntry, HeaderMapping, Schema};

/// Top-level definition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Also report unexpected extra headers.
    #[serde(default)]
    pub strict_headers: bool,
    /// Expected headers, in spreadsheet order.
    pub headers: Vec<HeaderEntry>,
    /// Rule chains, in declared order.
    pub fields: Vec<FieldDefinition>,
}

/// Rule chain for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub field: String,
    pub column: usize,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// Built-in rule names as written in definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleName {
    Required,
    String,
    StringMax,
    Matches,
    Number,
    Integer,
    NumberMin,
    NumberMax,
    NumberRange,
    Date,
    DateMin,
}

impl RuleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Required => "required",
            RuleName::String => "string",
            RuleName::StringMax => "stringMax",
            RuleName::Matches => "matches",
            RuleName::Number => "number",
            RuleName::Integer => "integer",
            RuleName::NumberMin => "numberMin",
            RuleName::NumberMax => "numberMax",
            RuleName::NumberRange => "numberRange",
            RuleName::Date => "date",
            RuleName::DateMin => "dateMin",
        }
    }
}

/// A numeric bound or a date bound (`dateMin` takes a date string or `"today"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Text(String),
}

/// One rule and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleDefinition {
    pub rule: RuleName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RuleDefinition {
    /// Build the configured [`Rule`].
    pub fn build(&self) -> ConfigResult<Rule> {
        let rule = self.rule.as_str();
        let message = self.error_message.clone();
        let plain = RuleConfig {
            error_message: message.clone(),
        };

        match self.rule {
            RuleName::Required => Ok(Rule::required(plain)),
            RuleName::String => Ok(Rule::string(plain)),
            RuleName::Number => Ok(Rule::number(plain)),
            RuleName::Integer => Ok(Rule::integer(plain)),
            RuleName::StringMax => {
                let max = number_option(rule, "max", self.max.as_ref())?;
                if max < 0.0 || max.fract() != 0.0 {
                    return Err(ConfigError::InvalidRuleOption {
                        rule,
                        message: format!("max must be a non-negative integer, got {max}"),
                    });
                }
                Ok(Rule::string_max(StringMaxConfig {
                    max: max as usize,
                    error_message: message,
                }))
            }
            RuleName::Matches => {
                let pattern = self.pattern.clone().ok_or(ConfigError::MissingRuleOption {
                    rule,
                    option: "pattern",
                })?;
                Rule::matches(MatchesConfig {
                    pattern,
                    error_message: message,
                })
            }
            RuleName::NumberMin => Rule::number_min(BoundConfig {
                bound: number_option(rule, "min", self.min.as_ref())?,
                error_message: message,
            }),
            RuleName::NumberMax => Rule::number_max(BoundConfig {
                bound: number_option(rule, "max", self.max.as_ref())?,
                error_message: message,
            }),
            RuleName::NumberRange => Rule::number_range(RangeConfig {
                min: number_option(rule, "min", self.min.as_ref())?,
                max: number_option(rule, "max", self.max.as_ref())?,
                error_message: message,
            }),
            RuleName::Date => Ok(Rule::date(DateConfig {
                format: self.format.clone(),
                error_message: message,
            })),
            RuleName::DateMin => {
                let format = self
                    .format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
                let min = date_option(rule, &format, self.min.as_ref())?;
                Ok(Rule::date_min(DateMinConfig {
                    min,
                    format: Some(format),
                    error_message: message,
                }))
            }
        }
    }
}

fn number_option(rule: &'static str, option: &'static str, bound: Option<&Bound>) -> ConfigResult<f64> {
    match bound {
        Some(Bound::Number(n)) => Ok(*n),
        Some(Bound::Text(s)) => Err(ConfigError::InvalidRuleOption {
            rule,
            message: format!("{option} must be a number, got '{s}'"),
        }),
        None => Err(ConfigError::MissingRuleOption { rule, option }),
    }
}

// `None` means "today", resolved when the rule is built.
fn date_option(rule: &'static str, format: &str, bound: Option<&Bound>) -> ConfigResult<Option<NaiveDate>> {
    match bound {
        None => Ok(None),
        Some(Bound::Text(s)) if s.eq_ignore_ascii_case("today") => Ok(None),
        Some(Bound::Text(s)) => NaiveDate::parse_from_str(s, format)
            .map(Some)
            .map_err(|e| ConfigError::InvalidRuleOption {
                rule,
                message: format!("min '{s}' is not a date: {e}"),
            }),
        Some(Bound::Number(n)) => Err(ConfigError::InvalidRuleOption {
            rule,
            message: format!("min must be a date string, got {n}"),
        }),
    }
}

impl SchemaDefinition {
    /// Parse a definition from JSON text.
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a definition file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Build the header mapping and schema, checking that every schema field is mapped.
    pub fn to_parts(&self) -> ConfigResult<(HeaderMapping, Schema)> {
        let mapping = HeaderMapping::new(self.headers.clone())?;

        let mut chains = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let rules = field
                .rules
                .iter()
                .map(RuleDefinition::build)
                .collect::<ConfigResult<Vec<_>>>()?;
            chains.push(RuleChain::new(field.field.clone(), field.column, rules)?);
        }
        let schema = Schema::new(chains)?;
        schema.check_against(&mapping)?;

        Ok((mapping, schema))
    }

    /// Build a ready-to-use validator with default options (plus `strictHeaders`).
    pub fn build_validator(&self) -> ConfigResult<SpreadsheetValidator> {
        let (mapping, schema) = self.to_parts()?;
        let header_strictness = if self.strict_headers {
            HeaderStrictness::Strict
        } else {
            HeaderStrictness::Lenient
        };
        SpreadsheetValidator::with_options(
            mapping,
            schema,
            ValidationOptions {
                header_strictness,
                ..Default::default()
            },
        )
    }
}
