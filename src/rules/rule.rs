//! Atomic validation rules.
//!
//! A [`Rule`] is a tagged value (kind + configuration) built by a constructor that takes an
//! explicit configuration struct. Applying a rule to a [`Value`] is pure and yields a
//! [`RuleResult`].

use std::fmt;

use chrono::{Local, NaiveDate};
use regex::{Regex, RegexBuilder};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Value;

/// Date format expected in text cells (`DD/MM/YYYY`).
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Outcome of applying one rule to one value.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleResult<'a> {
    pub valid: bool,
    pub error_message: String,
    pub value: &'a Value,
}

/// Configuration shared by rules that only accept a message override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleConfig {
    /// Replaces the default message when set.
    pub error_message: Option<String>,
}

impl RuleConfig {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
        }
    }
}

/// Configuration for [`Rule::string_max`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMaxConfig {
    /// Maximum number of characters (inclusive).
    pub max: usize,
    pub error_message: Option<String>,
}

impl StringMaxConfig {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            error_message: None,
        }
    }
}

/// Configuration for [`Rule::matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchesConfig {
    /// Regular expression, matched case-insensitively. Anchor it (`^...$`) for enumerations.
    pub pattern: String,
    pub error_message: Option<String>,
}

impl MatchesConfig {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            error_message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Configuration for [`Rule::number_min`] and [`Rule::number_max`].
#[derive(Debug, Clone, PartialEq)]
pub struct BoundConfig {
    /// Inclusive bound.
    pub bound: f64,
    pub error_message: Option<String>,
}

impl BoundConfig {
    pub fn new(bound: f64) -> Self {
        Self {
            bound,
            error_message: None,
        }
    }
}

/// Configuration for [`Rule::number_range`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
    pub error_message: Option<String>,
}

impl RangeConfig {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            error_message: None,
        }
    }
}

/// Configuration for [`Rule::date`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateConfig {
    /// chrono format string; defaults to [`DEFAULT_DATE_FORMAT`].
    pub format: Option<String>,
    pub error_message: Option<String>,
}

/// Configuration for [`Rule::date_min`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateMinConfig {
    /// Earliest accepted date (inclusive). Defaults to the current local day.
    pub min: Option<NaiveDate>,
    /// chrono format string; defaults to [`DEFAULT_DATE_FORMAT`].
    pub format: Option<String>,
    pub error_message: Option<String>,
}

/// The check a [`Rule`] performs, with its resolved configuration.
#[derive(Debug, Clone)]
pub enum RuleKind {
    Required,
    Text,
    StringMax { max: usize },
    Matches { pattern: Regex },
    Number,
    Integer,
    NumberMin { min: f64 },
    NumberMax { max: f64 },
    NumberRange { min: f64, max: f64 },
    Date { format: String },
    DateMin { min: NaiveDate, format: String },
}

impl RuleKind {
    /// Name used in schema definitions and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Text => "string",
            RuleKind::StringMax { .. } => "stringMax",
            RuleKind::Matches { .. } => "matches",
            RuleKind::Number => "number",
            RuleKind::Integer => "integer",
            RuleKind::NumberMin { .. } => "numberMin",
            RuleKind::NumberMax { .. } => "numberMax",
            RuleKind::NumberRange { .. } => "numberRange",
            RuleKind::Date { .. } => "date",
            RuleKind::DateMin { .. } => "dateMin",
        }
    }
}

/// A single, configured validation check.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    error_message: String,
}

impl Rule {
    /// Fails on null and empty text.
    pub fn required(config: RuleConfig) -> Self {
        Self::build(RuleKind::Required, config.error_message, || {
            "A value is required".to_string()
        })
    }

    /// Fails unless the value is text.
    pub fn string(config: RuleConfig) -> Self {
        Self::build(RuleKind::Text, config.error_message, || {
            "Value is not text".to_string()
        })
    }

    /// Fails unless the value is text of at most `max` characters.
    pub fn string_max(config: StringMaxConfig) -> Self {
        let max = config.max;
        Self::build(RuleKind::StringMax { max }, config.error_message, || {
            format!("Value must have at most {max} characters")
        })
    }

    /// Fails unless the value's text form matches `pattern` (case-insensitive).
    pub fn matches(config: MatchesConfig) -> ConfigResult<Self> {
        let pattern = RegexBuilder::new(&config.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                pattern: config.pattern.clone(),
                source,
            })?;
        let shown = config.pattern;
        Ok(Self::build(
            RuleKind::Matches { pattern },
            config.error_message,
            || format!("Value does not match pattern: {shown}"),
        ))
    }

    /// Fails unless the value is numeric.
    pub fn number(config: RuleConfig) -> Self {
        Self::build(RuleKind::Number, config.error_message, || {
            "Value is not numeric".to_string()
        })
    }

    /// Fails unless the value is numeric with no fractional part.
    pub fn integer(config: RuleConfig) -> Self {
        Self::build(RuleKind::Integer, config.error_message, || {
            "Numeric value must be an integer".to_string()
        })
    }

    /// Fails unless the value is numeric and `>= min`.
    pub fn number_min(config: BoundConfig) -> ConfigResult<Self> {
        let min = finite("numberMin", config.bound)?;
        Ok(Self::build(
            RuleKind::NumberMin { min },
            config.error_message,
            || format!("Value must be greater than or equal to {min}"),
        ))
    }

    /// Fails unless the value is numeric and `<= max`.
    pub fn number_max(config: BoundConfig) -> ConfigResult<Self> {
        let max = finite("numberMax", config.bound)?;
        Ok(Self::build(
            RuleKind::NumberMax { max },
            config.error_message,
            || format!("Value must be less than or equal to {max}"),
        ))
    }

    /// Fails unless the value is numeric and within `[min, max]`.
    pub fn number_range(config: RangeConfig) -> ConfigResult<Self> {
        let min = finite("numberRange", config.min)?;
        let max = finite("numberRange", config.max)?;
        if min > max {
            return Err(ConfigError::InvalidRange { min, max });
        }
        Ok(Self::build(
            RuleKind::NumberRange { min, max },
            config.error_message,
            || format!("Value must be between {min} and {max}"),
        ))
    }

    /// Fails unless the value is a date, or text parsing under the configured format.
    pub fn date(config: DateConfig) -> Self {
        let format = config
            .format
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
        Self::build(RuleKind::Date { format }, config.error_message, || {
            "Value is not a valid date".to_string()
        })
    }

    /// Fails unless the value is a date on or after `min` (default: today).
    pub fn date_min(config: DateMinConfig) -> Self {
        let min = config.min.unwrap_or_else(today);
        let format = config
            .format
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
        let shown = min.format(DEFAULT_DATE_FORMAT).to_string();
        Self::build(
            RuleKind::DateMin { min, format },
            config.error_message,
            || format!("Date must be on or after {shown}"),
        )
    }

    fn build(kind: RuleKind, custom: Option<String>, default: impl FnOnce() -> String) -> Self {
        Self {
            kind,
            error_message: custom.unwrap_or_else(default),
        }
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Message reported when this rule fails.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Verdict only.
    pub fn check(&self, value: &Value) -> bool {
        match &self.kind {
            RuleKind::Required => !value.is_blank(),
            RuleKind::Text => matches!(value, Value::Text(_)),
            RuleKind::StringMax { max } => value
                .as_str()
                .is_some_and(|s| s.chars().count() <= *max),
            RuleKind::Matches { pattern } => match value {
                Value::Null => false,
                other => pattern.is_match(&other.to_string()),
            },
            RuleKind::Number => matches!(value, Value::Number(_)),
            RuleKind::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
            RuleKind::NumberMin { min } => value.as_f64().is_some_and(|n| n >= *min),
            RuleKind::NumberMax { max } => value.as_f64().is_some_and(|n| n <= *max),
            RuleKind::NumberRange { min, max } => {
                value.as_f64().is_some_and(|n| n >= *min && n <= *max)
            }
            RuleKind::Date { format } => parse_date(value, format).is_some(),
            RuleKind::DateMin { min, format } => {
                parse_date(value, format).is_some_and(|d| d >= *min)
            }
        }
    }

    /// Apply the rule to `value`.
    pub fn apply<'a>(&self, value: &'a Value) -> RuleResult<'a> {
        RuleResult {
            valid: self.check(value),
            error_message: self.error_message.clone(),
            value,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::StringMax { max } => write!(f, "stringMax({max})"),
            RuleKind::Matches { pattern } => write!(f, "matches({})", pattern.as_str()),
            RuleKind::NumberMin { min } => write!(f, "numberMin({min})"),
            RuleKind::NumberMax { max } => write!(f, "numberMax({max})"),
            RuleKind::NumberRange { min, max } => write!(f, "numberRange({min}, {max})"),
            RuleKind::DateMin { min, .. } => write!(f, "dateMin({min})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Start of the current local day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Interpret a cell as a date: date cells as-is, text cells through `format`.
pub fn parse_date(value: &Value, format: &str) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) => NaiveDate::parse_from_str(s.trim(), format).ok(),
        _ => None,
    }
}

fn finite(rule: &'static str, n: f64) -> ConfigResult<f64> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ConfigError::InvalidRuleOption {
            rule,
            message: format!("bound must be a finite number, got {n}"),
        })
    }
}
