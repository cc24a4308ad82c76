//! The rule engine: atomic [`Rule`]s and short-circuiting [`RuleChain`]s.
//!
//! ```rust
//! use spreadsheet_validation::rules::{RangeConfig, Rule, RuleChain, RuleConfig};
//! use spreadsheet_validation::types::Value;
//!
//! let chain = RuleChain::new(
//!     "quantity",
//!     2,
//!     vec![
//!         Rule::required(RuleConfig::default()),
//!         Rule::number(RuleConfig::default()),
//!         Rule::number_range(RangeConfig::new(1.0, 99999.0)).unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! // The first failing rule wins: an empty cell is reported as missing, not as non-numeric.
//! let err = chain.evaluate(&Value::Null).unwrap();
//! assert_eq!(err.error_message, "A value is required");
//! assert_eq!(err.field_address(), "B");
//! ```

pub mod chain;
pub mod rule;

pub use chain::{FieldError, RuleChain};
pub use rule::{
    BoundConfig, DEFAULT_DATE_FORMAT, DateConfig, DateMinConfig, MatchesConfig, RangeConfig, Rule,
    RuleConfig, RuleKind, RuleResult, StringMaxConfig,
};
